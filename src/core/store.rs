//! Plain-text case store
//!
//! Cases live as `<id>.case.yaml` files. Writes use an optimistic revision
//! check: a save is refused when the file changed since it was loaded, so a
//! transition validated against a stale snapshot is never committed. The
//! check and the write happen under an exclusive `<file>.lock`, and the new
//! contents replace the file by atomic rename.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::core::entity::Entity;
use crate::entities::CostSavingsCase;

/// How long a save waits for another writer's lock
const LOCK_TIMEOUT: Duration = Duration::from_secs(5);
const LOCK_RETRY: Duration = Duration::from_millis(5);

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {message}")]
    Yaml { path: PathBuf, message: String },

    #[error(
        "{path} changed since it was loaded (revision {expected}, now {found}); reload and retry"
    )]
    RevisionConflict {
        path: PathBuf,
        expected: u32,
        found: u32,
    },

    #[error("{0} is locked by another writer; remove the lock file if no save is running")]
    Locked(PathBuf),

    #[error("{0} reached the maximum revision")]
    RevisionOverflow(PathBuf),

    #[error("Refusing to overwrite existing file {0}")]
    AlreadyExists(PathBuf),
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Exclusive writer lock on one entity file, released on drop
#[derive(Debug)]
struct FileLock {
    path: PathBuf,
}

impl FileLock {
    fn acquire(target: &Path) -> Result<Self, StoreError> {
        let mut name = target.as_os_str().to_owned();
        name.push(".lock");
        let path = PathBuf::from(name);
        let deadline = Instant::now() + LOCK_TIMEOUT;

        loop {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(_) => return Ok(Self { path }),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    if Instant::now() >= deadline {
                        return Err(StoreError::Locked(path));
                    }
                    thread::sleep(LOCK_RETRY);
                }
                Err(e) => return Err(io_err(&path)(e)),
            }
        }
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), "failed to release lock: {}", e);
        }
    }
}

/// Read and parse an entity file
pub fn load<T: Entity + 'static>(path: &Path) -> Result<T, StoreError> {
    let contents = fs::read_to_string(path).map_err(io_err(path))?;
    serde_yml::from_str(&contents).map_err(|e| StoreError::Yaml {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

pub fn load_case(path: &Path) -> Result<CostSavingsCase, StoreError> {
    load(path)
}

fn to_yaml<T: Entity>(path: &Path, entity: &T) -> Result<String, StoreError> {
    serde_yml::to_string(entity).map_err(|e| StoreError::Yaml {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Replace `path` with `contents` through a sibling temp file and rename
fn write_atomic(path: &Path, contents: &str) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err(dir))?;
    tmp.write_all(contents.as_bytes()).map_err(io_err(path))?;
    tmp.as_file().sync_all().map_err(io_err(path))?;
    tmp.persist(path).map_err(|e| io_err(path)(e.error))?;
    Ok(())
}

/// Write a new entity into `dir`, returning the file path
pub fn create<T: Entity>(dir: &Path, entity: &T) -> Result<PathBuf, StoreError> {
    fs::create_dir_all(dir).map_err(io_err(dir))?;
    let path = dir.join(entity.file_name());
    let contents = to_yaml(&path, entity)?;

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => StoreError::AlreadyExists(path.clone()),
            _ => io_err(&path)(e),
        })?;
    file.write_all(contents.as_bytes()).map_err(io_err(&path))?;

    tracing::debug!(
        path = %path.display(),
        title = entity.title(),
        author = entity.author(),
        "created entity file"
    );
    Ok(path)
}

/// Save `entity` over `path` if the file still holds the revision it was
/// loaded at; the saved entity carries the next revision.
pub fn save<T: Entity + 'static>(path: &Path, entity: &mut T) -> Result<(), StoreError> {
    let _lock = FileLock::acquire(path)?;

    let on_disk: T = load(path)?;
    if on_disk.revision() != entity.revision() {
        return Err(StoreError::RevisionConflict {
            path: path.to_path_buf(),
            expected: entity.revision(),
            found: on_disk.revision(),
        });
    }

    let loaded_at = entity.revision();
    let next = loaded_at
        .checked_add(1)
        .ok_or_else(|| StoreError::RevisionOverflow(path.to_path_buf()))?;

    entity.set_revision(next);
    let written = to_yaml(path, entity).and_then(|contents| write_atomic(path, &contents));
    if let Err(e) = written {
        entity.set_revision(loaded_at);
        return Err(e);
    }
    tracing::debug!(path = %path.display(), revision = next, "saved entity file");
    Ok(())
}

/// Load every `<id>.<KIND>.yaml` file in `dir` (non-recursive), oldest first
pub fn load_all<T: Entity + 'static>(dir: &Path) -> Result<Vec<(PathBuf, T)>, StoreError> {
    let suffix = format!(".{}.yaml", T::KIND);
    let mut entities = Vec::new();

    for entry in fs::read_dir(dir).map_err(io_err(dir))? {
        let entry = entry.map_err(io_err(dir))?;
        let path = entry.path();
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(&suffix));
        if matches && path.is_file() {
            let entity: T = load(&path)?;
            entities.push((path, entity));
        }
    }

    entities.sort_by_key(|(_, e)| e.created());
    Ok(entities)
}

pub fn load_cases_in(dir: &Path) -> Result<Vec<(PathBuf, CostSavingsCase)>, StoreError> {
    load_all(dir)
}
