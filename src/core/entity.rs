//! Entity trait - common interface for stored records

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

/// Common trait for records kept as plain-text files
pub trait Entity: Serialize + DeserializeOwned {
    /// File suffix for this entity type (e.g., "case")
    const KIND: &'static str;

    /// The entity's identifier, as written in the file
    fn id_string(&self) -> String;

    fn title(&self) -> &str;

    fn created(&self) -> DateTime<Utc>;

    fn author(&self) -> &str;

    /// Optimistic-concurrency revision
    fn revision(&self) -> u32;

    fn set_revision(&mut self, revision: u32);

    /// File name of the entity inside a directory
    fn file_name(&self) -> String {
        format!("{}.{}.yaml", self.id_string(), Self::KIND)
    }
}
