//! Identifiers for cases and timeline events

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use ulid::Ulid;

/// Prefix of every case identifier
pub const CASE_PREFIX: &str = "CSC";

/// Case identifier: `CSC-<ULID>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CaseId(Ulid);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdParseError {
    #[error("Case ID must start with 'CSC-': {0}")]
    MissingPrefix(String),

    #[error("Invalid ULID in case ID: {0}")]
    InvalidUlid(String),
}

impl CaseId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// First 8 characters of the ULID, for compact listings
    pub fn short(&self) -> String {
        let s = self.0.to_string();
        format!("{}-{}", CASE_PREFIX, &s[..8])
    }
}

impl Default for CaseId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", CASE_PREFIX, self.0)
    }
}

impl std::str::FromStr for CaseId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix(CASE_PREFIX)
            .and_then(|r| r.strip_prefix('-'))
            .ok_or_else(|| IdParseError::MissingPrefix(s.to_string()))?;
        let ulid = Ulid::from_string(rest).map_err(|_| IdParseError::InvalidUlid(s.to_string()))?;
        Ok(Self(ulid))
    }
}

impl Serialize for CaseId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CaseId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_id_roundtrip() {
        let id = CaseId::new();
        let text = id.to_string();
        assert!(text.starts_with("CSC-"));
        assert_eq!(text.parse::<CaseId>().unwrap(), id);
    }

    #[test]
    fn test_case_id_rejects_bad_input() {
        assert!(matches!(
            "REQ-01KCWY20F01B21V0G4E835NW3J".parse::<CaseId>(),
            Err(IdParseError::MissingPrefix(_))
        ));
        assert!(matches!(
            "CSC-notaulid".parse::<CaseId>(),
            Err(IdParseError::InvalidUlid(_))
        ));
    }

    #[test]
    fn test_short_form() {
        let id: CaseId = "CSC-01KCWY20F01B21V0G4E835NW3J".parse().unwrap();
        assert_eq!(id.short(), "CSC-01KCWY20");
    }
}
