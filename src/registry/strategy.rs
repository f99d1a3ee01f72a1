//! Conflict strategies and module provenance.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Policy for picking one module when several entries share an id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictStrategy {
    /// Fail resolution when more than one entry exists
    #[default]
    Error,
    /// Use the first-inserted entry
    Warn,
    /// Use the last-inserted entry
    Replace,
}

impl ConflictStrategy {
    pub fn all() -> &'static [ConflictStrategy] {
        &[
            ConflictStrategy::Error,
            ConflictStrategy::Warn,
            ConflictStrategy::Replace,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictStrategy::Error => "error",
            ConflictStrategy::Warn => "warn",
            ConflictStrategy::Replace => "replace",
        }
    }
}

impl fmt::Display for ConflictStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(ConflictStrategy::Error),
            "warn" => Ok(ConflictStrategy::Warn),
            "replace" => Ok(ConflictStrategy::Replace),
            _ => Err(Error::InvalidStrategy {
                value: s.to_string(),
            }),
        }
    }
}

/// Kind of place a module came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// Shipped module library
    Standard,
    /// Project-local modules
    Local,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Standard => "standard",
            SourceType::Local => "local",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance attached to a module at registration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleSource {
    #[serde(rename = "type")]
    pub source_type: SourceType,
    pub path: PathBuf,
}

impl ModuleSource {
    pub fn standard(path: impl Into<PathBuf>) -> Self {
        Self {
            source_type: SourceType::Standard,
            path: path.into(),
        }
    }

    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self {
            source_type: SourceType::Local,
            path: path.into(),
        }
    }
}

impl fmt::Display for ModuleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source_type, self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parse() {
        assert_eq!("error".parse::<ConflictStrategy>().unwrap(), ConflictStrategy::Error);
        assert_eq!("WARN".parse::<ConflictStrategy>().unwrap(), ConflictStrategy::Warn);
        assert_eq!(" replace ".parse::<ConflictStrategy>().unwrap(), ConflictStrategy::Replace);

        let err = "merge".parse::<ConflictStrategy>().unwrap_err();
        assert!(matches!(err, Error::InvalidStrategy { ref value } if value == "merge"));
    }

    #[test]
    fn test_strategy_default_is_error() {
        assert_eq!(ConflictStrategy::default(), ConflictStrategy::Error);
    }

    #[test]
    fn test_source_display() {
        assert_eq!(ModuleSource::standard("std").to_string(), "standard:std");
        assert_eq!(ModuleSource::local("./mods").to_string(), "local:./mods");
    }

    #[test]
    fn test_source_serde() {
        let source: ModuleSource =
            serde_json::from_str(r#"{"type": "local", "path": "./modules"}"#).unwrap();
        assert_eq!(source, ModuleSource::local("./modules"));
    }
}
