//! Structural validation for module and persona candidates.
//!
//! Validators take the untyped value a loader parsed (`serde_json::Value`) and
//! never fail: every problem is reported as a [`ValidationError`] (or a
//! [`ValidationWarning`] for conditions that should not block a build).

mod module;
mod persona;

pub use module::validate_module;
pub use persona::validate_persona;

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::types::SUPPORTED_SCHEMA_VERSIONS;

/// Schema document sections referenced from error messages.
pub(crate) mod section {
    pub const MODULE_ID: &str = "§2.1 Module ID";
    pub const VERSIONING: &str = "§2.2 Versioning";
    pub const METADATA: &str = "§2.3 Metadata";
    pub const DEPRECATION: &str = "§2.4 Deprecation";
    pub const COMPONENTS: &str = "§2.5 Components";
    pub const PERSONA: &str = "§4 Persona";
}

// ─────────────────────────────────────────────────────────────────
// Results
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub path: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_ref: Option<String>,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            section_ref: None,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)?;
        } else {
            write!(f, "{}: {}", self.path, self.message)?;
        }
        if let Some(section) = &self.section_ref {
            write!(f, " (see {})", section)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Outcome of validating one candidate. Both lists are always present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

// ─────────────────────────────────────────────────────────────────
// Collector
// ─────────────────────────────────────────────────────────────────

pub(crate) fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

pub(crate) fn index(parent: &str, i: usize) -> String {
    format!("{}[{}]", parent, i)
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Accumulates findings while walking a candidate.
#[derive(Debug, Default)]
pub(crate) struct Collector {
    errors: Vec<ValidationError>,
    warnings: Vec<ValidationWarning>,
}

impl Collector {
    pub fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationError::new(path, message));
    }

    pub fn error_ref(
        &mut self,
        path: impl Into<String>,
        message: impl Into<String>,
        section: &str,
    ) {
        self.errors.push(ValidationError {
            path: path.into(),
            message: message.into(),
            section_ref: Some(section.to_string()),
        });
    }

    pub fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationWarning {
            path: path.into(),
            message: message.into(),
        });
    }

    pub fn finish(self) -> ValidationResult {
        ValidationResult {
            valid: self.errors.is_empty(),
            errors: self.errors,
            warnings: self.warnings,
        }
    }

    /// Required string field; reports missing or mistyped values.
    pub fn require_string<'a>(
        &mut self,
        obj: &'a Map<String, Value>,
        parent: &str,
        key: &str,
    ) -> Option<&'a str> {
        let path = join(parent, key);
        match obj.get(key) {
            None | Some(Value::Null) => {
                self.error(path, format!("'{}' is required", key));
                None
            }
            Some(Value::String(s)) => Some(s),
            Some(other) => {
                self.error(
                    path,
                    format!("'{}' must be a string, got {}", key, type_name(other)),
                );
                None
            }
        }
    }

    /// Required string field that must also be non-blank.
    pub fn require_text<'a>(
        &mut self,
        obj: &'a Map<String, Value>,
        parent: &str,
        key: &str,
    ) -> Option<&'a str> {
        let value = self.require_string(obj, parent, key)?;
        if value.trim().is_empty() {
            self.error(join(parent, key), format!("'{}' must not be empty", key));
            return None;
        }
        Some(value)
    }

    pub fn optional_string<'a>(
        &mut self,
        obj: &'a Map<String, Value>,
        parent: &str,
        key: &str,
    ) -> Option<&'a str> {
        match obj.get(key) {
            None => None,
            Some(Value::String(s)) => Some(s),
            Some(other) => {
                self.error(
                    join(parent, key),
                    format!("'{}' must be a string, got {}", key, type_name(other)),
                );
                None
            }
        }
    }

    pub fn optional_bool(
        &mut self,
        obj: &Map<String, Value>,
        parent: &str,
        key: &str,
    ) -> Option<bool> {
        match obj.get(key) {
            None => None,
            Some(Value::Bool(b)) => Some(*b),
            Some(other) => {
                self.error(
                    join(parent, key),
                    format!("'{}' must be a boolean, got {}", key, type_name(other)),
                );
                None
            }
        }
    }

    /// Optional array field; reports a non-array value.
    pub fn optional_array<'a>(
        &mut self,
        obj: &'a Map<String, Value>,
        parent: &str,
        key: &str,
    ) -> Option<&'a Vec<Value>> {
        match obj.get(key) {
            None => None,
            Some(Value::Array(items)) => Some(items),
            Some(other) => {
                self.error(
                    join(parent, key),
                    format!("'{}' must be an array, got {}", key, type_name(other)),
                );
                None
            }
        }
    }

    /// Optional array of strings; returns the strings that were well-typed.
    pub fn string_array<'a>(
        &mut self,
        obj: &'a Map<String, Value>,
        parent: &str,
        key: &str,
    ) -> Vec<&'a str> {
        let Some(items) = self.optional_array(obj, parent, key) else {
            return Vec::new();
        };
        let path = join(parent, key);
        let mut strings = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            match item {
                Value::String(s) => strings.push(s.as_str()),
                other => self.error(
                    index(&path, i),
                    format!("must be a string, got {}", type_name(other)),
                ),
            }
        }
        strings
    }

    /// Required semantic-version field.
    pub fn check_version(&mut self, obj: &Map<String, Value>, parent: &str) {
        if let Some(version) = self.require_string(obj, parent, "version") {
            if let Err(e) = semver::Version::parse(version) {
                self.error_ref(
                    join(parent, "version"),
                    format!("'{}' is not a valid semantic version: {}", version, e),
                    section::VERSIONING,
                );
            }
        }
    }

    /// Required schema version, one of the supported versions.
    pub fn check_schema_version(&mut self, obj: &Map<String, Value>, parent: &str) {
        if let Some(schema) = self.require_string(obj, parent, "schemaVersion") {
            if !SUPPORTED_SCHEMA_VERSIONS.contains(&schema) {
                self.error_ref(
                    join(parent, "schemaVersion"),
                    format!(
                        "unsupported schema version '{}'; supported: {}",
                        schema,
                        SUPPORTED_SCHEMA_VERSIONS.join(", ")
                    ),
                    section::VERSIONING,
                );
            }
        }
    }
}
