//! Declarative definition loading
//!
//! Module and persona definitions are YAML or JSON files. Loading parses the
//! file into an untyped value, runs the matching validator over it, and only
//! then deserializes into the typed definition.

mod discovery;

pub use discovery::{
    discover_definition_files, discover_module_files, is_module_file, load_sources,
    DefinitionKind, LoadSummary, MODULE_SUFFIXES, PERSONA_SUFFIXES,
};

use std::path::Path;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::types::{Module, Persona};
use crate::validation::{validate_module, validate_persona, ValidationResult};

// ─────────────────────────────────────────────────────────────────
// DefinitionLoader Trait
// ─────────────────────────────────────────────────────────────────

/// Source of validated definitions.
#[async_trait]
pub trait DefinitionLoader: Send + Sync {
    async fn load_module(&self, path: &Path) -> Result<Module>;

    async fn load_persona(&self, path: &Path) -> Result<Persona>;
}

/// Serialization a definition file is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionFormat {
    Yaml,
    Json,
}

impl DefinitionFormat {
    /// Format from the file extension; `None` for anything else.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "yml" | "yaml" => Some(DefinitionFormat::Yaml),
            "json" => Some(DefinitionFormat::Json),
            _ => None,
        }
    }
}

/// Parse definition text into an untyped value.
pub fn parse_definition(text: &str, format: DefinitionFormat, path: &Path) -> Result<Value> {
    match format {
        DefinitionFormat::Yaml => serde_yaml::from_str(text)
            .map_err(|e| Error::load(path, format!("invalid YAML: {}", e))),
        DefinitionFormat::Json => serde_json::from_str(text)
            .map_err(|e| Error::load(path, format!("invalid JSON: {}", e))),
    }
}

/// Validate a parsed module and convert it to its typed form.
pub fn module_from_value(value: Value, path: &Path) -> Result<Module> {
    let result = validate_module(&value);
    typed(value, path, result)
}

/// Validate a parsed persona and convert it to its typed form.
pub fn persona_from_value(value: Value, path: &Path) -> Result<Persona> {
    let result = validate_persona(&value);
    typed(value, path, result)
}

fn typed<T: DeserializeOwned>(value: Value, path: &Path, result: ValidationResult) -> Result<T> {
    for warning in &result.warnings {
        warn!(
            path = %path.display(),
            field = %warning.path,
            "{}", warning.message
        );
    }
    if !result.valid {
        return Err(Error::InvalidDefinition {
            path: path.to_path_buf(),
            errors: result.errors,
        });
    }
    serde_json::from_value(value).map_err(|e| Error::load(path, e.to_string()))
}

// ─────────────────────────────────────────────────────────────────
// FileLoader
// ─────────────────────────────────────────────────────────────────

/// Loads definitions from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileLoader;

impl FileLoader {
    pub fn new() -> Self {
        Self
    }

    /// Read and parse a definition file without validating it.
    pub async fn read_value(&self, path: &Path) -> Result<Value> {
        let format = DefinitionFormat::from_path(path).ok_or_else(|| {
            Error::load(path, "unsupported file extension; expected .yml, .yaml or .json")
        })?;
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::load(path, format!("cannot read file: {}", e)))?;
        debug!(path = %path.display(), bytes = text.len(), "Definition read");
        parse_definition(&text, format, path)
    }

    /// Read a module or persona file and run its validator.
    ///
    /// Unlike loading, an invalid definition is a normal result here; only
    /// unreadable or unparsable files fail.
    pub async fn check_file(&self, path: &Path) -> Result<(DefinitionKind, ValidationResult)> {
        let kind = DefinitionKind::of(path).ok_or_else(|| {
            Error::load(path, "not a .module or .persona definition file")
        })?;
        let value = self.read_value(path).await?;
        let result = match kind {
            DefinitionKind::Module => validate_module(&value),
            DefinitionKind::Persona => validate_persona(&value),
        };
        Ok((kind, result))
    }
}

#[async_trait]
impl DefinitionLoader for FileLoader {
    async fn load_module(&self, path: &Path) -> Result<Module> {
        let value = self.read_value(path).await?;
        module_from_value(value, path)
    }

    async fn load_persona(&self, path: &Path) -> Result<Persona> {
        let value = self.read_value(path).await?;
        persona_from_value(value, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const MODULE_YAML: &str = r#"
id: foundation/logic/deductive-reasoning
version: 1.0.0
schemaVersion: "2.0"
metadata:
  name: Deductive Reasoning
  description: Reason from premises
  semantic: logic deduction
instruction:
  purpose: Apply deduction
  process:
    - State premises
    - step: Derive
      detail: One rule at a time
"#;

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            DefinitionFormat::from_path(Path::new("a.module.yml")),
            Some(DefinitionFormat::Yaml)
        );
        assert_eq!(
            DefinitionFormat::from_path(Path::new("a.JSON")),
            Some(DefinitionFormat::Json)
        );
        assert_eq!(DefinitionFormat::from_path(Path::new("a.ts")), None);
    }

    #[tokio::test]
    async fn test_load_yaml_module() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deductive.module.yml");
        fs::write(&path, MODULE_YAML).unwrap();

        let module = FileLoader::new().load_module(&path).await.unwrap();
        assert_eq!(module.id, "foundation/logic/deductive-reasoning");
        assert_eq!(module.components().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_module_reports_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.module.yml");
        fs::write(&path, MODULE_YAML.replace("foundation/logic", "Foundation/logic")).unwrap();

        let err = FileLoader::new().load_module(&path).await.unwrap_err();
        match err {
            Error::InvalidDefinition { path: p, errors } => {
                assert_eq!(p, path);
                assert_eq!(errors[0].path, "id");
            }
            other => panic!("Expected invalid definition, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_load_error() {
        let err = FileLoader::new()
            .load_module(Path::new("/nonexistent/x.module.yml"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Load { .. }));
    }

    #[tokio::test]
    async fn test_check_file_reports_without_failing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.module.yml");
        fs::write(&path, MODULE_YAML.replace("version: 1.0.0", "version: one")).unwrap();

        let (kind, result) = FileLoader::new().check_file(&path).await.unwrap();
        assert_eq!(kind, DefinitionKind::Module);
        assert!(!result.valid);
        assert_eq!(result.errors[0].path, "version");
    }

    #[tokio::test]
    async fn test_check_file_rejects_unknown_kind() {
        let err = FileLoader::new()
            .check_file(Path::new("notes.yml"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Load { .. }));
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("p.persona.json");
        fs::write(&path, "{ not json").unwrap();

        let err = FileLoader::new().load_persona(&path).await.unwrap_err();
        assert!(err.to_string().contains("invalid JSON"));
    }

    #[test]
    fn test_validator_and_loader_agree_on_instruction_items() {
        let path = Path::new("x.module.json");
        let base: Value = serde_yaml::from_str(MODULE_YAML).unwrap();

        for (list, item) in [
            ("principles", serde_json::json!({"principle": "x", "rationale": 3})),
            ("process", serde_json::json!({"step": "x", "detail": ["a"]})),
            ("criteria", serde_json::json!({"item": "x", "verification": false})),
            ("principles", serde_json::json!({"principle": "x", "rationale": "why"})),
            ("criteria", serde_json::json!({"item": "x", "verification": "how"})),
        ] {
            let mut value = base.clone();
            value["instruction"][list] = serde_json::json!([item]);

            let valid = validate_module(&value).valid;
            match module_from_value(value, path) {
                Ok(_) => assert!(valid, "{} item loaded but failed validation", list),
                Err(Error::InvalidDefinition { .. }) => assert!(!valid),
                Err(other) => panic!("{} item slipped past validation: {}", list, other),
            }
        }
    }
}
