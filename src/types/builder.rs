//! Fluent construction of modules for programmatic registration.
//!
//! Setters accumulate into a staging struct; [`ModuleBuilder::build`] runs the
//! module validator over the result and only hands back a [`Module`] when it
//! passes.

use tracing::debug;

use crate::error::{Error, Result};
use crate::validation::validate_module;

use super::module::{
    Component, DataComponent, Instruction, Knowledge, Module, ModuleContent, ModuleMetadata,
    SUPPORTED_SCHEMA_VERSIONS,
};

#[derive(Debug, Clone, Default)]
pub struct ModuleBuilder {
    id: String,
    version: String,
    schema_version: Option<String>,
    capabilities: Vec<String>,
    cognitive_level: Option<u8>,
    name: String,
    description: String,
    semantic: String,
    tags: Vec<String>,
    authors: Vec<String>,
    license: Option<String>,
    replaced_by: Option<String>,
    deprecated: bool,
    components: Vec<Component>,
}

impl ModuleBuilder {
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
            ..Default::default()
        }
    }

    pub fn schema_version(mut self, schema_version: impl Into<String>) -> Self {
        self.schema_version = Some(schema_version.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn semantic(mut self, semantic: impl Into<String>) -> Self {
        self.semantic = semantic.into();
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.authors.push(author.into());
        self
    }

    pub fn license(mut self, license: impl Into<String>) -> Self {
        self.license = Some(license.into());
        self
    }

    pub fn capability(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.push(capability.into());
        self
    }

    /// Cognitive level, checked against `0..=6` on build.
    pub fn cognitive_level(mut self, level: u8) -> Self {
        self.cognitive_level = Some(level);
        self
    }

    /// Mark the module deprecated in favour of `replacement`.
    pub fn deprecated_by(mut self, replacement: impl Into<String>) -> Self {
        self.deprecated = true;
        self.replaced_by = Some(replacement.into());
        self
    }

    pub fn component(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }

    pub fn instruction(self, instruction: Instruction) -> Self {
        self.component(Component::Instruction(instruction))
    }

    pub fn knowledge(self, knowledge: Knowledge) -> Self {
        self.component(Component::Knowledge(knowledge))
    }

    pub fn data(self, data: DataComponent) -> Self {
        self.component(Component::Data(data))
    }

    /// Finalize into an immutable module, rejecting anything the validator rejects.
    pub fn build(mut self) -> Result<Module> {
        let content = match self.components.len() {
            0 => {
                return Err(Error::InvalidModule {
                    id: self.id,
                    message: "module must have at least one component".to_string(),
                })
            }
            1 => ModuleContent::Single(self.components.remove(0)),
            _ => ModuleContent::Components(self.components),
        };

        let module = Module {
            id: self.id,
            version: self.version,
            schema_version: self
                .schema_version
                .unwrap_or_else(|| SUPPORTED_SCHEMA_VERSIONS[0].to_string()),
            capabilities: self.capabilities,
            cognitive_level: self.cognitive_level,
            metadata: ModuleMetadata {
                name: self.name,
                description: self.description,
                semantic: self.semantic,
                tags: self.tags,
                authors: self.authors,
                license: self.license,
                deprecated: self.deprecated,
                replaced_by: self.replaced_by,
            },
            content,
        };

        let candidate = serde_json::to_value(&module)?;
        let result = validate_module(&candidate);
        if !result.valid {
            let message = result
                .errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(Error::InvalidModule {
                id: module.id,
                message,
            });
        }

        debug!(id = %module.id, components = module.components().len(), "Module built");
        Ok(module)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn purpose(text: &str) -> Instruction {
        Instruction {
            purpose: text.to_string(),
            ..Default::default()
        }
    }

    fn named(id: &str) -> ModuleBuilder {
        ModuleBuilder::new(id, "1.0.0")
            .name("Name")
            .description("Description")
            .semantic("semantic summary")
    }

    #[test]
    fn test_build_single_component() {
        let module = named("foundation/logic/x")
            .tag("logic")
            .instruction(purpose("P"))
            .build()
            .unwrap();

        assert_eq!(module.schema_version, "2.0");
        assert!(matches!(module.content, ModuleContent::Single(_)));
    }

    #[test]
    fn test_build_multiple_components() {
        let module = named("foundation/logic/x")
            .instruction(purpose("P"))
            .knowledge(Knowledge {
                explanation: "E".into(),
                ..Default::default()
            })
            .build()
            .unwrap();

        assert_eq!(module.components().len(), 2);
    }

    #[test]
    fn test_rejects_missing_content() {
        let err = named("foundation/logic/x").build().unwrap_err();
        assert!(matches!(err, Error::InvalidModule { .. }));
    }

    #[test]
    fn test_rejects_bad_id_and_version() {
        let err = ModuleBuilder::new("Foundation/x", "")
            .name("N")
            .description("D")
            .semantic("S")
            .instruction(purpose("P"))
            .build()
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("id"));
        assert!(msg.contains("version"));
    }

    #[test]
    fn test_rejects_out_of_range_cognitive_level() {
        let err = named("foundation/logic/x")
            .cognitive_level(9)
            .instruction(purpose("P"))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("cognitiveLevel"));
    }

    #[test]
    fn test_deprecated_with_replacement_builds() {
        let module = named("foundation/logic/old")
            .deprecated_by("foundation/logic/new")
            .instruction(purpose("P"))
            .build()
            .unwrap();
        assert!(module.is_deprecated());
        assert_eq!(
            module.metadata.replaced_by.as_deref(),
            Some("foundation/logic/new")
        );
    }
}
