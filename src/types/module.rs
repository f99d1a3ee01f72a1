//! Module definitions and their typed content components.
//!
//! A module carries exactly one content shape: a single shorthand component
//! (`instruction`, `knowledge` or `data` at the top level) or an ordered
//! `components` list whose items are tagged by `type`. The serialized form is
//! converted through [`ModuleDocument`] so that the "exactly one shape" rule is
//! enforced on deserialization as well as by the validator.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::id::Tier;

/// Schema versions this crate understands.
pub const SUPPORTED_SCHEMA_VERSIONS: &[&str] = &["2.0"];

/// Highest allowed cognitive level.
pub const MAX_COGNITIVE_LEVEL: u8 = 6;

fn is_false(value: &bool) -> bool {
    !*value
}

// ─────────────────────────────────────────────────────────────────
// Module
// ─────────────────────────────────────────────────────────────────

/// Immutable, validated content unit keyed by a hierarchical id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ModuleDocument", into = "ModuleDocument")]
pub struct Module {
    pub id: String,
    pub version: String,
    pub schema_version: String,
    pub capabilities: Vec<String>,
    pub cognitive_level: Option<u8>,
    pub metadata: ModuleMetadata,
    pub content: ModuleContent,
}

impl Module {
    /// Components in render order, regardless of content shape.
    pub fn components(&self) -> &[Component] {
        match &self.content {
            ModuleContent::Single(component) => std::slice::from_ref(component),
            ModuleContent::Components(components) => components,
        }
    }

    pub fn tier(&self) -> Option<Tier> {
        Tier::of(&self.id)
    }

    pub fn is_deprecated(&self) -> bool {
        self.metadata.deprecated
    }
}

/// The single content shape a module carries.
#[derive(Debug, Clone, PartialEq)]
pub enum ModuleContent {
    /// One shorthand component
    Single(Component),
    /// Ordered component list
    Components(Vec<Component>),
}

/// Descriptive metadata for a module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleMetadata {
    pub name: String,
    pub description: String,
    pub semantic: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub deprecated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replaced_by: Option<String>,
}

// ─────────────────────────────────────────────────────────────────
// Components
// ─────────────────────────────────────────────────────────────────

/// A typed content field inside a module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Component {
    Instruction(Instruction),
    Knowledge(Knowledge),
    Data(DataComponent),
}

impl Component {
    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Instruction(_) => ComponentKind::Instruction,
            Component::Knowledge(_) => ComponentKind::Knowledge,
            Component::Data(_) => ComponentKind::Data,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Instruction,
    Knowledge,
    Data,
}

impl ComponentKind {
    pub fn all() -> &'static [ComponentKind] {
        &[
            ComponentKind::Instruction,
            ComponentKind::Knowledge,
            ComponentKind::Data,
        ]
    }

    /// Field name used for the shorthand form and the `type` tag.
    pub fn key(&self) -> &'static str {
        match self {
            ComponentKind::Instruction => "instruction",
            ComponentKind::Knowledge => "knowledge",
            ComponentKind::Data => "data",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Directive content: what to do and how to judge it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instruction {
    pub purpose: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub process: Vec<ProcessStep>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Constraint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub principles: Vec<Principle>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub criteria: Vec<Criterion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProcessStep {
    Text(String),
    Detailed {
        step: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
}

impl ProcessStep {
    pub fn text(&self) -> &str {
        match self {
            ProcessStep::Text(text) => text,
            ProcessStep::Detailed { step, .. } => step,
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            ProcessStep::Text(_) => None,
            ProcessStep::Detailed { detail, .. } => detail.as_deref(),
        }
    }
}

/// RFC 2119 style keyword attached to a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Must,
    Should,
    May,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Must => write!(f, "MUST"),
            Severity::Should => write!(f, "SHOULD"),
            Severity::May => write!(f, "MAY"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Constraint {
    Text(String),
    Detailed {
        rule: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        severity: Option<Severity>,
    },
}

impl Constraint {
    pub fn rule(&self) -> &str {
        match self {
            Constraint::Text(text) => text,
            Constraint::Detailed { rule, .. } => rule,
        }
    }

    pub fn severity(&self) -> Option<Severity> {
        match self {
            Constraint::Text(_) => None,
            Constraint::Detailed { severity, .. } => *severity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Principle {
    Text(String),
    Detailed {
        principle: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rationale: Option<String>,
    },
}

impl Principle {
    pub fn text(&self) -> &str {
        match self {
            Principle::Text(text) => text,
            Principle::Detailed { principle, .. } => principle,
        }
    }

    pub fn rationale(&self) -> Option<&str> {
        match self {
            Principle::Text(_) => None,
            Principle::Detailed { rationale, .. } => rationale.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Criterion {
    Text(String),
    Detailed {
        item: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        verification: Option<String>,
    },
}

impl Criterion {
    pub fn item(&self) -> &str {
        match self {
            Criterion::Text(text) => text,
            Criterion::Detailed { item, .. } => item,
        }
    }

    pub fn verification(&self) -> Option<&str> {
        match self {
            Criterion::Text(_) => None,
            Criterion::Detailed { verification, .. } => verification.as_deref(),
        }
    }
}

/// Explanatory content: concepts, worked examples and patterns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Knowledge {
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub concepts: Vec<Concept>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<Example>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patterns: Vec<Pattern>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Concept {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Example {
    pub title: String,
    pub rationale: String,
    pub snippet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    pub name: String,
    pub use_case: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub advantages: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disadvantages: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Example>,
}

/// Literal data: a format/media-type tag plus a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataComponent {
    pub format: String,
    pub value: DataValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    Text(String),
    Structured(serde_json::Value),
}

// ─────────────────────────────────────────────────────────────────
// Serialized Form
// ─────────────────────────────────────────────────────────────────

/// On-disk shape of a module, with shorthand components as optional fields.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModuleDocument {
    id: String,
    version: String,
    schema_version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    capabilities: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cognitive_level: Option<u8>,
    metadata: ModuleMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    instruction: Option<Instruction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    knowledge: Option<Knowledge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<DataComponent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    components: Option<Vec<Component>>,
}

impl TryFrom<ModuleDocument> for Module {
    type Error = String;

    fn try_from(doc: ModuleDocument) -> Result<Self, Self::Error> {
        let mut shorthand: Vec<Component> = Vec::new();
        if let Some(instruction) = doc.instruction {
            shorthand.push(Component::Instruction(instruction));
        }
        if let Some(knowledge) = doc.knowledge {
            shorthand.push(Component::Knowledge(knowledge));
        }
        if let Some(data) = doc.data {
            shorthand.push(Component::Data(data));
        }

        let content = match (shorthand.len(), doc.components) {
            (0, Some(components)) if !components.is_empty() => {
                ModuleContent::Components(components)
            }
            (0, _) => {
                return Err(format!("module '{}' has no components", doc.id));
            }
            (1, None) => ModuleContent::Single(shorthand.remove(0)),
            _ => {
                return Err(format!(
                    "module '{}': instruction, knowledge, data and components are mutually exclusive",
                    doc.id
                ));
            }
        };

        Ok(Module {
            id: doc.id,
            version: doc.version,
            schema_version: doc.schema_version,
            capabilities: doc.capabilities,
            cognitive_level: doc.cognitive_level,
            metadata: doc.metadata,
            content,
        })
    }
}

impl From<Module> for ModuleDocument {
    fn from(module: Module) -> Self {
        let mut doc = ModuleDocument {
            id: module.id,
            version: module.version,
            schema_version: module.schema_version,
            capabilities: module.capabilities,
            cognitive_level: module.cognitive_level,
            metadata: module.metadata,
            instruction: None,
            knowledge: None,
            data: None,
            components: None,
        };
        match module.content {
            ModuleContent::Single(Component::Instruction(c)) => doc.instruction = Some(c),
            ModuleContent::Single(Component::Knowledge(c)) => doc.knowledge = Some(c),
            ModuleContent::Single(Component::Data(c)) => doc.data = Some(c),
            ModuleContent::Components(list) => doc.components = Some(list),
        }
        doc
    }
}
