//! Persona recipes: which modules to compose, in what order and grouping.

use serde::{Deserialize, Serialize};

/// A named composition recipe referencing modules plus render preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    pub name: String,
    pub version: String,
    pub schema_version: String,
    pub description: String,
    pub semantic: String,
    #[serde(default)]
    pub identity: String,
    #[serde(default)]
    pub attribution: bool,
    pub module_groups: Vec<ModuleReference>,
}

impl Persona {
    /// Every referenced module id in declared order, repeats included.
    pub fn referenced_ids(&self) -> impl Iterator<Item = &str> {
        self.module_groups.iter().flat_map(|r| r.ids())
    }

    /// Copy of this persona with attribution forced on.
    pub fn with_attribution(&self) -> Self {
        Persona {
            attribution: true,
            ..self.clone()
        }
    }
}

/// One persona entry: a bare module id or a group of ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModuleReference {
    Id(String),
    Group(ModuleGroup),
}

impl ModuleReference {
    pub fn name(&self) -> Option<&str> {
        match self {
            ModuleReference::Id(_) => None,
            ModuleReference::Group(group) => group.name.as_deref(),
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        let ids: &[String] = match self {
            ModuleReference::Id(id) => std::slice::from_ref(id),
            ModuleReference::Group(group) => &group.ids,
        };
        ids.iter().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mixed_references() {
        let persona: Persona = serde_json::from_value(json!({
            "name": "Reviewer",
            "version": "1.0.0",
            "schemaVersion": "2.0",
            "description": "Reviews code",
            "semantic": "code review",
            "moduleGroups": [
                "foundation/logic/x",
                {"name": "Rust", "ids": ["technology/rust/a", "technology/rust/b"]}
            ]
        }))
        .unwrap();

        assert!(persona.identity.is_empty());
        assert!(!persona.attribution);
        assert_eq!(persona.module_groups[0].name(), None);
        assert_eq!(persona.module_groups[1].name(), Some("Rust"));
        let ids: Vec<_> = persona.referenced_ids().collect();
        assert_eq!(
            ids,
            vec!["foundation/logic/x", "technology/rust/a", "technology/rust/b"]
        );
        assert!(persona.with_attribution().attribution);
    }
}
