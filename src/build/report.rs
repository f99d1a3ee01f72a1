//! Machine-readable summary of a build.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::registry::ConflictStrategy;
use crate::render::{DIRECTIVE_ORDER, SEPARATOR};
use crate::types::Persona;

use super::engine::{BuildOptions, ResolvedGroup};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildReport {
    pub persona_name: String,
    pub persona_version: String,
    pub schema_version: String,
    pub tool_name: String,
    pub tool_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub built_at: Option<DateTime<Utc>>,
    pub persona_digest: String,
    pub module_groups: Vec<ReportGroup>,
    pub group_count: usize,
    pub module_count: usize,
    pub configuration: ReportConfiguration,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportGroup {
    pub group_name: Option<String>,
    pub modules: Vec<ReportModule>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportModule {
    pub id: String,
    pub name: String,
    pub version: String,
    /// `type:path` of the winning registration
    pub source: String,
    pub digest: String,
    pub deprecated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replaced_by: Option<String>,
}

/// Settings the output was rendered with.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportConfiguration {
    pub directive_order: Vec<String>,
    pub separator: String,
    pub attribution: bool,
    pub conflict_strategy: ConflictStrategy,
}

/// SHA-256 over the canonical JSON form of a definition.
fn digest<T: Serialize>(value: &T) -> String {
    let bytes = serde_json::to_vec(value).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    hex::encode(hasher.finalize())
}

/// Summarize a finished build. Pure: the timestamp comes from `options`.
pub fn generate_build_report(
    persona: &Persona,
    groups: &[ResolvedGroup],
    options: &BuildOptions,
) -> BuildReport {
    let module_groups: Vec<ReportGroup> = groups
        .iter()
        .map(|group| ReportGroup {
            group_name: group.name.clone(),
            modules: group
                .modules
                .iter()
                .map(|resolved| {
                    let module = &resolved.module;
                    ReportModule {
                        id: module.id.clone(),
                        name: module.metadata.name.clone(),
                        version: module.version.clone(),
                        source: resolved.source.to_string(),
                        digest: digest(&**module),
                        deprecated: module.is_deprecated(),
                        replaced_by: module.metadata.replaced_by.clone(),
                    }
                })
                .collect(),
        })
        .collect();

    let module_count = module_groups.iter().map(|g| g.modules.len()).sum();

    BuildReport {
        persona_name: persona.name.clone(),
        persona_version: persona.version.clone(),
        schema_version: persona.schema_version.clone(),
        tool_name: options.tool.name.clone(),
        tool_version: options.tool.version.clone(),
        built_at: options.tool.built_at,
        persona_digest: digest(persona),
        group_count: module_groups.len(),
        module_count,
        module_groups,
        configuration: ReportConfiguration {
            directive_order: DIRECTIVE_ORDER.iter().map(|s| s.to_string()).collect(),
            separator: SEPARATOR.to_string(),
            attribution: persona.attribution,
            conflict_strategy: options.strategy,
        },
    }
}
