//! Persona resolution against a populated registry.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::registry::{ConflictStrategy, ModuleRegistry, ModuleSource};
use crate::types::{Module, Persona};

use super::report::{generate_build_report, BuildReport};

// ─────────────────────────────────────────────────────────────────
// Options
// ─────────────────────────────────────────────────────────────────

/// Identity of the tool producing a build, echoed into the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
    /// Supplied by the caller so report generation stays pure
    pub built_at: Option<DateTime<Utc>>,
}

impl Default for ToolMeta {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            built_at: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub strategy: ConflictStrategy,
    pub tool: ToolMeta,
}

// ─────────────────────────────────────────────────────────────────
// Output
// ─────────────────────────────────────────────────────────────────

/// A module chosen for the build, with the source it came from.
#[derive(Debug, Clone)]
pub struct ResolvedModule {
    pub module: Arc<Module>,
    pub source: ModuleSource,
}

/// Resolved modules for one persona entry, in declared order.
#[derive(Debug, Clone, Default)]
pub struct ResolvedGroup {
    /// Only named groups render a heading
    pub name: Option<String>,
    pub modules: Vec<ResolvedModule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeprecationWarning {
    pub module_id: String,
    pub replaced_by: Option<String>,
    pub message: String,
}

impl DeprecationWarning {
    fn for_module(module: &Module) -> Self {
        let replaced_by = module.metadata.replaced_by.clone();
        let message = match &replaced_by {
            Some(replacement) => format!(
                "Module '{}' is deprecated and has been replaced by '{}'. \
                 Update the persona to use the replacement.",
                module.id, replacement
            ),
            None => format!(
                "Module '{}' is deprecated and may be removed in a future version.",
                module.id
            ),
        };
        Self {
            module_id: module.id.clone(),
            replaced_by,
            message,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub groups: Vec<ResolvedGroup>,
    pub deprecation_warnings: Vec<DeprecationWarning>,
    pub report: BuildReport,
}

impl BuildOutput {
    pub fn module_count(&self) -> usize {
        self.groups.iter().map(|g| g.modules.len()).sum()
    }
}

// ─────────────────────────────────────────────────────────────────
// Engine
// ─────────────────────────────────────────────────────────────────

pub struct BuildEngine {
    options: BuildOptions,
}

impl BuildEngine {
    pub fn new(options: BuildOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Resolve every module the persona references, in declared order.
    ///
    /// Missing ids are collected across the whole persona and reported as one
    /// [`Error::Build`]. A conflict under the `error` strategy fails at once.
    pub fn build(&self, persona: &Persona, registry: &ModuleRegistry) -> Result<BuildOutput> {
        let strategy = self.options.strategy;
        let mut groups = Vec::with_capacity(persona.module_groups.len());
        let mut missing: Vec<String> = Vec::new();
        let mut deprecation_warnings = Vec::new();
        let mut seen_deprecated = HashSet::new();

        for reference in &persona.module_groups {
            let mut modules = Vec::new();

            for id in reference.ids() {
                let Some(entry) = registry.resolve_entry(id, Some(strategy))? else {
                    if !missing.iter().any(|m| m == id) {
                        missing.push(id.to_string());
                    }
                    continue;
                };

                if strategy == ConflictStrategy::Warn {
                    if let Some(conflicts) = registry.get_conflicts(id) {
                        let sources: Vec<String> =
                            conflicts.iter().map(|e| e.source.to_string()).collect();
                        warn!(
                            id = %id,
                            count = conflicts.len(),
                            sources = %sources.join(", "),
                            chosen = %entry.source,
                            "Module conflict, using first registration"
                        );
                    }
                }

                if entry.module.is_deprecated() && seen_deprecated.insert(id.to_string()) {
                    let warning = DeprecationWarning::for_module(&entry.module);
                    warn!(id = %id, replaced_by = ?warning.replaced_by, "Deprecated module in persona");
                    deprecation_warnings.push(warning);
                }

                debug!(id = %id, source = %entry.source, "Module resolved");
                modules.push(ResolvedModule {
                    module: Arc::clone(&entry.module),
                    source: entry.source.clone(),
                });
            }

            groups.push(ResolvedGroup {
                name: reference.name().map(str::to_string),
                modules,
            });
        }

        if !missing.is_empty() {
            return Err(Error::missing_modules(missing));
        }

        let report = generate_build_report(persona, &groups, &self.options);

        info!(
            persona = %persona.name,
            groups = report.group_count,
            modules = report.module_count,
            deprecated = deprecation_warnings.len(),
            strategy = %strategy,
            "Build complete"
        );

        Ok(BuildOutput {
            groups,
            deprecation_warnings,
            report,
        })
    }
}
