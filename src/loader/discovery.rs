//! Module file discovery over configured source roots.

use std::path::{Path, PathBuf};

use tracing::info;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::registry::{ModuleRegistry, ModuleSource};

use super::DefinitionLoader;

/// File name suffixes recognised as module definitions.
pub const MODULE_SUFFIXES: &[&str] = &[".module.yml", ".module.yaml", ".module.json"];

/// File name suffixes recognised as persona definitions.
pub const PERSONA_SUFFIXES: &[&str] = &[".persona.yml", ".persona.yaml", ".persona.json"];

/// Which kind of definition a file holds, judged by its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionKind {
    Module,
    Persona,
}

impl DefinitionKind {
    pub fn of(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        if MODULE_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
            Some(DefinitionKind::Module)
        } else if PERSONA_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
            Some(DefinitionKind::Persona)
        } else {
            None
        }
    }
}

pub fn is_module_file(path: &Path) -> bool {
    DefinitionKind::of(path) == Some(DefinitionKind::Module)
}

/// All module files under `root`, in sorted path order.
pub fn discover_module_files(root: &Path) -> Result<Vec<PathBuf>> {
    walk(root, is_module_file)
}

/// All module and persona files under `root`, in sorted path order.
pub fn discover_definition_files(root: &Path) -> Result<Vec<PathBuf>> {
    walk(root, |path| DefinitionKind::of(path).is_some())
}

fn walk(root: &Path, keep: impl Fn(&Path) -> bool) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(Error::load(root, "module source directory does not exist"));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::load(root, e.to_string()))?;
        if entry.file_type().is_file() && keep(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Counts from one ingestion pass.
#[derive(Debug, Clone, Default)]
pub struct LoadSummary {
    /// Modules loaded per source, in ingestion order
    pub per_source: Vec<(ModuleSource, usize)>,
}

impl LoadSummary {
    pub fn total(&self) -> usize {
        self.per_source.iter().map(|(_, count)| count).sum()
    }
}

/// Load every source into the registry, one after another in declared order.
///
/// The first failing file aborts the load with its error.
pub async fn load_sources(
    registry: &mut ModuleRegistry,
    sources: &[ModuleSource],
    loader: &dyn DefinitionLoader,
) -> Result<LoadSummary> {
    let mut summary = LoadSummary::default();

    for source in sources {
        let files = discover_module_files(&source.path)?;
        for file in &files {
            let module = loader.load_module(file).await?;
            registry.add(module, source.clone());
        }
        info!(source = %source, modules = files.len(), "Source loaded");
        summary.per_source.push((source.clone(), files.len()));
    }

    Ok(summary)
}
