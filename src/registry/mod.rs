//! Module registry
//!
//! An append-only store of modules keyed by id. Every registration is kept,
//! together with its source and insertion time, so that colliding ids can be
//! resolved later under a [`ConflictStrategy`] instead of at insertion.

mod strategy;

pub use strategy::{ConflictStrategy, ModuleSource, SourceType};

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{Module, Tier};

/// One registration of a module.
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    pub module: Arc<Module>,
    pub source: ModuleSource,
    pub added_at: DateTime<Utc>,
}

// ─────────────────────────────────────────────────────────────────
// Module Registry
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct ModuleRegistry {
    /// Entries per id in insertion order
    entries: BTreeMap<String, Vec<RegistryEntry>>,

    /// Strategy used when a resolve call does not name one
    default_strategy: ConflictStrategy,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategy(default_strategy: ConflictStrategy) -> Self {
        Self {
            entries: BTreeMap::new(),
            default_strategy,
        }
    }

    pub fn default_strategy(&self) -> ConflictStrategy {
        self.default_strategy
    }

    /// Register a module. Never rejects; collisions are kept side by side.
    pub fn add(&mut self, module: impl Into<Arc<Module>>, source: ModuleSource) {
        let module = module.into();
        let entries = self.entries.entry(module.id.clone()).or_default();
        debug!(
            id = %module.id,
            source = %source,
            entries = entries.len() + 1,
            "Module registered"
        );
        entries.push(RegistryEntry {
            module,
            source,
            added_at: Utc::now(),
        });
    }

    /// Register every module from one source, in order.
    pub fn add_all<I, M>(&mut self, modules: I, source: &ModuleSource)
    where
        I: IntoIterator<Item = M>,
        M: Into<Arc<Module>>,
    {
        for module in modules {
            self.add(module, source.clone());
        }
    }

    pub fn has(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Resolve an id to one module.
    ///
    /// Returns `Ok(None)` when nothing is registered under `id`. With more than
    /// one entry, `Error` fails with [`Error::Conflict`], `Warn` picks the
    /// first-inserted entry and `Replace` the last-inserted one.
    pub fn resolve(
        &self,
        id: &str,
        strategy: Option<ConflictStrategy>,
    ) -> Result<Option<Arc<Module>>> {
        Ok(self
            .resolve_entry(id, strategy)?
            .map(|entry| Arc::clone(&entry.module)))
    }

    /// Like [`resolve`](Self::resolve), returning the winning entry with its provenance.
    pub fn resolve_entry(
        &self,
        id: &str,
        strategy: Option<ConflictStrategy>,
    ) -> Result<Option<&RegistryEntry>> {
        let Some(entries) = self.entries.get(id) else {
            return Ok(None);
        };

        if entries.len() == 1 {
            return Ok(entries.first());
        }

        match strategy.unwrap_or(self.default_strategy) {
            ConflictStrategy::Error => Err(Error::Conflict {
                module_id: id.to_string(),
                conflict_count: entries.len(),
            }),
            ConflictStrategy::Warn => Ok(entries.first()),
            ConflictStrategy::Replace => Ok(entries.last()),
        }
    }

    /// Resolve every registered id.
    pub fn resolve_all(
        &self,
        strategy: Option<ConflictStrategy>,
    ) -> Result<BTreeMap<String, Arc<Module>>> {
        let mut resolved = BTreeMap::new();
        for id in self.entries.keys() {
            if let Some(module) = self.resolve(id, strategy)? {
                resolved.insert(id.clone(), module);
            }
        }
        Ok(resolved)
    }

    /// All entries for an id, only when it has more than one.
    pub fn get_conflicts(&self, id: &str) -> Option<&[RegistryEntry]> {
        self.entries
            .get(id)
            .filter(|entries| entries.len() > 1)
            .map(Vec::as_slice)
    }

    pub fn conflicting_ids(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, entries)| entries.len() > 1)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Number of registrations per source, keyed `type:path`.
    pub fn source_summary(&self) -> BTreeMap<String, usize> {
        let mut summary = BTreeMap::new();
        for entry in self.entries.values().flatten() {
            *summary.entry(entry.source.to_string()).or_insert(0) += 1;
        }
        summary
    }

    /// Resolve every id and group the winners by tier.
    ///
    /// Tiers appear in their fixed order and only when non-empty; ids are
    /// sorted within a tier.
    pub fn resolve_by_tier(
        &self,
        strategy: Option<ConflictStrategy>,
    ) -> Result<Vec<(Tier, Vec<Arc<Module>>)>> {
        let mut tiers: BTreeMap<Tier, Vec<Arc<Module>>> = BTreeMap::new();
        for (_, module) in self.resolve_all(strategy)? {
            if let Some(tier) = module.tier() {
                tiers.entry(tier).or_default().push(module);
            }
        }
        Ok(Tier::all()
            .iter()
            .filter_map(|tier| tiers.remove(tier).map(|modules| (*tier, modules)))
            .collect())
    }

    /// Number of distinct ids.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
