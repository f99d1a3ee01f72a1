//! Core domain types: module ids, modules, personas

pub mod builder;
pub mod id;
pub mod module;
pub mod persona;

pub use builder::ModuleBuilder;
pub use id::{check_module_id, is_valid_module_id, IdViolation, Tier, MODULE_ID_PATTERN};
pub use module::{
    Component, ComponentKind, Concept, Constraint, Criterion, DataComponent, DataValue, Example,
    Instruction, Knowledge, Module, ModuleContent, ModuleMetadata, Pattern, Principle,
    ProcessStep, Severity, MAX_COGNITIVE_LEVEL, SUPPORTED_SCHEMA_VERSIONS,
};
pub use persona::{ModuleGroup, ModuleReference, Persona};
