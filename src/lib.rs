//! ums-build - compose instruction modules into persona documents
//!
//! Modules are small, independently authored units of instruction content
//! addressed by hierarchical ids (`foundation/logic/deductive-reasoning`).
//! A persona names the modules to include, in order and optionally grouped.
//! The pipeline loads module definitions from ordered sources into a
//! [`registry::ModuleRegistry`], resolves the persona with
//! [`build::BuildEngine`] and renders the result with [`render`].

pub mod build;
pub mod cli;
pub mod config;
pub mod error;
pub mod loader;
pub mod logging;
pub mod registry;
pub mod render;
pub mod types;
pub mod validation;
pub mod version;

pub use error::{Error, ErrorCode, Result};
