//! CLI argument parsing using clap v4
//!
//! Defines the command-line interface for ums-build.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::registry::ConflictStrategy;
use crate::types::Tier;

/// ums-build - compose instruction modules into persona documents
///
/// Loads module definitions from the configured sources, resolves the modules
/// a persona references and renders them as a single Markdown document.
#[derive(Parser, Debug)]
#[command(name = "ums-build")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "UMS_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a persona into a Markdown document
    Build {
        /// Persona definition file (.persona.yml or .persona.json)
        #[arg(short, long)]
        persona: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Build report path (defaults to <output>.build.json when reports are enabled)
        #[arg(long)]
        report: Option<PathBuf>,

        /// Conflict strategy: error, warn or replace
        #[arg(long)]
        strategy: Option<ConflictStrategy>,

        /// Append an attribution line after every module
        #[arg(long)]
        attribution: bool,

        /// Additional local module directory (repeatable, loaded after configured sources)
        #[arg(short, long = "source")]
        sources: Vec<PathBuf>,
    },

    /// Validate module and persona definition files
    Validate {
        /// Files or directories to validate (configured sources when omitted)
        paths: Vec<PathBuf>,
    },

    /// List available modules
    List {
        /// Only show modules of this tier
        #[arg(short, long)]
        tier: Option<Tier>,

        /// Conflict strategy: error, warn or replace
        #[arg(long)]
        strategy: Option<ConflictStrategy>,
    },

    /// Show the resolved definition of one module
    Inspect {
        /// Module id, e.g. foundation/logic/deductive-reasoning
        id: String,

        /// Conflict strategy: error, warn or replace
        #[arg(long)]
        strategy: Option<ConflictStrategy>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Display version and build information
    Version,
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Display the effective configuration
    Show,

    /// Initialize a new configuration file
    Init {
        /// Path where to create the config file
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Validate the configuration file
    Validate,
}
