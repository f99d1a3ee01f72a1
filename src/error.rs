//! Error types for ums-build
//!
//! Every failure carries a stable `E###` code, maps to a process exit code and
//! may offer a hint for the terminal.
//!
//! Validation problems are not errors in this sense: the validators return
//! [`ValidationError`] values and never fail. They only surface here when a
//! loader rejects a definition ([`Error::InvalidDefinition`]).

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::validation::ValidationError;

/// Result type alias for ums-build operations
pub type Result<T> = std::result::Result<T, Error>;

/// Stable numeric codes, grouped by hundreds per failure area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    // 1xx configuration
    ConfigNotFound = 100,
    ConfigParseError = 101,
    ConfigValidation = 102,

    // 2xx filesystem
    IoRead = 200,
    IoWrite = 201,
    IoPermission = 202,
    IoNotFound = 203,

    // 3xx loading and validation
    LoadFailed = 300,
    DefinitionInvalid = 301,
    ValidationFailed = 302,

    // 4xx modules and registry
    ModuleInvalid = 400,
    ModuleNotFound = 401,
    ModuleConflict = 410,
    InvalidStrategy = 411,

    // 5xx build
    BuildFailed = 500,

    // 9xx internal
    InternalError = 900,
}

impl ErrorCode {
    /// Display form, e.g. `E410`
    pub fn as_str(&self) -> String {
        format!("E{}", *self as u16)
    }

    /// Process exit code: 10 per hundred-range of codes
    pub fn exit_code(&self) -> i32 {
        match *self as u16 {
            code @ 100..=599 => i32::from(code / 100) * 10,
            900..=999 => 90,
            _ => 1,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type
#[derive(Error, Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Configuration
    // ─────────────────────────────────────────────────────────────

    /// Explicit `--config` path does not exist
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// TOML syntax or type mismatch in the configuration file
    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<toml::de::Error>,
    },

    /// Parsed configuration holds an unusable value
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String, field: Option<String> },

    // ─────────────────────────────────────────────────────────────
    // Filesystem and serialization
    // ─────────────────────────────────────────────────────────────

    /// Reading a configuration or output file failed
    #[error("Failed to read file: {path}")]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing a rendered document, report or config template failed
    #[error("Failed to write file: {path}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Any other filesystem failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Rendering the effective configuration failed
    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    /// Serializing a report or module listing failed
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // Loading
    // ─────────────────────────────────────────────────────────────

    /// A definition file could not be read or parsed
    #[error("Failed to load {path}: {message}")]
    Load { path: PathBuf, message: String },

    /// A definition file parsed but failed schema validation
    #[error("Invalid definition {path}: {}", summarize(errors))]
    InvalidDefinition {
        path: PathBuf,
        errors: Vec<ValidationError>,
    },

    /// One or more checked definition files failed validation
    #[error("{invalid} of {checked} definition file(s) failed validation")]
    ValidationFailed { invalid: usize, checked: usize },

    // ─────────────────────────────────────────────────────────────
    // Modules and registry
    // ─────────────────────────────────────────────────────────────

    /// Module could not be finalized by the builder
    #[error("Invalid module {id}: {message}")]
    InvalidModule { id: String, message: String },

    /// No registry entry for an id
    #[error("Module not found: {id}")]
    ModuleNotFound { id: String },

    /// More than one registry entry for an id under the `error` strategy
    #[error("Module conflict for '{module_id}': {conflict_count} entries registered")]
    Conflict {
        module_id: String,
        conflict_count: usize,
    },

    /// Unknown conflict strategy name
    #[error("Invalid conflict strategy '{value}'. Must be one of: error, warn, replace")]
    InvalidStrategy { value: String },

    // ─────────────────────────────────────────────────────────────
    // Build
    // ─────────────────────────────────────────────────────────────

    /// Aggregated build failure
    #[error("Build failed: {message}")]
    Build {
        message: String,
        missing_ids: Vec<String>,
    },

    // ─────────────────────────────────────────────────────────────
    // Internal
    // ─────────────────────────────────────────────────────────────

    /// Tool bug or unexpected runtime failure
    #[error("Internal error: {0}")]
    Internal(String),
}

fn summarize(errors: &[ValidationError]) -> String {
    match errors {
        [] => "no details".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{} (and {} more)", first, rest.len()),
    }
}

impl Error {
    /// Stable code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::ConfigNotFound { .. } => ErrorCode::ConfigNotFound,
            Error::ConfigParse { .. } => ErrorCode::ConfigParseError,
            Error::ConfigValidation { .. } => ErrorCode::ConfigValidation,

            Error::IoRead { .. } => ErrorCode::IoRead,
            Error::IoWrite { .. } => ErrorCode::IoWrite,
            Error::Io(e) => match e.kind() {
                std::io::ErrorKind::NotFound => ErrorCode::IoNotFound,
                std::io::ErrorKind::PermissionDenied => ErrorCode::IoPermission,
                _ => ErrorCode::IoRead,
            },
            Error::Toml(_) => ErrorCode::ConfigParseError,
            Error::Json(_) => ErrorCode::InternalError,

            Error::Load { .. } => ErrorCode::LoadFailed,
            Error::InvalidDefinition { .. } => ErrorCode::DefinitionInvalid,
            Error::ValidationFailed { .. } => ErrorCode::ValidationFailed,

            Error::InvalidModule { .. } => ErrorCode::ModuleInvalid,
            Error::ModuleNotFound { .. } => ErrorCode::ModuleNotFound,
            Error::Conflict { .. } => ErrorCode::ModuleConflict,
            Error::InvalidStrategy { .. } => ErrorCode::InvalidStrategy,

            Error::Build { .. } => ErrorCode::BuildFailed,

            Error::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        self.code().exit_code()
    }

    /// Next step to offer the user, when there is an obvious one
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Error::ConfigNotFound { .. } => Some(
                "Run 'ums-build config init' to create a default configuration file.",
            ),
            Error::ConfigParse { .. } => Some(
                "Check your configuration file syntax. Run 'ums-build config validate' to see details.",
            ),
            Error::ConfigValidation { .. } => Some(
                "Review the configuration file and fix the invalid values.",
            ),
            Error::InvalidDefinition { .. } => Some(
                "Run 'ums-build validate <file>' to list every problem in the definition.",
            ),
            Error::ModuleNotFound { .. } => Some(
                "Run 'ums-build list' to see the modules loaded from the configured sources.",
            ),
            Error::Conflict { .. } => Some(
                "Several sources define this module. Use --strategy warn or --strategy replace, or remove the duplicate.",
            ),
            Error::InvalidStrategy { .. } => Some(
                "Valid conflict strategies are 'error', 'warn' and 'replace'.",
            ),
            Error::Build { .. } => Some(
                "Check the module ids referenced by the persona. Run 'ums-build list' to see available modules.",
            ),
            _ => None,
        }
    }

    /// Colored multi-line form for stderr, including validation details and hint
    pub fn format_for_terminal(&self) -> String {
        let mut output = format!("\x1b[31mError [{}]\x1b[0m: {}\n", self.code().as_str(), self);

        if let Error::InvalidDefinition { errors, .. } = self {
            for err in errors {
                output.push_str(&format!("  - {}\n", err));
            }
        }

        if let Some(hint) = self.suggestion() {
            output.push_str(&format!("\n\x1b[33mHint\x1b[0m: {}\n", hint));
        }

        output
    }

    /// Single uncolored line for log files
    pub fn format_for_log(&self) -> String {
        format!("[{}] {}", self.code().as_str(), self)
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    /// Parse error without an underlying TOML error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Error::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Validation error not tied to one field
    pub fn config_validation(message: impl Into<String>) -> Self {
        Error::ConfigValidation {
            message: message.into(),
            field: None,
        }
    }

    /// Validation error naming the offending field, e.g. `logging.level`
    pub fn config_field_invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ConfigValidation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a load error for a definition path
    pub fn load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Load {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create the aggregated missing-modules build error
    pub fn missing_modules(missing_ids: Vec<String>) -> Self {
        Error::Build {
            message: format!(
                "{} referenced module(s) not found: {}",
                missing_ids.len(),
                missing_ids.join(", ")
            ),
            missing_ids,
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
