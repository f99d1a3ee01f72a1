//! Configuration for ums-build
//!
//! Sources, highest precedence first:
//! 1. CLI arguments
//! 2. Environment variables (`UMS_*`)
//! 3. Configuration file (TOML)
//! 4. Defaults

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::registry::{ConflictStrategy, ModuleSource};
use crate::render::RenderOptions;

/// File names searched in the working directory, in order.
const LOCAL_CONFIG_FILES: &[&str] = &["ums.toml", ".ums/config.toml"];

const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Build and render settings
    pub build: BuildSettings,

    /// Module sources, loaded in this order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<ModuleSource>,

    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    /// Strategy applied when several sources define the same module id
    pub conflict_strategy: ConflictStrategy,

    /// Append an attribution line after every module block
    pub attribution: bool,

    /// Literal text placed before the rendered document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,

    /// Literal text placed after the rendered document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,

    /// Write a JSON build report next to the output
    pub emit_report: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warn, error
    pub level: String,

    /// Log file path (unset = no file logging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Size hint in MB used to pick the rotation interval
    pub max_file_size_mb: u64,

    /// Number of rotated log files to keep
    pub max_files: u32,

    /// JSON formatted log lines
    pub json_format: bool,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            conflict_strategy: ConflictStrategy::Error,
            attribution: false,
            header: None,
            footer: None,
            emit_report: false,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
            max_file_size_mb: 100,
            max_files: 5,
            json_format: false,
        }
    }
}

impl BuildConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = match Self::find_config_file(config_path)? {
            Some(path) => {
                debug!(path = %path.display(), "Loading configuration file");
                let content = fs::read_to_string(&path).map_err(|e| Error::IoRead {
                    path: path.clone(),
                    source: e,
                })?;
                let config = Self::from_toml_str(&content)?;
                info!(path = %path.display(), "Configuration loaded from file");
                config
            }
            None => Self::default(),
        };

        config.apply_env_overrides()?;
        config.expand_paths();
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration text without env overrides or validation
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigParse {
            message: e.message().to_string(),
            source: Some(e),
        })
    }

    /// Find the configuration file to use
    pub fn find_config_file(explicit_path: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit_path {
            let path = PathBuf::from(expand_path(&path.to_string_lossy()));
            if path.exists() {
                return Ok(Some(path));
            }
            return Err(Error::ConfigNotFound { path });
        }

        let mut search_paths: Vec<PathBuf> =
            LOCAL_CONFIG_FILES.iter().map(PathBuf::from).collect();
        if let Some(dir) = dirs::config_dir() {
            search_paths.push(dir.join("ums").join("config.toml"));
        }

        for path in search_paths {
            if path.exists() {
                debug!(path = %path.display(), "Found configuration file");
                return Ok(Some(path));
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(None)
    }

    /// Apply `UMS_*` environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("UMS_CONFLICT_STRATEGY") {
            self.build.conflict_strategy = val.parse()?;
        }
        if let Ok(val) = std::env::var("UMS_ATTRIBUTION") {
            self.build.attribution = parse_flag(&val);
        }
        if let Ok(val) = std::env::var("UMS_HEADER") {
            self.build.header = Some(val);
        }
        if let Ok(val) = std::env::var("UMS_FOOTER") {
            self.build.footer = Some(val);
        }
        if let Ok(val) = std::env::var("UMS_EMIT_REPORT") {
            self.build.emit_report = parse_flag(&val);
        }

        if let Ok(val) = std::env::var("UMS_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("UMS_LOG_FILE") {
            self.logging.file = Some(val);
        }
        if let Ok(val) = std::env::var("UMS_LOG_JSON") {
            self.logging.json_format = parse_flag(&val);
        }

        Ok(())
    }

    /// Expand `~` and environment variables in paths
    pub fn expand_paths(&mut self) {
        for source in &mut self.sources {
            source.path = PathBuf::from(expand_path(&source.path.to_string_lossy()));
        }
        if let Some(ref file) = self.logging.file {
            self.logging.file = Some(expand_path(file));
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (i, source) in self.sources.iter().enumerate() {
            if source.path.as_os_str().is_empty() {
                return Err(Error::config_field_invalid(
                    format!("sources[{}].path", i),
                    "source path cannot be empty",
                ));
            }
        }

        if !VALID_LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::config_field_invalid(
                "logging.level",
                format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            ));
        }

        Ok(())
    }

    /// Header and footer as render options
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            header: self.build.header.clone(),
            footer: self.build.footer.clone(),
        }
    }
}

fn parse_flag(val: &str) -> bool {
    val.eq_ignore_ascii_case("true") || val == "1"
}

/// Expand ~ and environment variables in paths
fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .unwrap_or_else(|_| std::borrow::Cow::Borrowed(path))
        .into_owned()
}

/// Write a commented default configuration file
pub fn init_config(path: Option<&Path>, force: bool) -> Result<PathBuf> {
    let config_path = path
        .map(|p| PathBuf::from(expand_path(&p.to_string_lossy())))
        .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILES[0]));

    if config_path.exists() && !force {
        return Err(Error::config_validation(format!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            config_path.display()
        )));
    }

    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::IoWrite {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    fs::write(&config_path, generate_default_config()).map_err(|e| Error::IoWrite {
        path: config_path.clone(),
        source: e,
    })?;

    Ok(config_path)
}

/// Default configuration content with comments
pub fn generate_default_config() -> String {
    r#"# ums-build configuration

[build]
# Strategy when several sources define the same module id:
# "error" fails the build, "warn" keeps the first, "replace" keeps the last
conflict_strategy = "error"

# Append "[Attribution: <module id>]" after every module block
attribution = false

# Literal text placed before / after the rendered document
# header = "<!-- generated by ums-build -->"
# footer = ""

# Write <output>.build.json next to the rendered document
emit_report = false

# Module sources, loaded in the order listed.
# Later sources win under the "replace" strategy.
# [[sources]]
# type = "standard"
# path = "./instructions-modules"
#
# [[sources]]
# type = "local"
# path = "./modules"

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log file path (comment out to disable file logging)
# file = "~/.ums/logs/ums-build.log"

# Size hint in MB used to pick the rotation interval
max_file_size_mb = 100

# Number of rotated log files to keep
max_files = 5

# Enable JSON formatted logging
json_format = false
"#
    .to_string()
}
