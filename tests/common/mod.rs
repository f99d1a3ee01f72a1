//! Common test utilities and fixtures
//!
//! This module provides shared test infrastructure

#![allow(dead_code)]

use std::path::PathBuf;

use assert_cmd::Command;

/// Get the path to the test fixtures directory
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Get a path to a specific fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

/// Standard module source shipped with the fixtures
pub fn standard_source() -> PathBuf {
    fixture_path("standard")
}

/// Local override source; redefines one standard module
pub fn local_source() -> PathBuf {
    fixture_path("local")
}

pub fn persona_fixture(name: &str) -> PathBuf {
    fixtures_dir().join("personas").join(format!("{}.persona.yml", name))
}

/// Get the valid config fixture path
pub fn valid_config_fixture() -> PathBuf {
    fixture_path("valid_config.toml")
}

/// Get the invalid config fixture path
pub fn invalid_config_fixture() -> PathBuf {
    fixture_path("invalid_config.toml")
}

/// The binary, isolated from the caller's environment and working directory
pub fn ums_cmd(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("ums-build").unwrap();
    cmd.current_dir(dir);
    for var in [
        "UMS_CONFIG",
        "UMS_CONFLICT_STRATEGY",
        "UMS_ATTRIBUTION",
        "UMS_HEADER",
        "UMS_FOOTER",
        "UMS_EMIT_REPORT",
        "UMS_LOG_LEVEL",
        "UMS_LOG_FILE",
        "UMS_LOG_JSON",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_dir_exists() {
        assert!(fixtures_dir().exists(), "Fixtures directory should exist");
    }

    #[test]
    fn test_sources_exist() {
        assert!(standard_source().is_dir());
        assert!(local_source().is_dir());
    }

    #[test]
    fn test_config_fixtures_exist() {
        assert!(valid_config_fixture().exists());
        assert!(invalid_config_fixture().exists());
    }
}
