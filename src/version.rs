//! Build metadata embedded by `build.rs`.

use std::fmt;

use crate::build::ToolMeta;

/// Compile-time facts about this binary.
#[derive(Debug, Clone, Copy)]
pub struct BuildInfo {
    pub name: &'static str,
    pub version: &'static str,
    /// Short commit hash, or "unknown" outside a git checkout
    pub git_hash: &'static str,
    pub git_branch: &'static str,
    git_dirty: &'static str,
    pub build_timestamp: &'static str,
    pub target: &'static str,
    pub host: &'static str,
    pub profile: &'static str,
    pub rustc_version: &'static str,
}

const CURRENT: BuildInfo = BuildInfo {
    name: env!("CARGO_PKG_NAME"),
    version: env!("CARGO_PKG_VERSION"),
    git_hash: env!("UMS_GIT_HASH"),
    git_branch: env!("UMS_GIT_BRANCH"),
    git_dirty: env!("UMS_GIT_DIRTY"),
    build_timestamp: env!("UMS_BUILD_TIMESTAMP"),
    target: env!("UMS_TARGET"),
    host: env!("UMS_HOST"),
    profile: env!("UMS_PROFILE"),
    rustc_version: env!("UMS_RUSTC_VERSION"),
};

/// Build information for the running binary
pub fn build_info() -> BuildInfo {
    CURRENT
}

impl BuildInfo {
    pub fn git_dirty(&self) -> bool {
        self.git_dirty == "true"
    }

    /// Commit the binary was built from, marked when the tree had local edits
    pub fn revision(&self) -> String {
        if self.git_dirty() {
            format!("{}.dirty", self.git_hash)
        } else {
            self.git_hash.to_string()
        }
    }

    /// Package version with the revision as semver build metadata, e.g. `0.1.0+1a2b3c4d`
    pub fn full_version(&self) -> String {
        format!("{}+{}", self.version, self.revision())
    }

    pub fn is_release(&self) -> bool {
        self.profile == "release"
    }

    /// Tool identity echoed into build reports; the caller stamps `built_at`
    pub fn tool_meta(&self) -> ToolMeta {
        ToolMeta {
            name: self.name.to_string(),
            version: self.full_version(),
            built_at: None,
        }
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.name, self.full_version())?;
        writeln!(f)?;
        writeln!(f, "  revision  {} ({})", self.revision(), self.git_branch)?;
        writeln!(f, "  built     {} ({})", self.build_timestamp, self.profile)?;
        writeln!(f, "  target    {}", self.target)?;
        if self.host != self.target {
            writeln!(f, "  host      {}", self.host)?;
        }
        writeln!(f, "  compiler  {}", self.rustc_version)
    }
}

/// Print version information to stdout
pub fn print_version() {
    print!("{}", build_info());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_version_is_semver() {
        let info = build_info();
        let parsed = semver::Version::parse(&info.full_version()).unwrap();
        assert_eq!(parsed.to_string(), info.full_version());
        assert!(!parsed.build.is_empty());
    }

    #[test]
    fn test_revision_marks_dirty_tree() {
        let info = BuildInfo {
            git_hash: "1a2b3c4d",
            git_dirty: "true",
            ..build_info()
        };
        assert_eq!(info.revision(), "1a2b3c4d.dirty");
        assert_eq!(
            info.full_version(),
            format!("{}+1a2b3c4d.dirty", info.version)
        );
    }

    #[test]
    fn test_tool_meta() {
        let meta = build_info().tool_meta();
        assert_eq!(meta.name, "ums-build");
        assert!(meta.version.starts_with(env!("CARGO_PKG_VERSION")));
        assert!(meta.built_at.is_none());
    }

    #[test]
    fn test_display_lists_revision_and_target() {
        let display = build_info().to_string();
        assert!(display.starts_with("ums-build "));
        assert!(display.contains("revision"));
        assert!(display.contains("target"));
        assert!(display.contains("compiler"));
    }
}
