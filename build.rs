//! Build script for ums-build
//!
//! Embeds build-time information into the binary so that build reports can
//! name the exact tool revision that produced them.

use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");

    let git_hash = run_git(&["rev-parse", "--short=8", "HEAD"]).unwrap_or_else(unknown);
    let git_branch = run_git(&["rev-parse", "--abbrev-ref", "HEAD"]).unwrap_or_else(unknown);
    let git_dirty = match run_git(&["status", "--porcelain"]) {
        Some(out) if !out.is_empty() => "true",
        Some(_) => "false",
        None => "unknown",
    };

    let build_timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();
    let rustc_version = Command::new("rustc")
        .arg("--version")
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(unknown);

    let vars = [
        ("UMS_GIT_HASH", git_hash),
        ("UMS_GIT_BRANCH", git_branch),
        ("UMS_GIT_DIRTY", git_dirty.to_string()),
        ("UMS_BUILD_TIMESTAMP", build_timestamp),
        ("UMS_TARGET", env::var("TARGET").unwrap_or_else(|_| unknown())),
        ("UMS_PROFILE", env::var("PROFILE").unwrap_or_else(|_| unknown())),
        ("UMS_RUSTC_VERSION", rustc_version),
        ("UMS_HOST", env::var("HOST").unwrap_or_else(|_| unknown())),
    ];

    for (key, value) in vars {
        println!("cargo:rustc-env={}={}", key, value);
    }
}

/// Run a git command and return its trimmed stdout on success
fn run_git(args: &[&str]) -> Option<String> {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
}

fn unknown() -> String {
    "unknown".to_string()
}
