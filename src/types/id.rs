//! Module identifiers and tiers.
//!
//! A module id is a `/`-separated path whose first segment names one of the
//! four fixed tiers, followed by at least two lowercase alphanumeric-hyphen
//! segments, e.g. `foundation/logic/deductive-reasoning`.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Canonical module id pattern.
pub const MODULE_ID_PATTERN: &str =
    r"^(foundation|principle|technology|execution)/[a-z0-9-]+(/[a-z0-9-]+)+$";

static MODULE_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(MODULE_ID_PATTERN).expect("module id pattern is a valid regex")
});

// ─────────────────────────────────────────────────────────────────
// Tier
// ─────────────────────────────────────────────────────────────────

/// Top-level module category, encoded as the first id segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Foundation,
    Principle,
    Technology,
    Execution,
}

impl Tier {
    /// All tiers in their fixed listing order.
    pub fn all() -> &'static [Tier] {
        &[
            Tier::Foundation,
            Tier::Principle,
            Tier::Technology,
            Tier::Execution,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Foundation => "foundation",
            Tier::Principle => "principle",
            Tier::Technology => "technology",
            Tier::Execution => "execution",
        }
    }

    /// Tier of a module id, if its first segment names one.
    pub fn of(id: &str) -> Option<Tier> {
        id.split('/').next().and_then(|s| s.parse().ok())
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "foundation" => Ok(Tier::Foundation),
            "principle" => Ok(Tier::Principle),
            "technology" => Ok(Tier::Technology),
            "execution" => Ok(Tier::Execution),
            _ => Err(format!(
                "Unknown tier '{}'. Valid: foundation, principle, technology, execution",
                s
            )),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Id Violations
// ─────────────────────────────────────────────────────────────────

/// The specific way an id breaks the grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdViolation {
    Empty,
    LeadingSlash,
    TrailingSlash,
    EmptySegment,
    InvalidTier(String),
    Uppercase,
    InvalidCharacters(String),
    TooFewSegments,
}

impl fmt::Display for IdViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdViolation::Empty => write!(f, "module id must not be empty"),
            IdViolation::LeadingSlash => write!(f, "module id must not start with '/'"),
            IdViolation::TrailingSlash => write!(f, "module id must not end with '/'"),
            IdViolation::EmptySegment => {
                write!(f, "module id must not contain empty segments ('//')")
            }
            IdViolation::InvalidTier(tier) => write!(
                f,
                "invalid tier '{}'; must be one of foundation, principle, technology, execution",
                tier
            ),
            IdViolation::Uppercase => write!(f, "module id must be lowercase"),
            IdViolation::InvalidCharacters(segment) => write!(
                f,
                "segment '{}' contains invalid characters; only a-z, 0-9 and '-' are allowed",
                segment
            ),
            IdViolation::TooFewSegments => write!(
                f,
                "module id needs a tier followed by at least two segments (tier/category/name)"
            ),
        }
    }
}

/// Check an id against the grammar, naming the first violation found.
pub fn check_module_id(id: &str) -> Result<Tier, IdViolation> {
    if id.is_empty() {
        return Err(IdViolation::Empty);
    }
    if id.starts_with('/') {
        return Err(IdViolation::LeadingSlash);
    }
    if id.ends_with('/') {
        return Err(IdViolation::TrailingSlash);
    }

    let segments: Vec<&str> = id.split('/').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(IdViolation::EmptySegment);
    }

    let tier = match segments[0].parse::<Tier>() {
        Ok(tier) => tier,
        Err(_) if segments[0].to_lowercase().parse::<Tier>().is_ok() => {
            return Err(IdViolation::Uppercase);
        }
        Err(_) => return Err(IdViolation::InvalidTier(segments[0].to_string())),
    };

    for segment in &segments[1..] {
        if segment.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(IdViolation::Uppercase);
        }
        if !segment
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(IdViolation::InvalidCharacters(segment.to_string()));
        }
    }

    if segments.len() < 3 {
        return Err(IdViolation::TooFewSegments);
    }

    debug_assert!(MODULE_ID_RE.is_match(id));
    Ok(tier)
}

/// Whether an id matches the canonical module id pattern.
pub fn is_valid_module_id(id: &str) -> bool {
    MODULE_ID_RE.is_match(id)
}
