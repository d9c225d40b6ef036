use clap::ValueEnum;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Which component of a semantic version to increase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpType {
    Major,
    Minor,
    Patch,
}

impl fmt::Display for BumpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Major => write!(f, "major"),
            Self::Minor => write!(f, "minor"),
            Self::Patch => write!(f, "patch"),
        }
    }
}

/// A `major.minor.patch` triple with optional non-numeric decorations,
/// e.g. `v2.1.0-SNAPSHOT` parses as prefix `v`, numbers `2.1.0`, and
/// suffix `-SNAPSHOT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticVersion {
    pub prefix: String,
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub suffix: String,
}

fn semantic_version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?P<prefix>\D+)?(?P<major>\d+)\.(?P<minor>\d+)\.(?P<patch>\d+)(?P<suffix>\D.+)?$")
            .unwrap()
    })
}

impl SemanticVersion {
    /// Parse a version string, returning `None` when it does not follow
    /// the `prefix? major.minor.patch suffix?` shape.
    pub fn parse(value: &str) -> Option<Self> {
        let captures = semantic_version_pattern().captures(value)?;

        Some(Self {
            prefix: captures
                .name("prefix")
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
            major: captures["major"].parse().ok()?,
            minor: captures["minor"].parse().ok()?,
            patch: captures["patch"].parse().ok()?,
            suffix: captures
                .name("suffix")
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
        })
    }

    pub fn is_valid(value: &str) -> bool {
        Self::parse(value).is_some()
    }

    /// Increase one component, resetting the lower ones. The prefix and
    /// suffix are untouched.
    pub fn bump(&mut self, bump_type: BumpType) {
        match bump_type {
            BumpType::Major => {
                self.major += 1;
                self.minor = 0;
                self.patch = 0;
            }
            BumpType::Minor => {
                self.minor += 1;
                self.patch = 0;
            }
            BumpType::Patch => {
                self.patch += 1;
            }
        }
    }

    /// Take the numeric components from another version while keeping this
    /// version's prefix and suffix, so decorations like a leading `v`
    /// survive a custom override.
    pub fn override_numbers(&mut self, custom: &SemanticVersion) {
        self.major = custom.major;
        self.minor = custom.minor;
        self.patch = custom.patch;
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}.{}.{}{}",
            self.prefix, self.major, self.minor, self.patch, self.suffix
        )
    }
}
