use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reported in place of a version when the modules do not agree on one.
pub const UNDEFINED_VERSION: &str = "undefined";

/// Summary of one bump run across the whole module forest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BumpReport {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    /// The single project-wide version before the bump, or
    /// [`UNDEFINED_VERSION`] when the modules disagreed.
    pub old_version: String,
    pub new_version: String,
    pub modules: Vec<ModuleVersionChange>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleVersionChange {
    /// Module key in `group:artifact` form.
    pub module: String,
    pub old_version: String,
    pub new_version: String,
}

/// Snapshot of the currently resolved versions, without any mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionsReport {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub version: String,
    pub modules: Vec<ModuleVersionEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleVersionEntry {
    pub module: String,
    pub version: String,
}

impl BumpReport {
    pub fn is_uniform(&self) -> bool {
        self.old_version != UNDEFINED_VERSION && self.new_version != UNDEFINED_VERSION
    }
}

impl VersionsReport {
    pub fn is_uniform(&self) -> bool {
        self.version != UNDEFINED_VERSION
    }
}

/// The single value shared by every entry, if there is exactly one.
pub fn uniform_version<'a, I>(versions: I) -> Option<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut unique: Option<&String> = None;
    for version in versions {
        match unique {
            None => unique = Some(version),
            Some(existing) if existing == version => {}
            Some(_) => return None,
        }
    }

    unique.cloned()
}
