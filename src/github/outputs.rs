use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Writer for GitHub Actions step outputs.
///
/// Outputs are appended as `key=value` lines to the file GitHub names
/// through the `GITHUB_OUTPUT` environment variable. The environment is
/// only consulted in [`from_env`](Self::from_env), so everything else can
/// stay ignorant of process-wide state. Writing without a configured file
/// logs a warning and succeeds, matching how the tool behaves outside CI.
pub struct ActionsOutputs {
    path: Option<PathBuf>,
}

impl ActionsOutputs {
    pub const ENV_VAR: &'static str = "GITHUB_OUTPUT";

    pub fn from_env() -> Self {
        let path = std::env::var_os(Self::ENV_VAR)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        Self { path }
    }

    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn is_available(&self) -> bool {
        self.path.is_some()
    }

    /// Append a single `key=value` line to the outputs file.
    pub fn write(&self, key: &str, value: &str) -> Result<()> {
        let Some(path) = &self.path else {
            warn!(
                "Unable to write GitHub Actions output '{}': ${} is not defined",
                key,
                Self::ENV_VAR
            );
            return Ok(());
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open GitHub Actions output file {:?}", path))?;
        writeln!(file, "{}={}", key, value)
            .with_context(|| format!("Failed to write GitHub Actions output '{}'", key))?;

        debug!("Wrote GitHub Actions output {}={}", key, value);
        Ok(())
    }
}
