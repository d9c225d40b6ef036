/// Configuration management for the Maven version agent
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub bump: BumpSettings,
    pub output: OutputSettings,
    pub github: GitHubSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BumpSettings {
    /// Allow bumping a forest whose modules currently disagree on a
    /// version; every module is then bumped independently.
    pub accept_non_uniform_versions: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Default report format: `text`, `markdown`, or `json`.
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubSettings {
    /// Whether to publish `old_version`/`new_version` step outputs.
    pub action_outputs: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bump: BumpSettings {
                accept_non_uniform_versions: false,
            },
            output: OutputSettings {
                format: "text".to_string(),
            },
            github: GitHubSettings {
                action_outputs: true,
            },
        }
    }
}

impl Config {
    /// Load configuration from file
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    /// Load configuration from environment variables
    pub fn load_from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Ok(accept) = std::env::var("MAVEN_VERSION_AGENT_ACCEPT_NON_UNIFORM_VERSIONS") {
            config.bump.accept_non_uniform_versions = accept.parse()?;
        }

        if let Ok(format) = std::env::var("MAVEN_VERSION_AGENT_OUTPUT_FORMAT") {
            config.output.format = format;
        }

        if let Ok(outputs) = std::env::var("MAVEN_VERSION_AGENT_ACTION_OUTPUTS") {
            config.github.action_outputs = outputs.parse()?;
        }

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.output.format.as_str(), "text" | "markdown" | "json") {
            return Err(anyhow::anyhow!(
                "Unsupported output format '{}'. Expected 'text', 'markdown', or 'json'",
                self.output.format
            ));
        }

        Ok(())
    }
}
