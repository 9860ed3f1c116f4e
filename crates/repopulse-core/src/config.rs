use crate::efficiency::EfficiencyWeights;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = ".repopulse.toml";

/// Configuration loaded from `.repopulse.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub scoring: EfficiencyWeights,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    pub api_base: String,

    /// Personal access token; `--token` / `GITHUB_TOKEN` take precedence
    pub token: Option<String>,

    /// Stop paginating commits once this many have been fetched
    pub max_commits: usize,

    pub per_page: usize,

    /// Pause between commit pages, in milliseconds
    pub page_delay_ms: u64,

    /// Retries for transient failures (network errors, 5xx, rate limits)
    pub max_retries: u32,

    pub timeout_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            token: None,
            max_commits: 500,
            per_page: 100,
            page_delay_ms: 500,
            max_retries: 3,
            timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml(&content).map_err(|message| Error::Config {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Load an explicit config file, or `.repopulse.toml` in `dir` if it exists,
    /// or the defaults.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidate: PathBuf = dir.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }
}
