//! Settings file model and persistence

use crate::{Result, SixDegreesError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable overriding [`SixDegreesConfig::mode`]
pub const MODE_ENV: &str = "SIXDEGREES_ENV";

/// Whether destructive maintenance operations are allowed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatingMode {
    #[default]
    Development,
    Production,
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatingMode::Development => write!(f, "development"),
            OperatingMode::Production => write!(f, "production"),
        }
    }
}

impl FromStr for OperatingMode {
    type Err = SixDegreesError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(OperatingMode::Development),
            "production" | "prod" => Ok(OperatingMode::Production),
            other => Err(SixDegreesError::Config(format!(
                "Unknown operating mode: {}",
                other
            ))),
        }
    }
}

/// Top-level configuration (~/.config/sixdegrees/config.yaml)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SixDegreesConfig {
    #[serde(default)]
    pub mode: OperatingMode,

    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub search: SearchSettings,

    #[serde(default)]
    pub neynar: NeynarSettings,
}

/// Connection store location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Defaults to ~/.config/sixdegrees/graph.db
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    #[serde(default = "default_true")]
    pub wal_mode: bool,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: None,
            wal_mode: true,
        }
    }
}

impl DatabaseSettings {
    /// Configured path or the default under ~/.config/sixdegrees
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| config_dir().join("graph.db"))
    }
}

/// Search bounds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    #[serde(default = "default_max_queue_size")]
    pub max_queue_size: usize,

    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_queue_size: default_max_queue_size(),
            batch_size: default_batch_size(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Neynar API access
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeynarSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Pages fetched per follower/following listing
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for NeynarSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_depth() -> usize {
    6
}

fn default_max_queue_size() -> usize {
    10_000
}

fn default_batch_size() -> usize {
    100
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_base_url() -> String {
    neynar::DEFAULT_BASE_URL.to_string()
}

fn default_api_key_env() -> String {
    "NEYNAR_API_KEY".to_string()
}

fn default_page_size() -> u32 {
    neynar::MAX_PAGE_SIZE
}

fn default_max_pages() -> usize {
    1
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_max_retries() -> u32 {
    2
}

/// ~/.config/sixdegrees
fn config_dir() -> PathBuf {
    // Always use ~/.config for consistency across platforms (macOS, Linux)
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(".config");
    path.push("sixdegrees");
    path
}

impl SixDegreesConfig {
    /// Load from the default path, falling back to defaults if absent
    pub fn load_default() -> Result<Self> {
        let path = Self::default_path();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            let mut config = Self::default();
            config.apply_env_overrides()?;
            return Ok(config);
        }
        Self::load(&path)
    }

    /// Load configuration from a specific path
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(SixDegreesError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        tracing::info!(path = %path.display(), "Loading sixdegrees configuration");

        let content = fs::read_to_string(path)?;
        let mut config: Self = serde_yaml::from_str(&content)?;
        config.apply_env_overrides()?;
        config.validate()?;

        tracing::debug!(
            mode = %config.mode,
            max_depth = config.search.max_depth,
            max_queue_size = config.search.max_queue_size,
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        tracing::info!(path = %path.display(), "Saving sixdegrees configuration");

        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)?;

        Ok(())
    }

    /// Get the default config path (~/.config/sixdegrees/config.yaml)
    pub fn default_path() -> PathBuf {
        config_dir().join("config.yaml")
    }

    /// Apply `SIXDEGREES_ENV` if set
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(mode) = std::env::var(MODE_ENV) {
            if !mode.trim().is_empty() {
                self.mode = mode.parse()?;
            }
        }
        Ok(())
    }

    /// Reject settings that would make searches impossible
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        if self.search.max_depth == 0 {
            problems.push("search.max_depth must be at least 1");
        }
        if self.search.max_queue_size == 0 {
            problems.push("search.max_queue_size must be at least 1");
        }
        if self.search.batch_size == 0 {
            problems.push("search.batch_size must be at least 1");
        }
        if self.search.timeout_secs == 0 {
            problems.push("search.timeout_secs must be at least 1");
        }
        if self.neynar.base_url.trim().is_empty() {
            problems.push("neynar.base_url must not be empty");
        }
        if self.neynar.page_size == 0 || self.neynar.page_size > neynar::MAX_PAGE_SIZE {
            problems.push("neynar.page_size must be between 1 and 100");
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(SixDegreesError::Config(problems.join("; ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = SixDegreesConfig::default();
        assert_eq!(config.mode, OperatingMode::Development);
        assert_eq!(config.search.max_depth, 6);
        assert_eq!(config.search.max_queue_size, 10_000);
        assert_eq!(config.search.batch_size, 100);
        assert_eq!(config.search.timeout_secs, 60);
        assert_eq!(config.neynar.api_key_env, "NEYNAR_API_KEY");
        assert!(config.database.wal_mode);
        assert!(config
            .database
            .resolved_path()
            .ends_with(".config/sixdegrees/graph.db"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = r#"
mode: production
search:
  max_depth: 3
"#;
        let config: SixDegreesConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.mode, OperatingMode::Production);
        assert_eq!(config.search.max_depth, 3);
        assert_eq!(config.search.max_queue_size, 10_000);
        assert_eq!(config.neynar.page_size, 100);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sixdegrees").join("config.yaml");

        let mut config = SixDegreesConfig::default();
        config.search.timeout_secs = 5;
        config.database.path = Some(temp_dir.path().join("graph.db"));
        config.save(&path).unwrap();

        let loaded = SixDegreesConfig::load(&path).unwrap();
        assert_eq!(loaded.search.timeout_secs, 5);
        assert_eq!(loaded.database.path, config.database.path);
    }

    #[test]
    fn test_load_missing_file() {
        let result = SixDegreesConfig::load("/nonexistent/config.yaml");
        assert!(matches!(result, Err(SixDegreesError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let mut config = SixDegreesConfig::default();
        config.search.max_depth = 0;
        config.search.batch_size = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("max_depth"));
        assert!(err.contains("batch_size"));
    }

    #[test]
    fn test_operating_mode_parse() {
        assert_eq!(
            "production".parse::<OperatingMode>().unwrap(),
            OperatingMode::Production
        );
        assert_eq!(
            "DEV".parse::<OperatingMode>().unwrap(),
            OperatingMode::Development
        );
        assert!("staging".parse::<OperatingMode>().is_err());
    }
}
