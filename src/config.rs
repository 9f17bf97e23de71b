//! Configuration for group dispatch.
//!
//! Supports YAML file and environment variable overrides.

use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

/// Default path of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "groupcall.yaml";

/// Group dispatch configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GroupConfig {
    /// Worker pool configuration.
    pub pool: PoolConfig,
    /// How `group_by_type` shares the member sequence.
    pub member_sharing: MemberSharing,
}

/// Worker pool configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Maximum number of concurrently running member workers.
    pub max_workers: usize,
    /// Name given to worker threads.
    pub thread_name: String,
    /// How long an idle worker thread is kept alive, in milliseconds.
    pub keep_alive_ms: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_workers: 512,
            thread_name: "groupcall-worker".to_string(),
            keep_alive_ms: 10_000,
        }
    }
}

/// Whether a group obtained through `group_by_type` shares its member
/// sequence with the source group or takes a copy of it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberSharing {
    /// Both handles see the same sequence; changes through one are visible
    /// through the other.
    #[default]
    Alias,
    /// The new handle starts with a copy of the sequence.
    Copy,
}

impl FromStr for MemberSharing {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "alias" => Ok(MemberSharing::Alias),
            "copy" => Ok(MemberSharing::Copy),
            other => Err(ConfigError::Invalid(format!(
                "member_sharing must be 'alias' or 'copy', got '{}'",
                other
            ))),
        }
    }
}

impl GroupConfig {
    /// Load configuration from file and environment.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables
    /// 2. Config file
    /// 3. Defaults
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = std::env::var("GROUPCALL_CONFIG")
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let mut config = if Path::new(&config_path).exists() {
            Self::from_file(&config_path)?
        } else {
            Self::default()
        };

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;

        serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(workers) = std::env::var("GROUPCALL_MAX_WORKERS") {
            self.pool.max_workers = workers.parse().map_err(|_| {
                ConfigError::Invalid(format!("GROUPCALL_MAX_WORKERS is not a number: {}", workers))
            })?;
        }

        if let Ok(name) = std::env::var("GROUPCALL_THREAD_NAME") {
            self.pool.thread_name = name;
        }

        if let Ok(sharing) = std::env::var("GROUPCALL_MEMBER_SHARING") {
            self.member_sharing = sharing.parse()?;
        }

        Ok(())
    }

    /// Check values that deserialize fine but cannot be used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pool.max_workers == 0 {
            return Err(ConfigError::Invalid(
                "pool.max_workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{0}': {1}")]
    FileRead(String, String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
