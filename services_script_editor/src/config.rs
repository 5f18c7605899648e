//! Editor configuration
//!
//! Loaded from JSON. A config that cannot be used falls back to defaults,
//! so a bad config file never keeps the editor from starting.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Key the snapshot is stored under by default
pub const DEFAULT_STORAGE_KEY: &str = "scriptData";

/// Default autosave period
pub const DEFAULT_AUTOSAVE_PERIOD_MS: u64 = 1500;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unsupported config version: {0}")]
    UnsupportedVersion(u32),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Editor session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Version of the config format (for future migrations)
    pub version: u32,
    /// Store key holding the snapshot
    pub storage_key: String,
    /// Autosave period in milliseconds
    pub autosave_period_ms: u64,
}

impl EditorConfig {
    /// Current version of the config format
    pub const CURRENT_VERSION: u32 = 1;

    /// Parse and validate a JSON config
    pub fn from_json(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: EditorConfig = serde_json::from_slice(bytes)?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`EditorConfig::from_json`], falling back to defaults on error
    pub fn load_safe(bytes: &[u8]) -> Self {
        Self::from_json(bytes).unwrap_or_else(|err| {
            warn!(error = %err, "unusable editor config, using defaults");
            Self::default()
        })
    }

    pub fn to_json(&self) -> Result<Vec<u8>, ConfigError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.version != Self::CURRENT_VERSION {
            return Err(ConfigError::UnsupportedVersion(self.version));
        }
        if self.autosave_period_ms == 0 {
            return Err(ConfigError::Invalid(
                "autosave_period_ms must be positive".to_string(),
            ));
        }
        if self.storage_key.is_empty() {
            return Err(ConfigError::Invalid("storage_key must not be empty".to_string()));
        }
        Ok(())
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            autosave_period_ms: DEFAULT_AUTOSAVE_PERIOD_MS,
        }
    }
}
