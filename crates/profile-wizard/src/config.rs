use std::path::{Path, PathBuf};
use std::time::Duration;

use profile_spec::{MessageMap, ProfileSchema};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_SUBMIT_TIMEOUT_MS: u64 = 30_000;

/// Runtime settings of the wizard, usually read from a TOML file.
///
/// ```toml
/// submit_timeout_ms = 30000
/// locale = "en"
///
/// [messages]
/// "en:first_name" = "First name is required"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WizardConfig {
    pub submit_timeout_ms: u64,
    pub locale: Option<String>,
    pub messages: MessageMap,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            submit_timeout_ms: DEFAULT_SUBMIT_TIMEOUT_MS,
            locale: None,
            messages: MessageMap::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid wizard config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("submit_timeout_ms must be greater than zero")]
    ZeroTimeout,
}

impl WizardConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        if config.submit_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn submit_timeout(&self) -> Duration {
        Duration::from_millis(self.submit_timeout_ms)
    }

    /// Applies the message overrides to `schema`.
    pub fn apply(&self, schema: &ProfileSchema) -> ProfileSchema {
        if self.messages.is_empty() {
            return schema.clone();
        }
        schema.with_messages(&self.messages, self.locale.as_deref())
    }
}
