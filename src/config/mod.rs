use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    currency::Currency,
    errors::ConfigError,
    utils::{paths, persistence},
};

const DEFAULT_RECENT_LIMIT: usize = 3;

/// User preferences persisted between sessions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub base_currency: Currency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional directory holding the ledger file. Defaults to `~/.lumin`.
    pub data_dir: Option<PathBuf>,
    #[serde(default = "Config::default_recent_limit")]
    pub recent_transaction_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_currency: Currency::default(),
            data_dir: None,
            recent_transaction_limit: Self::default_recent_limit(),
        }
    }
}

impl Config {
    pub fn default_recent_limit() -> usize {
        DEFAULT_RECENT_LIMIT
    }

    pub fn resolve_ledger_file(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) => dir.join(paths::LEDGER_FILE),
            None => paths::ledger_file(),
        }
    }
}

/// Loads and saves [`Config`] as JSON.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self::with_path(paths::config_file())
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn with_base_dir(base: &Path) -> Self {
        Self::with_path(base.join("config.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the stored config, or the defaults when no file exists yet.
    pub fn load(&self) -> Result<Config, ConfigError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            serde_json::from_str(&data).map_err(|err| ConfigError::Serde(err.to_string()))
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(config)
            .map_err(|err| ConfigError::Serde(err.to_string()))?;
        persistence::write_atomic::<ConfigError>(&self.path, &json)?;
        tracing::debug!(path = %self.path.display(), "saved configuration");
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
