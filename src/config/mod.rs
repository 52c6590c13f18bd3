use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::common::SortOrder;
use crate::errors::{LedgerError, Result};
use crate::storage::json_backend::{read_json, write_json};
use crate::utils::paths::{app_data_dir, config_file_in};

/// User-tunable settings stored next to the data files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub currency_symbol: String,
    /// Patients untouched for longer than this are archived automatically.
    pub archive_after_days: i64,
    pub default_order: SortOrder,
    pub recent_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency_symbol: "₱".into(),
            archive_after_days: 90,
            default_order: SortOrder::Descending,
            recent_limit: 10,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.archive_after_days < 0 {
            return Err(LedgerError::Config(format!(
                "archive_after_days must not be negative (got {})",
                self.archive_after_days
            )));
        }
        if self.recent_limit == 0 {
            return Err(LedgerError::Config("recent_limit must be at least 1".into()));
        }
        Ok(())
    }

    pub fn format_amount(&self, amount: f64) -> String {
        format!("{}{:.2}", self.currency_symbol, amount)
    }
}

/// Loads and saves [`Config`] as `config.json` under the data root.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self::with_base_dir(&app_data_dir())
    }

    pub fn with_base_dir(base: &Path) -> Self {
        Self {
            path: config_file_in(base),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Config> {
        let config: Config = match read_json(&self.path) {
            Ok(Some(config)) => config,
            Ok(None) => {
                debug!(path = %self.path.display(), "no config file, using defaults");
                Config::default()
            }
            Err(err) => return Err(LedgerError::Config(err.to_string())),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        config.validate()?;
        write_json(&self.path, config)?;
        info!(path = %self.path.display(), "config saved");
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path());
        let config = manager.load().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.format_amount(12.5), "₱12.50");
    }

    #[test]
    fn save_then_load_keeps_changes() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path());
        let config = Config {
            archive_after_days: 30,
            default_order: SortOrder::Ascending,
            ..Config::default()
        };
        manager.save(&config).unwrap();
        assert_eq!(manager.load().unwrap(), config);
        assert!(!dir.path().join("config.json.tmp").exists());
    }

    #[test]
    fn partial_and_corrupt_files() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path());
        std::fs::write(manager.path(), r#"{"recent_limit": 3}"#).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config.recent_limit, 3);
        assert_eq!(config.archive_after_days, 90);

        std::fs::write(manager.path(), "{ not json").unwrap();
        assert!(matches!(manager.load(), Err(LedgerError::Config(_))));
    }
}
