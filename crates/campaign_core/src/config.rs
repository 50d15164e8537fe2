//! Ledger configuration.
//!
//! # Load order
//! 1. Compiled defaults.
//! 2. Optional JSON file.
//! 3. `CAMPAIGN_LEDGER_*` environment variables.
//!
//! Each layer overrides the previous one field by field.

use crate::logging::default_log_level;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_DB_PATH: &str = "CAMPAIGN_LEDGER_DB";
pub const ENV_LOG_LEVEL: &str = "CAMPAIGN_LEDGER_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "CAMPAIGN_LEDGER_LOG_DIR";
pub const ENV_SEED: &str = "CAMPAIGN_LEDGER_SEED";

const DEFAULT_DB_FILE_NAME: &str = "campaign_ledger.sqlite3";

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// File logging is disabled when unset.
    pub log_dir: Option<PathBuf>,
    /// Fixed weather seed; entropy-seeded when unset.
    pub rng_seed: Option<u64>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
            rng_seed: None,
        }
    }
}

/// File layer; every field optional so partial files are valid.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ConfigFile {
    db_path: Option<PathBuf>,
    log_level: Option<String>,
    log_dir: Option<PathBuf>,
    rng_seed: Option<u64>,
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
    InvalidEnv { var: &'static str, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid config `{}`: {source}", path.display())
            }
            Self::InvalidEnv { var, reason } => write!(f, "invalid {var}: {reason}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::InvalidEnv { .. } => None,
        }
    }
}

impl LedgerConfig {
    /// Resolves defaults, then `file` (if given), then the environment.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(path) = file {
            config.merge_file(path)?;
        }
        config.merge_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    fn merge_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ConfigFile = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(db_path) = file.db_path {
            self.db_path = db_path;
        }
        if let Some(level) = file.log_level {
            self.log_level = level;
        }
        if file.log_dir.is_some() {
            self.log_dir = file.log_dir;
        }
        if file.rng_seed.is_some() {
            self.rng_seed = file.rng_seed;
        }
        Ok(())
    }

    /// Applies overrides from `lookup`; blank values are ignored.
    fn merge_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(db_path) = read(ENV_DB_PATH) {
            self.db_path = PathBuf::from(db_path.trim());
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            self.log_level = level.trim().to_string();
        }
        if let Some(dir) = read(ENV_LOG_DIR) {
            self.log_dir = Some(PathBuf::from(dir.trim()));
        }
        if let Some(seed) = read(ENV_SEED) {
            let parsed = seed.trim().parse::<u64>().map_err(|_| ConfigError::InvalidEnv {
                var: ENV_SEED,
                reason: format!("expected unsigned integer, got `{seed}`"),
            })?;
            self.rng_seed = Some(parsed);
        }
        Ok(())
    }
}
