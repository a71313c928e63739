//! Service Configuration
//!
//! Layered: built-in defaults, then an optional TOML file, then `KANBAN_*`
//! environment overrides. CLI flags are applied last by the binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    /// Create the demo board when the database is empty
    pub seed_demo: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file; `:memory:` for a throwaway store
    pub path: PathBuf,
    /// How long a transaction waits on another connection's lock before it
    /// is reported as a conflict. 0 fails fast.
    pub busy_timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Log directory; stderr when unset
    pub dir: Option<PathBuf>,
    pub max_bytes: u64,
    pub max_files: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
            seed_demo: false,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("kanban.db"),
            busy_timeout_ms: 250,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: None,
            max_bytes: 5 * 1024 * 1024,
            max_files: 3,
        }
    }
}

impl DatabaseConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

impl LoggingConfig {
    pub fn to_logger_config(&self) -> rolling_logger::LoggerConfig {
        rolling_logger::LoggerConfig {
            level: self.level.clone(),
            max_bytes: self.max_bytes,
            max_files: self.max_files,
        }
    }
}

impl Config {
    /// Defaults, then `path` if given, then the process environment.
    /// Also returns the warnings for ignored overrides; the logger is not
    /// installed yet when this runs.
    pub fn load(path: Option<&Path>) -> Result<(Config, Vec<String>), ConfigError> {
        let mut config = match path {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        let warnings = config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok((config, warnings))
    }

    pub fn from_file(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `KANBAN_*` overrides read through `lookup`. Invalid values are
    /// skipped and reported in the returned warnings.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Vec<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };
        let mut warnings = Vec::new();

        if let Some(path) = value("KANBAN_DB_PATH") {
            self.database.path = PathBuf::from(path);
        }
        if let Some(raw) = value("KANBAN_BUSY_TIMEOUT_MS") {
            match raw.parse::<u64>() {
                Ok(ms) => self.database.busy_timeout_ms = ms,
                Err(err) => warnings.push(format!("invalid KANBAN_BUSY_TIMEOUT_MS {raw:?}, ignoring: {err}")),
            }
        }
        if let Some(level) = value("KANBAN_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(dir) = value("KANBAN_LOG_DIR") {
            self.logging.dir = Some(PathBuf::from(dir));
        }
        warnings
    }
}
