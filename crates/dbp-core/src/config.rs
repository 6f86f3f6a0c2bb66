//! Configuration types and parsing for dbpatch.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "dbpatch.yml";

/// Main configuration from dbpatch.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Target database connection
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Table holding the append-only version log
    #[serde(default = "default_version_table")]
    pub version_table: String,

    /// Line that separates statements inside a patch body
    #[serde(default = "default_batch_separator")]
    pub batch_separator: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            version_table: default_version_table(),
            batch_separator: default_batch_separator(),
        }
    }
}

/// Database type selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DbType {
    /// DuckDB (the only supported backend)
    #[default]
    DuckDb,
}

impl std::fmt::Display for DbType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DbType::DuckDb => write!(f, "duckdb"),
        }
    }
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database type
    #[serde(rename = "type", default)]
    pub db_type: DbType,

    /// Database path (file path or `:memory:`); there is no default
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: DbType::default(),
            path: None,
        }
    }
}

fn default_version_table() -> String {
    "db_version".to_string()
}

fn default_batch_separator() -> String {
    "GO".to_string()
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> CoreResult<Self> {
        // An empty file deserializes to unit, not to an empty mapping
        let config: Config = if content.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load `dbpatch.yml` from `dir` if present, otherwise use defaults
    pub fn load_from_dir_or_default(dir: &Path) -> CoreResult<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            Self::load(&path)
        } else {
            log::debug!("No {} in {}, using defaults", CONFIG_FILE_NAME, dir.display());
            Ok(Self::default())
        }
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        let separator = self.batch_separator.trim();
        if separator.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "batch_separator cannot be empty".to_string(),
            });
        }
        if separator.contains('\n') {
            return Err(CoreError::ConfigInvalid {
                message: "batch_separator must be a single line".to_string(),
            });
        }

        if self.version_table.is_empty() || self.version_table.split('.').any(str::is_empty) {
            return Err(CoreError::ConfigInvalid {
                message: format!("invalid version_table '{}'", self.version_table),
            });
        }

        if matches!(&self.database.path, Some(path) if path.trim().is_empty()) {
            return Err(CoreError::ConfigInvalid {
                message: "database.path cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Path of the target database; `:memory:` must be asked for explicitly
    pub fn database_path(&self) -> CoreResult<&str> {
        match self.database.path.as_deref().map(str::trim) {
            Some(path) if !path.is_empty() => Ok(path),
            _ => Err(CoreError::ConfigInvalid {
                message: "no database configured; set database.path in dbpatch.yml, \
                          DBPATCH_DATABASE, or --database"
                    .to_string(),
            }),
        }
    }

    /// Batch separator with surrounding whitespace removed
    pub fn separator(&self) -> &str {
        self.batch_separator.trim()
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
