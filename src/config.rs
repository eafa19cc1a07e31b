//! Configuration loading
//!
//! A YAML file with two sections, both optional:
//!
//! ```yaml
//! database: /var/lib/autoroute/routes.db
//! adapter:
//!   route_basepath: /cms/routes
//!   route_class: auto_route
//! ```

use crate::tree::DEFAULT_ROUTE_CLASS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Base path used when none is configured
pub const DEFAULT_ROUTE_BASEPATH: &str = "/routes";

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Settings consumed by the route adapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Path under which all routes live; must already exist in the store
    pub route_basepath: String,
    /// Route class recorded on every route the adapter creates
    pub route_class: String,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            route_basepath: DEFAULT_ROUTE_BASEPATH.to_string(),
            route_class: DEFAULT_ROUTE_CLASS.to_string(),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database file; defaults to the user data directory
    pub database: Option<PathBuf>,
    pub adapter: AdapterConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml_str(text: &str) -> ConfigResult<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// The configured database path, or the default one
    pub fn database_path(&self) -> PathBuf {
        self.database.clone().unwrap_or_else(default_db_path)
    }
}

/// Get the default database path (~/.local/share/autoroute/autoroute.db)
pub fn default_db_path() -> PathBuf {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"));
    data_dir.join("autoroute").join("autoroute.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_empty_document() {
        let config = Config::from_yaml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.adapter.route_basepath, "/routes");
        assert_eq!(config.adapter.route_class, "auto_route");
    }

    #[test]
    fn partial_adapter_section_keeps_other_defaults() {
        let config = Config::from_yaml_str("adapter:\n  route_basepath: /cms/routes\n").unwrap();
        assert_eq!(config.adapter.route_basepath, "/cms/routes");
        assert_eq!(config.adapter.route_class, DEFAULT_ROUTE_CLASS);
        assert!(config.database.is_none());
    }

    #[test]
    fn database_path_prefers_configured_value() {
        let config = Config::from_yaml_str("database: /tmp/routes.db\n").unwrap();
        assert_eq!(config.database_path(), PathBuf::from("/tmp/routes.db"));

        let config = Config::default();
        assert!(config.database_path().ends_with("autoroute/autoroute.db"));
    }

    #[test]
    fn invalid_yaml_is_reported() {
        let result = Config::from_yaml_str("adapter: [not, a, map]");
        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn load_reads_file_and_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("autoroute.yaml");
        std::fs::write(&file, "adapter:\n  route_class: legacy_route\n").unwrap();

        let config = Config::load(&file).unwrap();
        assert_eq!(config.adapter.route_class, "legacy_route");

        let missing = Config::load(dir.path().join("missing.yaml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}
