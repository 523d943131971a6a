//! Service configuration file
//!
//! ```json
//! {
//!   "storage_uri": "file://./data",
//!   "database": "afterschool",
//!   "http": { "host": "0.0.0.0", "port": 3000, "cors_origins": [], "images_dir": "./public" },
//!   "reject_unmatched_updates": false
//! }
//! ```
//!
//! Every field is optional. A missing file means all defaults.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::{CliError, CliResult};
use crate::http_server::HttpServerConfig;
use crate::storage::ConnectionTarget;

pub const PORT_ENV: &str = "PORT";
pub const STORAGE_URI_ENV: &str = "AFTERSCHOOL_STORAGE_URI";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// `memory://`, `file://<dir>`, or a directory path (default: "file://./data")
    #[serde(default = "default_storage_uri")]
    pub storage_uri: String,

    /// Database name (default: "afterschool")
    #[serde(default = "default_database")]
    pub database: String,

    #[serde(default)]
    pub http: HttpServerConfig,

    /// Answer 404 when a space update matches no lesson (default: false)
    #[serde(default)]
    pub reject_unmatched_updates: bool,
}

fn default_storage_uri() -> String {
    "file://./data".to_string()
}

fn default_database() -> String {
    "afterschool".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_uri: default_storage_uri(),
            database: default_database(),
            http: HttpServerConfig::default(),
            reject_unmatched_updates: false,
        }
    }
}

impl Config {
    /// Load, apply environment overrides, and validate.
    pub fn load(path: &Path) -> CliResult<Self> {
        let mut config = Self::read(path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn read(path: &Path) -> CliResult<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(CliError::config_error(format!(
                    "Failed to read config {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))
    }

    /// Apply `PORT` and `AFTERSCHOOL_STORAGE_URI` from `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> CliResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup(PORT_ENV) {
            self.http.port = port.trim().parse().map_err(|_| {
                CliError::config_error(format!("Invalid {} value: '{}'", PORT_ENV, port))
            })?;
        }
        if let Some(uri) = lookup(STORAGE_URI_ENV) {
            self.storage_uri = uri;
        }
        Ok(())
    }

    pub fn validate(&self) -> CliResult<()> {
        if self.database.is_empty() {
            return Err(CliError::config_error("database must not be empty"));
        }

        if self.http.port == 0 {
            return Err(CliError::config_error("http.port must be > 0"));
        }

        ConnectionTarget::parse(&self.storage_uri)
            .map_err(|e| CliError::config_error(format!("Invalid storage_uri: {}", e.message())))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::errors::CliErrorCode;
    use serde_json::json;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, value: serde_json::Value) -> PathBuf {
        let path = dir.path().join("afterschool.json");
        fs::write(&path, value.to_string()).unwrap();
        path
    }

    #[test]
    fn test_missing_file_means_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::read(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.http.port, 3000);
        assert_eq!(config.database, "afterschool");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            json!({"storage_uri": "memory://", "http": {"port": 8081}}),
        );

        let config = Config::read(&path).unwrap();
        assert_eq!(config.storage_uri, "memory://");
        assert_eq!(config.http.port, 8081);
        assert_eq!(config.http.host, "0.0.0.0");
        assert!(!config.reject_unmatched_updates);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("afterschool.json");
        fs::write(&path, "{ not json").unwrap();

        let err = Config::read(&path).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env(|key| match key {
                "PORT" => Some("4100".to_string()),
                "AFTERSCHOOL_STORAGE_URI" => Some("memory://".to_string()),
                _ => None,
            })
            .unwrap();

        assert_eq!(config.http.port, 4100);
        assert_eq!(config.storage_uri, "memory://");
    }

    #[test]
    fn test_bad_port_env_rejected() {
        let mut config = Config::default();
        let err = config
            .apply_env(|key| (key == "PORT").then(|| "eighty".to_string()))
            .unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
    }

    #[test]
    fn test_validate() {
        assert!(Config::default().validate().is_ok());

        let empty_db = Config {
            database: String::new(),
            ..Config::default()
        };
        assert!(empty_db.validate().is_err());

        let mut zero_port = Config::default();
        zero_port.http.port = 0;
        assert!(zero_port.validate().is_err());

        let bad_target = Config {
            storage_uri: "mongodb://localhost".to_string(),
            ..Config::default()
        };
        assert!(bad_target.validate().is_err());
    }
}
