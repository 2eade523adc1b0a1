//! Server configuration
//!
//! Layered, later layers win:
//! 1. built-in defaults
//! 2. optional TOML file
//! 3. `SHEETKEEP_*` environment variables
//! 4. legacy `LLM_DB_PORT` (only when `SHEETKEEP_PORT` is unset)
//! 5. command-line overrides

use serde::Deserialize;
use sheetkeep_core::errors::{ExError, ExErrorKind};
use sheetkeep_core::logging_facility::Profile;
use sheetkeep_core::model::{DEFAULT_MAX_SNAPSHOT_BYTES, DEFAULT_WORKBOOK_KEY};
use sheetkeep_engine::commands::snapshot::SnapshotPolicy;
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "SHEETKEEP";
pub const LEGACY_PORT_VAR: &str = "LLM_DB_PORT";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5175;
pub const DEFAULT_DATABASE_PATH: &str = "data/sheetkeep.db";
pub const DEFAULT_MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub max_snapshot_bytes: usize,
    pub default_workbook_key: String,
    pub max_body_bytes: usize,
    pub log_profile: Profile,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            max_snapshot_bytes: DEFAULT_MAX_SNAPSHOT_BYTES,
            default_workbook_key: DEFAULT_WORKBOOK_KEY.to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            log_profile: Profile::Development,
        }
    }
}

/// Values given on the command line; `None` leaves the loaded value
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database_path: Option<PathBuf>,
    pub max_snapshot_bytes: Option<usize>,
    pub default_workbook_key: Option<String>,
    pub log_profile: Option<Profile>,
}

impl ServerConfig {
    /// Load defaults, then `file` (if given), then the environment
    ///
    /// # Errors
    ///
    /// `Config` if the file is missing or unreadable, or a value has the
    /// wrong type.
    pub fn load(file: Option<&Path>) -> Result<Self, ExError> {
        let defaults = Self::default();
        let mut builder = config::Config::builder()
            .set_default("host", defaults.host)
            .and_then(|b| b.set_default("port", i64::from(defaults.port)))
            .and_then(|b| {
                b.set_default(
                    "database_path",
                    defaults.database_path.to_string_lossy().into_owned(),
                )
            })
            .and_then(|b| b.set_default("max_snapshot_bytes", defaults.max_snapshot_bytes as i64))
            .and_then(|b| b.set_default("default_workbook_key", defaults.default_workbook_key))
            .and_then(|b| b.set_default("max_body_bytes", defaults.max_body_bytes as i64))
            .and_then(|b| b.set_default("log_profile", "development"))
            .map_err(config_error)?;

        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        if std::env::var_os(format!("{}_PORT", ENV_PREFIX)).is_none() {
            if let Ok(port) = std::env::var(LEGACY_PORT_VAR) {
                builder = builder
                    .set_override("port", port)
                    .map_err(config_error)?;
            }
        }

        let config: Self = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(config_error)?;
        config.validate()
    }

    pub fn apply_overrides(mut self, overrides: ConfigOverrides) -> Result<Self, ExError> {
        if let Some(host) = overrides.host {
            self.host = host;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(path) = overrides.database_path {
            self.database_path = path;
        }
        if let Some(bytes) = overrides.max_snapshot_bytes {
            self.max_snapshot_bytes = bytes;
        }
        if let Some(key) = overrides.default_workbook_key {
            self.default_workbook_key = key;
        }
        if let Some(profile) = overrides.log_profile {
            self.log_profile = profile;
        }
        self.validate()
    }

    fn validate(self) -> Result<Self, ExError> {
        if self.default_workbook_key.is_empty() {
            return Err(invalid_config("default_workbook_key must not be empty"));
        }
        if self.max_snapshot_bytes == 0 {
            return Err(invalid_config("max_snapshot_bytes must be positive"));
        }
        if self.max_body_bytes < self.max_snapshot_bytes {
            return Err(invalid_config(
                "max_body_bytes must be at least max_snapshot_bytes",
            ));
        }
        Ok(self)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn snapshot_policy(&self) -> SnapshotPolicy {
        SnapshotPolicy {
            max_snapshot_bytes: self.max_snapshot_bytes,
            default_key: self.default_workbook_key.clone(),
        }
    }
}

fn config_error(err: config::ConfigError) -> ExError {
    ExError::new(ExErrorKind::Config)
        .with_op("load_config")
        .with_message(err.to_string())
}

fn invalid_config(message: &str) -> ExError {
    ExError::new(ExErrorKind::Config)
        .with_op("validate_config")
        .with_message(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_layer_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "port = 6001\ndefault_workbook_key = \"main\"\nmax_snapshot_bytes = 4096\nlog_profile = \"production\""
        )
        .unwrap();

        let config = ServerConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.port, 6001);
        assert_eq!(config.default_workbook_key, "main");
        assert_eq!(config.max_snapshot_bytes, 4096);
        assert_eq!(config.log_profile, Profile::Production);
        assert_eq!(config.host, DEFAULT_HOST);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = ServerConfig::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Config);
    }

    #[test]
    fn test_overrides_win_and_are_validated() {
        let config = ServerConfig::default()
            .apply_overrides(ConfigOverrides {
                port: Some(7000),
                default_workbook_key: Some("book".into()),
                ..ConfigOverrides::default()
            })
            .unwrap();
        assert_eq!(config.bind_address(), "127.0.0.1:7000");
        assert_eq!(config.snapshot_policy().default_key, "book");

        let err = ServerConfig::default()
            .apply_overrides(ConfigOverrides {
                default_workbook_key: Some(String::new()),
                ..ConfigOverrides::default()
            })
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Config);
    }
}
