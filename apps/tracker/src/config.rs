//! Application configuration.
//!
//! Loaded in layers, later layers winning:
//!
//! ```text
//! AppConfig::default()  →  tracker.toml (or $TRACKER_CONFIG)  →  TRACKER_* env
//! ```

use config::{Config, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the config file.
pub const CONFIG_PATH_VAR: &str = "TRACKER_CONFIG";

/// Config file used when `TRACKER_CONFIG` is unset. Optional.
pub const DEFAULT_CONFIG_FILE: &str = "tracker.toml";

const ENV_PREFIX: &str = "TRACKER";

/// Tracker configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub max_connections: u32,

    /// Pool acquire and SQLite busy timeout
    pub connect_timeout_secs: u64,

    /// Printed at the top of every receipt
    pub school_name: String,

    /// Second header line on receipts
    pub school_address: String,

    /// HMAC key for session tokens. Generated per process when unset.
    #[serde(skip_serializing)]
    pub session_secret: Option<String>,

    /// Session token lifetime in seconds (default: 8 hours)
    pub session_lifetime_secs: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_path: default_database_path(),
            max_connections: 5,
            connect_timeout_secs: 30,
            school_name: "School".to_string(),
            school_address: String::new(),
            session_secret: None,
            session_lifetime_secs: 8 * 60 * 60,
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_path", &self.database_path)
            .field("max_connections", &self.max_connections)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("school_name", &self.school_name)
            .field("school_address", &self.school_address)
            .field("session_secret", &self.session_secret.as_ref().map(|_| "<redacted>"))
            .field("session_lifetime_secs", &self.session_lifetime_secs)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the config file and process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(Some(Path::new(&path)), None)
    }

    /// Load configuration from an optional TOML file and an environment.
    ///
    /// `env` replaces the process environment when given.
    pub fn load_from(
        file: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let defaults = AppConfig::default();

        let mut builder = Config::builder()
            .set_default(
                "database_path",
                defaults.database_path.to_string_lossy().to_string(),
            )?
            .set_default("max_connections", i64::from(defaults.max_connections))?
            .set_default("connect_timeout_secs", defaults.connect_timeout_secs as i64)?
            .set_default("school_name", defaults.school_name)?
            .set_default("school_address", defaults.school_address)?
            .set_default("session_lifetime_secs", defaults.session_lifetime_secs)?;

        if let Some(file) = file {
            builder = builder.add_source(
                File::new(&file.to_string_lossy(), FileFormat::Toml).required(false),
            );
        }

        let config: AppConfig = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(env),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue("max_connections".to_string()));
        }
        if self.connect_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue("connect_timeout_secs".to_string()));
        }
        if self.session_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("session_lifetime_secs".to_string()));
        }
        if self.school_name.trim().is_empty() {
            return Err(ConfigError::MissingRequired("school_name".to_string()));
        }
        if matches!(&self.session_secret, Some(secret) if secret.trim().is_empty()) {
            return Err(ConfigError::InvalidValue("session_secret".to_string()));
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Platform data directory, falling back to the working directory.
///
/// - **Linux**: `~/.local/share/tracker/tracker.db`
/// - **macOS**: `~/Library/Application Support/org.school.tracker/tracker.db`
/// - **Windows**: `%APPDATA%\school\tracker\data\tracker.db`
pub fn default_database_path() -> PathBuf {
    match ProjectDirs::from("org", "school", "tracker") {
        Some(dirs) => dirs.data_dir().join("tracker.db"),
        None => PathBuf::from("tracker.db"),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::load_from(None, env(&[])).unwrap();

        assert_eq!(config.max_connections, 5);
        assert_eq!(config.session_lifetime_secs, 28_800);
        assert!(config.session_secret.is_none());
        assert!(config.database_path.ends_with("tracker.db"));
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "school_name = \"Hillside Academy\"\nmax_connections = 3\nsession_secret = \"from-file\""
        )
        .unwrap();

        let config = AppConfig::load_from(
            Some(file.path()),
            env(&[
                ("TRACKER_MAX_CONNECTIONS", "8"),
                ("TRACKER_DATABASE_PATH", "/tmp/school.db"),
            ]),
        )
        .unwrap();

        assert_eq!(config.school_name, "Hillside Academy");
        assert_eq!(config.max_connections, 8);
        assert_eq!(config.database_path, PathBuf::from("/tmp/school.db"));
        assert_eq!(config.session_secret.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_missing_file_is_ignored() {
        let config = AppConfig::load_from(Some(Path::new("/nonexistent/tracker.toml")), env(&[]));
        assert!(config.is_ok());
    }

    #[test]
    fn test_invalid_values() {
        let err = AppConfig::load_from(None, env(&[("TRACKER_MAX_CONNECTIONS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(field) if field == "max_connections"));

        let err = AppConfig::load_from(None, env(&[("TRACKER_MAX_CONNECTIONS", "many")])).unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));

        let err = AppConfig::load_from(None, env(&[("TRACKER_SESSION_LIFETIME_SECS", "-5")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = AppConfig {
            session_secret: Some("hunter2-hunter2".to_string()),
            ..AppConfig::default()
        };
        let printed = format!("{:?}", config);
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("<redacted>"));
    }
}
