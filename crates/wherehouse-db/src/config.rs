//! # Application Configuration
//!
//! Settings read by the `wherehouse` and `seed` binaries.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     WHEREHOUSE_DB_PATH=/srv/wherehouse/wherehouse.db                   │
//! │     WHEREHOUSE_DB_MAX_CONNECTIONS=8                                    │
//! │     WHEREHOUSE_ADMIN_USERNAME / WHEREHOUSE_ADMIN_PASSWORD              │
//! │     WHEREHOUSE_LOG=debug                                               │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/wherehouse/wherehouse.toml (Linux)                       │
//! │     ~/Library/Application Support/com.wherehouse.wherehouse/... (macOS)│
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! log_filter = "info,wherehouse_db=debug"
//!
//! [database]
//! path = "/srv/wherehouse/wherehouse.db"
//! max_connections = 5
//! min_connections = 1
//! connect_timeout_secs = 30
//!
//! [bootstrap]
//! admin_username = "admin"
//! admin_password = "password"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use wherehouse_core::{DEFAULT_ADMIN_PASSWORD, DEFAULT_ADMIN_USERNAME};

use crate::error::{DbError, DbResult};
use crate::pool::DbConfig;

const CONFIG_FILE: &str = "wherehouse.toml";
const DATABASE_FILE: &str = "wherehouse.db";

// =============================================================================
// Database Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file path. `:memory:` gives a throwaway database.
    #[serde(default = "default_database_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_database_path() -> PathBuf {
    directories::ProjectDirs::from("com", "wherehouse", "wherehouse")
        .map(|dirs| dirs.data_dir().join(DATABASE_FILE))
        .unwrap_or_else(|| PathBuf::from(DATABASE_FILE))
}

fn default_max_connections() -> u32 {
    5
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    30
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_database_path(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

// =============================================================================
// Bootstrap Settings
// =============================================================================

/// The admin account created on first start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapSettings {
    #[serde(default = "default_admin_username")]
    pub admin_username: String,

    #[serde(default = "default_admin_password")]
    pub admin_password: String,
}

fn default_admin_username() -> String {
    DEFAULT_ADMIN_USERNAME.to_string()
}

fn default_admin_password() -> String {
    DEFAULT_ADMIN_PASSWORD.to_string()
}

impl Default for BootstrapSettings {
    fn default() -> Self {
        BootstrapSettings {
            admin_username: default_admin_username(),
            admin_password: default_admin_password(),
        }
    }
}

// =============================================================================
// Origin
// =============================================================================

/// Where the loaded settings came from. `load` runs before the subscriber is
/// installed, so it records this and the binary logs it afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOrigin {
    /// The file that was read, if one existed.
    pub file: Option<PathBuf>,
    /// Environment variables that replaced a setting.
    pub overrides: Vec<&'static str>,
    /// Environment variables that were set but could not be used.
    pub ignored: Vec<&'static str>,
}

// =============================================================================
// App Config
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub bootstrap: BootstrapSettings,

    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    #[serde(skip)]
    pub origin: ConfigOrigin,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database: DatabaseSettings::default(),
            bootstrap: BootstrapSettings::default(),
            log_filter: default_log_filter(),
            origin: ConfigOrigin::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from file and environment, then validates it.
    ///
    /// A missing file is not an error; defaults are used instead.
    pub fn load(config_path: Option<PathBuf>) -> DbResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml(&contents)?;
                config.origin.file = Some(path);
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    pub fn from_toml(contents: &str) -> DbResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Checks the settings are usable.
    pub fn validate(&self) -> DbResult<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(DbError::Config("database.path must not be empty".into()));
        }
        if self.database.max_connections == 0 {
            return Err(DbError::Config(
                "database.max_connections must be at least 1".into(),
            ));
        }
        if self.database.min_connections > self.database.max_connections {
            return Err(DbError::Config(format!(
                "database.min_connections ({}) exceeds max_connections ({})",
                self.database.min_connections, self.database.max_connections
            )));
        }
        if self.bootstrap.admin_username.trim().is_empty() {
            return Err(DbError::Config(
                "bootstrap.admin_username must not be empty".into(),
            ));
        }
        if self.bootstrap.admin_password.is_empty() {
            return Err(DbError::Config(
                "bootstrap.admin_password must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// The pool configuration these settings describe.
    pub fn db_config(&self) -> DbConfig {
        if self.database.path.as_os_str() == ":memory:" {
            return DbConfig::in_memory();
        }
        DbConfig::new(self.database.path.clone())
            .max_connections(self.database.max_connections)
            .min_connections(self.database.min_connections)
            .connect_timeout(Duration::from_secs(self.database.connect_timeout_secs))
    }

    /// Installs the global `tracing` subscriber. `RUST_LOG` wins over
    /// `log_filter`. Call once, from a binary.
    pub fn init_tracing(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.log_filter));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }

    /// Reports what `load` recorded in [`ConfigOrigin`]. Call after
    /// [`init_tracing`](Self::init_tracing).
    pub fn log_origin(&self) {
        match &self.origin.file {
            Some(path) => info!(?path, "Loaded config file"),
            None => debug!("No config file found, using defaults"),
        }
        for &key in &self.origin.overrides {
            debug!(key, "Setting overridden from environment");
        }
        for &key in &self.origin.ignored {
            warn!(key, "Ignoring unusable environment value");
        }
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        const DB_PATH: &str = "WHEREHOUSE_DB_PATH";
        const DB_MAX_CONNECTIONS: &str = "WHEREHOUSE_DB_MAX_CONNECTIONS";
        const ADMIN_USERNAME: &str = "WHEREHOUSE_ADMIN_USERNAME";
        const ADMIN_PASSWORD: &str = "WHEREHOUSE_ADMIN_PASSWORD";
        const LOG: &str = "WHEREHOUSE_LOG";

        if let Some(path) = lookup(DB_PATH) {
            self.database.path = PathBuf::from(path);
            self.origin.overrides.push(DB_PATH);
        }

        if let Some(max) = lookup(DB_MAX_CONNECTIONS) {
            match max.parse::<u32>() {
                Ok(n) => {
                    self.database.max_connections = n;
                    self.origin.overrides.push(DB_MAX_CONNECTIONS);
                }
                Err(_) => self.origin.ignored.push(DB_MAX_CONNECTIONS),
            }
        }

        if let Some(username) = lookup(ADMIN_USERNAME) {
            self.bootstrap.admin_username = username;
            self.origin.overrides.push(ADMIN_USERNAME);
        }

        if let Some(password) = lookup(ADMIN_PASSWORD) {
            self.bootstrap.admin_password = password;
            self.origin.overrides.push(ADMIN_PASSWORD);
        }

        if let Some(filter) = lookup(LOG) {
            self.log_filter = filter;
            self.origin.overrides.push(LOG);
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "wherehouse", "wherehouse")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bootstrap.admin_username, "admin");
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_partial_toml() {
        let config = AppConfig::from_toml(
            r#"
            [database]
            path = "/tmp/wh.db"
            max_connections = 8
            "#,
        )
        .unwrap();

        assert_eq!(config.database.path, PathBuf::from("/tmp/wh.db"));
        assert_eq!(config.database.max_connections, 8);
        assert_eq!(config.database.min_connections, 1);
        assert_eq!(config.bootstrap.admin_password, "password");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("WHEREHOUSE_DB_PATH", ":memory:"),
            ("WHEREHOUSE_DB_MAX_CONNECTIONS", "not-a-number"),
            ("WHEREHOUSE_ADMIN_USERNAME", "root"),
            ("WHEREHOUSE_LOG", "debug"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.bootstrap.admin_username, "root");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.log_filter, "debug");
        assert!(config.db_config().is_in_memory());

        assert_eq!(
            config.origin.overrides,
            vec!["WHEREHOUSE_DB_PATH", "WHEREHOUSE_ADMIN_USERNAME", "WHEREHOUSE_LOG"]
        );
        assert_eq!(config.origin.ignored, vec!["WHEREHOUSE_DB_MAX_CONNECTIONS"]);
    }

    #[test]
    fn test_load_records_the_file_it_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wherehouse.toml");
        std::fs::write(&path, "log_filter = \"warn\"\n").unwrap();

        let config = AppConfig::load(Some(path.clone())).unwrap();
        assert_eq!(config.origin.file, Some(path));

        let missing = dir.path().join("absent.toml");
        let config = AppConfig::load(Some(missing)).unwrap();
        assert_eq!(config.origin.file, None);
    }

    #[test]
    fn test_validation_rejects_bad_pool_sizes() {
        let mut config = AppConfig::default();
        config.database.max_connections = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.database.min_connections = 6;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_blank_admin() {
        let mut config = AppConfig::default();
        config.bootstrap.admin_username = "  ".into();
        assert!(config.validate().is_err());
    }
}
