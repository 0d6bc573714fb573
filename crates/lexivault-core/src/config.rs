//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/lexivault/config.toml)
//! 3. Environment variables (LEXIVAULT_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable prefix
const ENV_PREFIX: &str = "LEXIVAULT";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the embedded store
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Fully-formed primary store connection string (wins over the others)
    #[serde(default)]
    pub mongo_string: Option<String>,

    /// Base connection URI, possibly containing a `<db_password>` placeholder
    #[serde(default)]
    pub mongo_uri: Option<String>,

    /// Password supplied separately from the URI
    #[serde(default)]
    pub mongo_password: Option<String>,

    /// Primary store database name
    #[serde(default = "default_database")]
    pub mongo_database: String,

    /// Bound on the primary store liveness probe, in seconds
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,

    /// HTTP listen port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            mongo_string: None,
            mongo_uri: None,
            mongo_password: None,
            mongo_database: default_database(),
            probe_timeout_secs: default_probe_timeout_secs(),
            port: default_port(),
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (LEXIVAULT_DATA_DIR, LEXIVAULT_MONGO_STRING, ...)
    /// 2. Config file (~/.config/lexivault/config.toml or LEXIVAULT_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var(format!("{}_MONGO_STRING", ENV_PREFIX)) {
            self.mongo_string = if val.is_empty() { None } else { Some(val) };
        }

        if let Ok(val) = std::env::var(format!("{}_MONGO_URI", ENV_PREFIX)) {
            self.mongo_uri = if val.is_empty() { None } else { Some(val) };
        }

        if let Ok(val) = std::env::var(format!("{}_MONGO_PASSWORD", ENV_PREFIX)) {
            self.mongo_password = if val.is_empty() { None } else { Some(val) };
        }

        if let Ok(val) = std::env::var(format!("{}_MONGO_DATABASE", ENV_PREFIX)) {
            if !val.is_empty() {
                self.mongo_database = val;
            }
        }

        if let Ok(val) = std::env::var(format!("{}_PORT", ENV_PREFIX)) {
            if let Ok(port) = val.parse() {
                self.port = port;
            }
        }
    }

    /// Ensure the data directory exists
    pub fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with the LEXIVAULT_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lexivault")
            .join("config.toml")
    }

    /// Get the path to the embedded store database
    pub fn sqlite_path(&self) -> PathBuf {
        self.data_dir.join("vocabulary.db")
    }

    /// True when at least one primary store connection setting is present
    ///
    /// With none of them set the service runs embedded-only and never
    /// probes the network.
    pub fn has_primary_config(&self) -> bool {
        self.mongo_string.is_some() || self.mongo_uri.is_some()
    }

    /// The liveness probe bound as a `Duration`
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs.max(1))
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lexivault")
}

fn default_database() -> String {
    "vocabulary".to_string()
}

fn default_probe_timeout_secs() -> u64 {
    5
}

fn default_port() -> u16 {
    5000
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap();
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            // Clear all the vars
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "LEXIVAULT_DATA_DIR",
        "LEXIVAULT_MONGO_STRING",
        "LEXIVAULT_MONGO_URI",
        "LEXIVAULT_MONGO_PASSWORD",
        "LEXIVAULT_MONGO_DATABASE",
        "LEXIVAULT_PORT",
    ];

    #[test]
    fn test_default_config() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config::default();
        assert!(config.mongo_string.is_none());
        assert!(config.mongo_uri.is_none());
        assert!(!config.has_primary_config());
        assert_eq!(config.mongo_database, "vocabulary");
        assert_eq!(config.port, 5000);
        assert!(config.data_dir.ends_with("lexivault"));
    }

    #[test]
    fn test_sqlite_path() {
        let config = Config::default();
        assert!(config.sqlite_path().ends_with("vocabulary.db"));
    }

    #[test]
    fn test_env_override_data_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("LEXIVAULT_DATA_DIR", "/tmp/lexivault-test");
        config.apply_env_overrides();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/lexivault-test"));
    }

    #[test]
    fn test_env_override_connection_settings() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("LEXIVAULT_MONGO_STRING", "mongodb://u:p@db.example.com/");
        env::set_var("LEXIVAULT_MONGO_PASSWORD", "hunter2");
        config.apply_env_overrides();

        assert_eq!(
            config.mongo_string.as_deref(),
            Some("mongodb://u:p@db.example.com/")
        );
        assert_eq!(config.mongo_password.as_deref(), Some("hunter2"));
        assert!(config.has_primary_config());

        // Empty string clears it again
        env::set_var("LEXIVAULT_MONGO_STRING", "");
        config.apply_env_overrides();
        assert!(config.mongo_string.is_none());
    }

    #[test]
    fn test_env_override_port_ignores_garbage() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("LEXIVAULT_PORT", "not-a-port");
        config.apply_env_overrides();
        assert_eq!(config.port, 5000);

        env::set_var("LEXIVAULT_PORT", "8080");
        config.apply_env_overrides();
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            data_dir = "/custom/data"
            mongo_uri = "mongodb://user:<db_password>@cluster.example.com/"
            mongo_password = "secret"
            probe_timeout_secs = 2
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
        assert_eq!(
            config.mongo_uri.as_deref(),
            Some("mongodb://user:<db_password>@cluster.example.com/")
        );
        assert_eq!(config.probe_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let path = PathBuf::from("/nonexistent/config.toml");
        let config = Config::load_from_path(&path).unwrap();
        // Should return defaults when file doesn't exist
        assert!(config.mongo_uri.is_none());
        assert_eq!(config.mongo_database, "vocabulary");
    }

    #[test]
    fn test_probe_timeout_floor() {
        let mut config = Config::default();
        config.probe_timeout_secs = 0;
        // A zero bound would turn every probe into an instant failure
        assert_eq!(config.probe_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_serialization_round_trip() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config {
            data_dir: PathBuf::from("/data/lexivault"),
            mongo_string: Some("mongodb://u:p@db/".to_string()),
            ..Config::default()
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.data_dir, config.data_dir);
        assert_eq!(parsed.mongo_string, config.mongo_string);
        assert_eq!(parsed.port, config.port);
    }
}
