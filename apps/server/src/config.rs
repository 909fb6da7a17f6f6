//! # Server Configuration
//!
//! Loaded in three layers, later layers winning:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Built-in defaults                                                   │
//! │  2. TOML file  (--config <path>, else <config dir>/dinein/server.toml)  │
//! │  3. DINEIN_* environment variables                                      │
//! │                     │                                                   │
//! │                     ▼                                                   │
//! │                 validate()                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```toml
//! [http]
//! bind = "0.0.0.0"
//! port = 8080
//! cors_origins = ["http://localhost:5173"]   # ["*"] for any, [] for none
//!
//! [database]
//! path = "/var/lib/dinein/dinein.db"
//! max_connections = 5
//! acquire_timeout_secs = 30
//! busy_timeout_ms = 5000
//!
//! [hub]
//! subscriber_buffer = 64
//! send_timeout_ms = 5000
//! ping_interval_secs = 30
//!
//! [orders]
//! transition_policy = "permissive"   # or "forward_only"
//! strict_payment_amount = false
//! ```
//!
//! ## Environment Overrides
//! | Variable | Field |
//! |---|---|
//! | `DINEIN_BIND` | `http.bind` |
//! | `DINEIN_PORT` | `http.port` |
//! | `DINEIN_CORS_ORIGINS` | `http.cors_origins` (comma-separated) |
//! | `DINEIN_DB_PATH` | `database.path` |
//! | `DINEIN_DB_MAX_CONNECTIONS` | `database.max_connections` |
//! | `DINEIN_HUB_BUFFER` | `hub.subscriber_buffer` |
//! | `DINEIN_TRANSITION_POLICY` | `orders.transition_policy` |
//! | `DINEIN_STRICT_PAYMENT` | `orders.strict_payment_amount` |

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use dinein_core::{PaymentPolicy, TransitionPolicy};
use dinein_db::DbConfig;
use dinein_live::HubConfig;

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ConfigError {
    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Sections
// =============================================================================

/// Origin that allows every browser origin when it is the only entry.
pub const ANY_ORIGIN: &str = "*";

/// Dev server of the staff frontend.
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Browser origins allowed to call the API. Staff frontends are
    /// usually served from a different host or port than the server.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origins() -> Vec<String> {
    vec![DEFAULT_CORS_ORIGIN.to_string()]
}

impl Default for HttpSettings {
    fn default() -> Self {
        HttpSettings {
            bind: default_bind(),
            port: default_port(),
            cors_origins: default_cors_origins(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

fn default_database_path() -> PathBuf {
    directories::ProjectDirs::from("com", "dinein", "dinein")
        .map(|dirs| dirs.data_dir().join("dinein.db"))
        .unwrap_or_else(|| PathBuf::from("./dinein.db"))
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout_secs() -> u64 {
    30
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_database_path(),
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderSettings {
    #[serde(default)]
    pub transition_policy: TransitionPolicy,
    #[serde(default)]
    pub strict_payment_amount: bool,
}

impl OrderSettings {
    pub fn payment_policy(&self) -> PaymentPolicy {
        PaymentPolicy {
            strict_amount: self.strict_payment_amount,
        }
    }
}

// =============================================================================
// Server Config
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub hub: HubConfig,
    #[serde(default)]
    pub orders: OrderSettings,
}

impl ServerConfig {
    /// Loads defaults, then the TOML file, then environment overrides.
    ///
    /// A missing file is not an error; an unreadable or malformed one is.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading server config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&contents)?)
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "dinein", "dinein")
            .map(|dirs| dirs.config_dir().join("server.toml"))
    }

    /// Applies `DINEIN_*` overrides read through `lookup`.
    ///
    /// Unparseable values are logged and ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup("DINEIN_BIND") {
            debug!(bind = %bind, "Overriding bind address from environment");
            self.http.bind = bind;
        }

        if let Some(port) = lookup("DINEIN_PORT") {
            match port.parse::<u16>() {
                Ok(p) => self.http.port = p,
                Err(_) => warn!(value = %port, "Ignoring invalid DINEIN_PORT"),
            }
        }

        if let Some(origins) = lookup("DINEIN_CORS_ORIGINS") {
            self.http.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect();
            debug!(origins = ?self.http.cors_origins, "Overriding CORS origins from environment");
        }

        if let Some(path) = lookup("DINEIN_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(max) = lookup("DINEIN_DB_MAX_CONNECTIONS") {
            match max.parse::<u32>() {
                Ok(m) => self.database.max_connections = m,
                Err(_) => warn!(value = %max, "Ignoring invalid DINEIN_DB_MAX_CONNECTIONS"),
            }
        }

        if let Some(buffer) = lookup("DINEIN_HUB_BUFFER") {
            match buffer.parse::<usize>() {
                Ok(b) => self.hub.subscriber_buffer = b,
                Err(_) => warn!(value = %buffer, "Ignoring invalid DINEIN_HUB_BUFFER"),
            }
        }

        if let Some(policy) = lookup("DINEIN_TRANSITION_POLICY") {
            match policy.parse::<TransitionPolicy>() {
                Ok(p) => {
                    debug!(policy = %p, "Overriding transition policy from environment");
                    self.orders.transition_policy = p;
                }
                Err(_) => warn!(value = %policy, "Unknown transition policy in environment"),
            }
        }

        if let Some(strict) = lookup("DINEIN_STRICT_PAYMENT") {
            match strict.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.orders.strict_payment_amount = true,
                "0" | "false" | "no" => self.orders.strict_payment_amount = false,
                _ => warn!(value = %strict, "Ignoring invalid DINEIN_STRICT_PAYMENT"),
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.bind.trim().is_empty() {
            return Err(ConfigError::invalid("http.bind", "must not be empty"));
        }
        let origins = &self.http.cors_origins;
        if origins.len() > 1 && origins.iter().any(|origin| origin == ANY_ORIGIN) {
            return Err(ConfigError::invalid(
                "http.cors_origins",
                "'*' must be the only entry",
            ));
        }
        if let Some(bad) = origins
            .iter()
            .find(|origin| axum::http::HeaderValue::from_str(origin).is_err())
        {
            return Err(ConfigError::invalid(
                "http.cors_origins",
                format!("'{}' is not a valid origin", bad.escape_debug()),
            ));
        }
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::invalid("database.path", "must not be empty"));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::invalid(
                "database.max_connections",
                "must be at least 1",
            ));
        }
        if self.database.acquire_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "database.acquire_timeout_secs",
                "must be positive",
            ));
        }
        self.hub
            .validate()
            .map_err(|e| ConfigError::invalid("hub", e.to_string()))?;
        self.socket_addr()?;
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.http.bind, self.http.port)
            .parse()
            .map_err(|_| {
                ConfigError::invalid(
                    "http.bind",
                    format!("'{}' is not an IP address", self.http.bind),
                )
            })
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database.path)
            .max_connections(self.database.max_connections)
            .acquire_timeout(Duration::from_secs(self.database.acquire_timeout_secs))
            .busy_timeout(Duration::from_millis(self.database.busy_timeout_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config: ServerConfig = toml::from_str("").unwrap();
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.http.cors_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.hub, HubConfig::default());
        assert_eq!(config.orders.transition_policy, TransitionPolicy::Permissive);
        assert!(!config.orders.strict_payment_amount);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_sections() {
        let raw = r#"
            [http]
            port = 9000
            cors_origins = ["http://kitchen.local:5173", "http://billing.local"]

            [database]
            path = "/tmp/dinein-test.db"
            busy_timeout_ms = 250

            [hub]
            subscriber_buffer = 8

            [orders]
            transition_policy = "forward_only"
            strict_payment_amount = true
        "#;
        let config: ServerConfig = toml::from_str(raw).unwrap();

        assert_eq!(config.http.bind, "0.0.0.0");
        assert_eq!(config.http.port, 9000);
        assert_eq!(
            config.http.cors_origins,
            vec!["http://kitchen.local:5173", "http://billing.local"]
        );
        assert_eq!(config.database.path, PathBuf::from("/tmp/dinein-test.db"));
        assert_eq!(config.database.acquire_timeout_secs, 30);
        assert_eq!(config.hub.subscriber_buffer, 8);
        assert_eq!(config.hub.send_timeout_ms, 5_000);
        assert_eq!(config.orders.transition_policy, TransitionPolicy::ForwardOnly);
        assert!(config.orders.payment_policy().strict_amount);

        let db = config.db_config();
        assert_eq!(db.busy_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("DINEIN_PORT", "7070"),
            ("DINEIN_CORS_ORIGINS", "http://kitchen.local:5173, http://billing.local,"),
            ("DINEIN_DB_PATH", "/data/dinein.db"),
            ("DINEIN_TRANSITION_POLICY", "forward-only"),
            ("DINEIN_STRICT_PAYMENT", "true"),
            ("DINEIN_HUB_BUFFER", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut config = ServerConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.http.port, 7070);
        assert_eq!(
            config.http.cors_origins,
            vec!["http://kitchen.local:5173", "http://billing.local"]
        );
        assert_eq!(config.database.path, PathBuf::from("/data/dinein.db"));
        assert_eq!(config.orders.transition_policy, TransitionPolicy::ForwardOnly);
        assert!(config.orders.strict_payment_amount);
        // Invalid value left the default in place
        assert_eq!(config.hub.subscriber_buffer, 64);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = ServerConfig::default();
        config.database.max_connections = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue { .. })));

        let mut config = ServerConfig::default();
        config.http.bind = "not an address".to_string();
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.hub.send_timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.http.cors_origins = vec!["*".to_string(), "http://kitchen.local".to_string()];
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.http.cors_origins = vec!["http://kitchen\n.local".to_string()];
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.http.cors_origins = Vec::new();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_policy_is_a_parse_error() {
        let raw = "[orders]\ntransition_policy = \"whenever\"\n";
        assert!(toml::from_str::<ServerConfig>(raw).is_err());
    }
}
