//! Bill tracker configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//! - `BILLS_DATABASE_URL` - `SQLite` connection string (falls back to `DATABASE_URL`,
//!   then `sqlite://homebase.db?mode=rwc`)
//! - `BILLS_HOST` - Bind address (default: 127.0.0.1)
//! - `BILLS_PORT` - Listen port (default: 3000)
//! - `BILLS_BASE_URL` - Public URL (default: http://127.0.0.1:3000). An
//!   `https://` URL marks the session cookie `Secure`.
//! - `BILLS_AUTO_MIGRATE` - Run migrations at startup (default: false)
//! - `BILLS_STATIC_DIR` - Directory served under `/static` (default: this crate's `static/`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "sqlite://homebase.db?mode=rwc";
/// Assets shipped with this crate, independent of the working directory.
const DEFAULT_STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Bill tracker application configuration.
///
/// Implements `Debug` manually to redact the database URL.
#[derive(Clone)]
pub struct BillsConfig {
    /// `SQLite` database connection URL
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL
    pub base_url: String,
    /// Run pending migrations before serving
    pub auto_migrate: bool,
    /// Directory with CSS and JS assets
    pub static_dir: String,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl std::fmt::Debug for BillsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BillsConfig")
            .field("database_url", &"[REDACTED]")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("base_url", &self.base_url)
            .field("auto_migrate", &self.auto_migrate)
            .field("static_dir", &self.static_dir)
            .field("sentry_dsn", &self.sentry_dsn.as_ref().map(|_| "[REDACTED]"))
            .field("sentry_environment", &self.sentry_environment)
            .finish()
    }
}

impl BillsConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to a value that cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("BILLS_DATABASE_URL");
        let host = get_env_or_default("BILLS_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("BILLS_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("BILLS_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("BILLS_PORT".to_string(), e.to_string()))?;
        let base_url = get_env_or_default("BILLS_BASE_URL", "http://127.0.0.1:3000");
        url::Url::parse(&base_url)
            .map_err(|e| ConfigError::InvalidEnvVar("BILLS_BASE_URL".to_string(), e.to_string()))?;
        let auto_migrate = parse_bool("BILLS_AUTO_MIGRATE", &get_env_or_default("BILLS_AUTO_MIGRATE", "false"))?;
        let static_dir = get_env_or_default("BILLS_STATIC_DIR", DEFAULT_STATIC_DIR);
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            auto_migrate,
            static_dir,
            sentry_dsn,
            sentry_environment,
        })
    }

    /// Configuration for tests and embedded use: in-memory defaults, no Sentry.
    #[must_use]
    pub fn for_database(database_url: &str) -> Self {
        Self {
            database_url: SecretString::from(database_url.to_owned()),
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: "http://127.0.0.1:3000".to_string(),
            auto_migrate: true,
            static_dir: DEFAULT_STATIC_DIR.to_string(),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether session cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`, then the local file.
fn get_database_url(primary_key: &str) -> SecretString {
    if let Ok(value) = std::env::var(primary_key) {
        return SecretString::from(value);
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return SecretString::from(value);
    }
    SecretString::from(DEFAULT_DATABASE_URL.to_string())
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got '{other}'"),
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_addr() {
        let config = BillsConfig {
            port: 8080,
            ..BillsConfig::for_database("sqlite::memory:")
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let config = BillsConfig {
            sentry_dsn: Some("https://key@sentry.example/1".to_string()),
            ..BillsConfig::for_database("sqlite:///var/lib/super_secret_path.db")
        };

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("127.0.0.1"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_path"));
        assert!(!debug_output.contains("key@sentry"));
    }

    #[test]
    fn test_secure_cookies_follow_base_url_scheme() {
        let mut config = BillsConfig::for_database("sqlite::memory:");
        assert!(!config.secure_cookies());

        config.base_url = "https://bills.example.com".to_string();
        assert!(config.secure_cookies());
    }

    #[test]
    fn test_default_static_dir_is_absolute() {
        let config = BillsConfig::for_database("sqlite::memory:");
        let dir = std::path::Path::new(&config.static_dir);

        assert!(dir.is_absolute());
        assert!(dir.join("css").join("main.css").is_file());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("X", "true").unwrap());
        assert!(parse_bool("X", " YES ").unwrap());
        assert!(!parse_bool("X", "0").unwrap());
        assert!(!parse_bool("X", "").unwrap());
        assert!(matches!(
            parse_bool("X", "maybe"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }
}
