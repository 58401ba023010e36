//! Environment-driven configuration.
//!
//! Read once at startup by [`load_from_env`]; the binaries load `.env` first.
//!
//! ## Storage
//!
//! `STORAGE=postgres` (default) needs a database, given either as
//! `DATABASE_URL` or as `DB_HOST` / `DB_PORT` / `DB_USER` / `DB_PASSWORD` /
//! `DB_NAME`. `STORAGE=memory` keeps records in the process and ignores the
//! database variables.
//!
//! ## Other Variables
//!
//! | Variable | Default |
//! |---|---|
//! | `LISTEN` | `0.0.0.0:3000` |
//! | `RUST_LOG` | `info` |
//! | `LOG_FORMAT` (`text` / `json`) | `text` |
//! | `CODE_LENGTH` (4-64) | `6` |
//! | `CODE_GENERATION_ATTEMPTS` (1-100) | `10` |
//! | `DB_MAX_CONNECTIONS` | `10` |
//! | `DB_CONNECT_TIMEOUT` (seconds) | `30` |

use anyhow::{Context, Result, bail};
use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::application::services::short_url_service::DEFAULT_GENERATION_ATTEMPTS;
use crate::domain::code_policy::DEFAULT_CODE_LENGTH;

/// Where short URL records are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => bail!("expected 'postgres' or 'memory', got '{}'", other),
        }
    }
}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => bail!("expected 'text' or 'json', got '{}'", other),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
        })
    }
}

/// PostgreSQL connection and pool settings.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl DatabaseConfig {
    /// Reads the connection and pool settings, regardless of `STORAGE`.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            url: database_url()?,
            max_connections: var_or("DB_MAX_CONNECTIONS", 10)?,
            acquire_timeout: Duration::from_secs(var_or("DB_CONNECT_TIMEOUT", 30)?),
        })
    }

    pub fn validate(&self) -> Result<()> {
        if !self.url.starts_with("postgres://") && !self.url.starts_with("postgresql://") {
            bail!(
                "DATABASE_URL must use the postgres:// or postgresql:// scheme, got '{}'",
                mask_connection_string(&self.url)
            );
        }
        if self.max_connections == 0 {
            bail!("DB_MAX_CONNECTIONS must be at least 1");
        }
        if self.acquire_timeout.is_zero() {
            bail!("DB_CONNECT_TIMEOUT must be at least 1 second");
        }
        Ok(())
    }
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub storage: StorageBackend,
    /// Present exactly when `storage` is [`StorageBackend::Postgres`].
    pub database: Option<DatabaseConfig>,
    pub listen_addr: SocketAddr,
    /// `EnvFilter` directive string.
    pub log_filter: String,
    pub log_format: LogFormat,
    pub code_length: usize,
    pub code_generation_attempts: usize,
}

impl Config {
    /// Reads every setting from the environment.
    ///
    /// # Errors
    ///
    /// Fails on a value that does not parse, or when PostgreSQL storage is
    /// selected without any database settings.
    pub fn from_env() -> Result<Self> {
        let storage: StorageBackend = var_or("STORAGE", StorageBackend::Postgres)?;

        let database = match storage {
            StorageBackend::Postgres => Some(DatabaseConfig::from_env()?),
            StorageBackend::Memory => None,
        };

        Ok(Self {
            storage,
            database,
            listen_addr: var_or("LISTEN", SocketAddr::from(([0, 0, 0, 0], 3000)))?,
            log_filter: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            log_format: var_or("LOG_FORMAT", LogFormat::Text)?,
            code_length: var_or("CODE_LENGTH", DEFAULT_CODE_LENGTH)?,
            code_generation_attempts: var_or(
                "CODE_GENERATION_ATTEMPTS",
                DEFAULT_GENERATION_ATTEMPTS,
            )?,
        })
    }

    /// Checks ranges and cross-field consistency.
    pub fn validate(&self) -> Result<()> {
        match (self.storage, &self.database) {
            (StorageBackend::Postgres, Some(database)) => database.validate()?,
            (StorageBackend::Postgres, None) => {
                bail!("STORAGE=postgres requires DATABASE_URL or DB_* settings")
            }
            (StorageBackend::Memory, _) => {}
        }

        if !(4..=64).contains(&self.code_length) {
            bail!("CODE_LENGTH must be in 4..=64, got {}", self.code_length);
        }
        if !(1..=100).contains(&self.code_generation_attempts) {
            bail!(
                "CODE_GENERATION_ATTEMPTS must be in 1..=100, got {}",
                self.code_generation_attempts
            );
        }

        Ok(())
    }

    /// Logs the effective settings with credentials masked.
    pub fn print_summary(&self) {
        tracing::info!(
            listen = %self.listen_addr,
            log_filter = %self.log_filter,
            log_format = %self.log_format,
            code_length = self.code_length,
            "Configuration loaded"
        );
        match &self.database {
            Some(database) => tracing::info!(
                database = %mask_connection_string(&database.url),
                max_connections = database.max_connections,
                "Storage: postgres"
            ),
            None => tracing::info!("Storage: memory (records are not persisted)"),
        }
    }
}

/// `DATABASE_URL` if set, otherwise assembled from the `DB_*` parts.
pub fn database_url() -> Result<String> {
    if let Ok(url) = env::var("DATABASE_URL") {
        return Ok(url);
    }

    let required = |key: &str| {
        env::var(key).with_context(|| format!("{key} is required when DATABASE_URL is unset"))
    };

    let user = required("DB_USER")?;
    let password = required("DB_PASSWORD")?;
    let name = required("DB_NAME")?;
    let host = env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string());
    let port = env::var("DB_PORT").unwrap_or_else(|_| "5432".to_string());

    Ok(format!("postgres://{user}:{password}@{host}:{port}/{name}"))
}

/// Parses `key` if it is set, or returns `default`.
fn var_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid {key} '{raw}': {e}")),
        Err(_) => Ok(default),
    }
}

/// Replaces the password in a connection string with `***`.
pub fn mask_connection_string(url: &str) -> String {
    let masked = url.split_once("://").and_then(|(scheme, rest)| {
        let (credentials, host) = rest.rsplit_once('@')?;
        let (user, _) = credentials.split_once(':')?;
        Some(format!("{scheme}://{user}:***@{host}"))
    });

    masked.unwrap_or_else(|| url.to_string())
}

/// Reads and validates the configuration.
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}
