//! PostgreSQL connection pool
//!
//! Pool configuration, connection setup, health checks and the `users`
//! migration. Only compiled with the `postgres` feature.

use std::str::FromStr;
use std::time::{Duration, Instant};

use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, warn};

use crate::observability::SecurityEvent;
use crate::parse::parse_duration;

/// Database configuration.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Connection URL (from `DATABASE_URL`)
    pub database_url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of idle connections to maintain
    pub min_connections: u32,

    /// Maximum time to wait for a connection from the pool
    pub acquire_timeout: Duration,

    /// Maximum lifetime of a connection before it's closed
    pub max_lifetime: Duration,

    /// Maximum idle time before a connection is closed
    pub idle_timeout: Duration,

    /// SSL mode for connections
    pub ssl_mode: SslMode,

    /// Path to SSL root certificate (CA) for verification
    pub ssl_root_cert: Option<String>,

    /// Run migrations after connecting
    pub auto_migrate: bool,
}

/// SSL/TLS mode for database connections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SslMode {
    /// Never use SSL (development only)
    Disable,
    /// Use SSL if available
    #[default]
    Prefer,
    /// Require SSL connection
    Require,
    /// Require SSL and verify server certificate
    VerifyCa,
    /// Require SSL, verify certificate and hostname
    VerifyFull,
}

impl SslMode {
    fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "disable" => Some(Self::Disable),
            "prefer" => Some(Self::Prefer),
            "require" => Some(Self::Require),
            "verify-ca" | "verifyca" => Some(Self::VerifyCa),
            "verify-full" | "verifyfull" => Some(Self::VerifyFull),
            _ => None,
        }
    }
}

impl From<SslMode> for PgSslMode {
    fn from(mode: SslMode) -> Self {
        match mode {
            SslMode::Disable => PgSslMode::Disable,
            SslMode::Prefer => PgSslMode::Prefer,
            SslMode::Require => PgSslMode::Require,
            SslMode::VerifyCa => PgSslMode::VerifyCa,
            SslMode::VerifyFull => PgSslMode::VerifyFull,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            max_lifetime: Duration::from_secs(30 * 60),
            idle_timeout: Duration::from_secs(10 * 60),
            ssl_mode: SslMode::Prefer,
            ssl_root_cert: None,
            auto_migrate: true,
        }
    }
}

impl DatabaseConfig {
    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DATABASE_URL`: PostgreSQL connection URL (required)
    /// - `DB_MAX_CONNECTIONS`: Max pool size (default: 10)
    /// - `DB_MIN_CONNECTIONS`: Min idle connections (default: 1)
    /// - `DB_ACQUIRE_TIMEOUT`: Connection acquire timeout (default: "30s")
    /// - `DB_MAX_LIFETIME`: Max connection lifetime (default: "30m")
    /// - `DB_IDLE_TIMEOUT`: Idle connection timeout (default: "10m")
    /// - `DB_SSL_MODE`: disable|prefer|require|verify-ca|verify-full (default: prefer)
    /// - `DB_SSL_ROOT_CERT`: Path to CA certificate
    /// - `DB_AUTO_MIGRATE`: Run migrations on startup (default: true)
    pub fn from_env() -> Result<Self, DatabaseError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, DatabaseError> {
        let defaults = Self::default();

        let database_url = get("DATABASE_URL")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| DatabaseError::Configuration("DATABASE_URL must be set".into()))?;

        let duration = |key: &str, fallback: Duration| {
            get(key).and_then(|s| parse_duration(&s)).unwrap_or(fallback)
        };

        let ssl_mode = match get("DB_SSL_MODE") {
            Some(name) => SslMode::from_name(&name).ok_or_else(|| {
                DatabaseError::Configuration(format!("Invalid DB_SSL_MODE: {}", name))
            })?,
            None => defaults.ssl_mode,
        };

        Ok(Self {
            database_url,
            max_connections: get("DB_MAX_CONNECTIONS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_connections),
            min_connections: get("DB_MIN_CONNECTIONS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.min_connections),
            acquire_timeout: duration("DB_ACQUIRE_TIMEOUT", defaults.acquire_timeout),
            max_lifetime: duration("DB_MAX_LIFETIME", defaults.max_lifetime),
            idle_timeout: duration("DB_IDLE_TIMEOUT", defaults.idle_timeout),
            ssl_mode,
            ssl_root_cert: get("DB_SSL_ROOT_CERT"),
            auto_migrate: get("DB_AUTO_MIGRATE")
                .map(|s| s.to_lowercase() != "false")
                .unwrap_or(defaults.auto_migrate),
        })
    }

    /// Create a new builder for programmatic configuration.
    pub fn builder(database_url: impl Into<String>) -> DatabaseConfigBuilder {
        DatabaseConfigBuilder::new(database_url)
    }
}

/// Builder for DatabaseConfig
#[derive(Debug, Clone)]
pub struct DatabaseConfigBuilder {
    config: DatabaseConfig,
}

impl DatabaseConfigBuilder {
    /// Create a new builder with the required database URL.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            config: DatabaseConfig {
                database_url: database_url.into(),
                ..Default::default()
            },
        }
    }

    /// Set maximum connections (default: 10)
    pub fn max_connections(mut self, n: u32) -> Self {
        self.config.max_connections = n;
        self
    }

    /// Set minimum idle connections (default: 1)
    pub fn min_connections(mut self, n: u32) -> Self {
        self.config.min_connections = n;
        self
    }

    /// Set connection acquire timeout
    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.config.acquire_timeout = timeout;
        self
    }

    /// Set SSL mode
    pub fn ssl_mode(mut self, mode: SslMode) -> Self {
        self.config.ssl_mode = mode;
        self
    }

    /// Disable automatic migrations
    pub fn without_auto_migrate(mut self) -> Self {
        self.config.auto_migrate = false;
        self
    }

    /// Build the configuration
    pub fn build(self) -> DatabaseConfig {
        self.config
    }
}

/// Create a connection pool, run migrations if enabled, and health check it.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
    info!(
        max_connections = config.max_connections,
        ssl_mode = ?config.ssl_mode,
        auto_migrate = config.auto_migrate,
        "Initializing database connection pool"
    );

    let mut connect_options = PgConnectOptions::from_str(&config.database_url)
        .map_err(|e| DatabaseError::Configuration(format!("Invalid DATABASE_URL: {}", e)))?
        .ssl_mode(config.ssl_mode.into());

    if let Some(ref root_cert) = config.ssl_root_cert {
        connect_options = connect_options.ssl_root_cert(root_cert);
    }

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .max_lifetime(config.max_lifetime)
        .idle_timeout(config.idle_timeout)
        .test_before_acquire(true)
        .connect_with(connect_options)
        .await
        .map_err(|e| DatabaseError::Connection(format!("Failed to connect: {}", e)))?;

    if config.auto_migrate {
        migrate(&pool).await?;
    }

    let status = health_check(&pool).await?;

    crate::security_event!(
        SecurityEvent::DatabaseConnected,
        ssl_enabled = status.ssl_enabled,
        pool_size = status.pool_size,
        "Database connection pool initialized"
    );

    Ok(pool)
}

/// Apply the bundled migrations.
pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| DatabaseError::Migration(e.to_string()))?;

    info!("Database migrations applied");
    Ok(())
}

/// Perform a health check on the database connection.
pub async fn health_check(pool: &PgPool) -> Result<HealthStatus, DatabaseError> {
    let start = Instant::now();

    let result: (i32,) = sqlx::query_as("SELECT 1")
        .fetch_one(pool)
        .await
        .map_err(|e| DatabaseError::HealthCheck(format!("Query failed: {}", e)))?;

    if result.0 != 1 {
        return Err(DatabaseError::HealthCheck("Unexpected query result".into()));
    }

    let ssl_result: (bool,) = sqlx::query_as(
        "SELECT COALESCE((SELECT ssl FROM pg_stat_ssl WHERE pid = pg_backend_pid()), false)",
    )
    .fetch_one(pool)
    .await
    .unwrap_or((false,));

    let status = HealthStatus {
        ssl_enabled: ssl_result.0,
        latency: start.elapsed(),
        pool_size: pool.size(),
        idle_connections: pool.num_idle() as u32,
    };

    if status.ssl_enabled {
        info!(latency_ms = status.latency.as_millis() as u64, "Database health check passed (SSL enabled)");
    } else {
        warn!(latency_ms = status.latency.as_millis() as u64, "Database health check passed (SSL NOT enabled)");
    }

    Ok(status)
}

/// Database health status
#[derive(Debug, Clone)]
pub struct HealthStatus {
    /// SSL/TLS is in use
    pub ssl_enabled: bool,
    /// Query latency
    pub latency: Duration,
    /// Current pool size
    pub pool_size: u32,
    /// Idle connections in pool
    pub idle_connections: u32,
}

impl HealthStatus {
    /// Check if the pool answered quickly enough
    pub fn is_healthy(&self) -> bool {
        self.latency < Duration::from_secs(5)
    }
}

/// Database-specific errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Configuration error (invalid URL, etc.)
    #[error("Database configuration error: {0}")]
    Configuration(String),
    /// Connection error
    #[error("Database connection error: {0}")]
    Connection(String),
    /// Health check failed
    #[error("Database health check failed: {0}")]
    HealthCheck(String),
    /// Migration error
    #[error("Database migration error: {0}")]
    Migration(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_missing_url_is_an_error() {
        let err = DatabaseConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, DatabaseError::Configuration(_)));
    }

    #[test]
    fn test_env_overrides() {
        let config = DatabaseConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/stockroom"),
            ("DB_MAX_CONNECTIONS", "4"),
            ("DB_ACQUIRE_TIMEOUT", "5s"),
            ("DB_SSL_MODE", "verify-full"),
            ("DB_AUTO_MIGRATE", "false"),
        ]))
        .unwrap();

        assert_eq!(config.max_connections, 4);
        assert_eq!(config.min_connections, 1);
        assert_eq!(config.acquire_timeout, Duration::from_secs(5));
        assert_eq!(config.ssl_mode, SslMode::VerifyFull);
        assert!(!config.auto_migrate);
    }

    #[test]
    fn test_invalid_ssl_mode_rejected() {
        let result = DatabaseConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/stockroom"),
            ("DB_SSL_MODE", "sometimes"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_builder() {
        let config = DatabaseConfig::builder("postgres://localhost/stockroom")
            .max_connections(2)
            .ssl_mode(SslMode::Disable)
            .without_auto_migrate()
            .build();
        assert_eq!(config.max_connections, 2);
        assert_eq!(config.ssl_mode, SslMode::Disable);
        assert!(!config.auto_migrate);
    }
}
