//! Authentication configuration
//!
//! Lockout thresholds, hashing cost and the legacy credential upgrade switch.

use std::time::Duration;

use thiserror::Error;

use crate::credential::{BCRYPT_COST_RANGE, DEFAULT_BCRYPT_COST};
use crate::lockout::LockoutPolicy;
use crate::parse::parse_duration;

/// Configuration for the authenticator.
///
/// # Example
///
/// ```ignore
/// use stockroom_auth::AuthConfig;
///
/// // Load from environment variables
/// let config = AuthConfig::from_env()?;
///
/// // Or build programmatically
/// let config = AuthConfig::builder()
///     .max_failed_attempts(5)
///     .lockout_duration(Duration::from_secs(600))
///     .build();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// Failed-attempt threshold and lockout length
    pub policy: LockoutPolicy,

    /// bcrypt work factor for newly hashed credentials
    pub bcrypt_cost: u32,

    /// Re-hash legacy plaintext credentials on successful login
    pub upgrade_legacy_credentials: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            policy: LockoutPolicy::default(),
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            upgrade_legacy_credentials: false,
        }
    }
}

impl AuthConfig {
    /// Create a new builder with default settings
    pub fn builder() -> AuthConfigBuilder {
        AuthConfigBuilder::default()
    }

    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `AUTH_MAX_FAILED_ATTEMPTS`: failures before lockout (default: 3)
    /// - `AUTH_LOCKOUT_DURATION`: lockout length (default: "5m")
    /// - `AUTH_BCRYPT_COST`: bcrypt cost, 4 to 31 (default: 10)
    /// - `AUTH_UPGRADE_LEGACY`: re-hash plaintext credentials (default: false)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut builder = Self::builder();

        if let Some(value) = get("AUTH_MAX_FAILED_ATTEMPTS") {
            let attempts: u32 = value
                .trim()
                .parse()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConfigError::invalid("AUTH_MAX_FAILED_ATTEMPTS", &value))?;
            builder = builder.max_failed_attempts(attempts);
        }

        if let Some(value) = get("AUTH_LOCKOUT_DURATION") {
            let duration = parse_duration(&value)
                .filter(|d| !d.is_zero())
                .ok_or_else(|| ConfigError::invalid("AUTH_LOCKOUT_DURATION", &value))?;
            builder = builder.lockout_duration(duration);
        }

        if let Some(value) = get("AUTH_BCRYPT_COST") {
            let cost: u32 = value
                .trim()
                .parse()
                .ok()
                .filter(|c| BCRYPT_COST_RANGE.contains(c))
                .ok_or_else(|| ConfigError::invalid("AUTH_BCRYPT_COST", &value))?;
            builder = builder.bcrypt_cost(cost);
        }

        if let Some(value) = get("AUTH_UPGRADE_LEGACY") {
            let enabled = match value.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => return Err(ConfigError::invalid("AUTH_UPGRADE_LEGACY", &value)),
            };
            builder = builder.upgrade_legacy_credentials(enabled);
        }

        Ok(builder.build())
    }
}

/// Builder for AuthConfig
#[derive(Debug, Clone, Default)]
pub struct AuthConfigBuilder {
    config: AuthConfig,
    max_attempts: Option<u32>,
    lockout_duration: Option<Duration>,
}

impl AuthConfigBuilder {
    /// Set failed attempts before lockout (minimum 1)
    pub fn max_failed_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Set lockout duration
    pub fn lockout_duration(mut self, duration: Duration) -> Self {
        self.lockout_duration = Some(duration);
        self
    }

    /// Set bcrypt cost for new hashes
    pub fn bcrypt_cost(mut self, cost: u32) -> Self {
        self.config.bcrypt_cost = cost;
        self
    }

    /// Enable or disable the legacy credential upgrade
    pub fn upgrade_legacy_credentials(mut self, enabled: bool) -> Self {
        self.config.upgrade_legacy_credentials = enabled;
        self
    }

    /// Build the configuration
    pub fn build(self) -> AuthConfig {
        let mut policy = LockoutPolicy::builder();
        if let Some(attempts) = self.max_attempts {
            policy = policy.max_attempts(attempts);
        }
        if let Some(duration) = self.lockout_duration {
            policy = policy.lockout_duration(duration);
        }

        AuthConfig {
            policy: policy.build(),
            ..self.config
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable has an unusable value
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

impl ConfigError {
    fn invalid(key: &'static str, value: &str) -> Self {
        Self::Invalid {
            key,
            value: value.to_string(),
        }
    }
}
