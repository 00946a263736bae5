//! Logging setup and security event records
//!
//! Application code logs through the standard `tracing` macros and the
//! [`security_event!`](crate::security_event) macro. [`init`] installs the
//! subscriber once at startup.
//!
//! # Usage
//!
//! ```ignore
//! use stockroom_auth::observability::{init, ObservabilityConfig};
//!
//! init(&ObservabilityConfig::from_env())?;
//! ```

mod config;
mod events;
mod providers;

pub use config::{LogFormat, ObservabilityConfig, ObservabilityConfigBuilder};
pub use events::{SecurityEvent, Severity};

use thiserror::Error;
use tracing::info;

/// Initialize logging.
///
/// Call once, before any logging occurs. A second call returns
/// [`ObservabilityError::Provider`] because the global subscriber is already
/// set.
pub fn init(config: &ObservabilityConfig) -> Result<(), ObservabilityError> {
    providers::init_tracing(config)?;

    info!(
        log_format = ?config.log_format,
        log_filter = %config.log_filter,
        "Observability initialized"
    );

    Ok(())
}

/// Observability initialization errors
#[derive(Debug, Error)]
pub enum ObservabilityError {
    /// Invalid configuration
    #[error("Observability config error: {0}")]
    Config(String),
    /// Subscriber installation failed
    #[error("Provider error: {0}")]
    Provider(String),
}
