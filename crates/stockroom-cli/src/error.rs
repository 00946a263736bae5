//! Error types for the stockroom CLI

use stockroom_auth::observability::ObservabilityError;
use stockroom_auth::{AccountError, ConfigError, DatabaseError, UnknownRole};
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Authentication settings could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database setup failed
    #[error("{0}")]
    Database(#[from] DatabaseError),

    /// Logging setup failed
    #[error("{0}")]
    Observability(#[from] ObservabilityError),

    /// Account operation failed
    #[error("{0}")]
    Account(#[from] AccountError),

    /// Unrecognized role name
    #[error("Invalid role: {0}. Valid options: admin, manager, employee")]
    InvalidRole(String),

    /// Login rejected; carries the user-facing reason
    #[error("{0}")]
    LoginRejected(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<UnknownRole> for CliError {
    fn from(err: UnknownRole) -> Self {
        Self::InvalidRole(err.0)
    }
}
