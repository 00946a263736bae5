//! # stockroom-auth
//!
//! Account authentication for the stockroom inventory manager.
//!
//! This crate verifies credentials against a user store, enforces a
//! failed-attempt lockout policy, and restricts logins to admin accounts.
//!
//! ## Features
//!
//! - **Lockout**: 3 consecutive failures lock an account for 5 minutes (configurable)
//! - **Atomic attempts**: each attempt is one store transaction, serialized per account
//! - **Credentials**: bcrypt hashes, with legacy plaintext values still accepted
//! - **No enumeration**: unknown usernames and wrong passwords share one message
//! - **Audit logging**: structured security events through `tracing`
//! - **PostgreSQL store** (feature `postgres`): `SELECT ... FOR UPDATE` row locking
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use stockroom_auth::{create_pool, AuthConfig, Authenticator, BcryptHasher, DatabaseConfig, PgUserStore};
//! use stockroom_auth::observability::{init, ObservabilityConfig};
//! use stockroom_auth::session::Session;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init(&ObservabilityConfig::from_env())?;
//!
//!     let pool = create_pool(&DatabaseConfig::from_env()?).await?;
//!     let config = AuthConfig::from_env()?;
//!
//!     let auth = Authenticator::new(
//!         Arc::new(PgUserStore::new(pool)),
//!         Arc::new(BcryptHasher::new(config.bcrypt_cost)),
//!         &config,
//!     );
//!
//!     match Session::establish(auth.login("alice", "secret123").await) {
//!         Ok(session) => println!("Welcome, {}", session.identity().first_name),
//!         Err(failure) => eprintln!("{}", failure.reason()),
//!     }
//!     Ok(())
//! }
//! ```

mod account;
mod accounts;
mod authenticator;
pub mod clock;
mod config;
pub mod credential;
mod crypto;
#[cfg(feature = "postgres")]
mod database;
mod error;
pub mod lockout;
pub mod observability;
mod parse;
pub mod session;
pub mod store;

// Re-exports
pub use account::{Identity, NewUser, Profile, ProfileUpdate, Role, UnknownRole, UserAccount, UserId};
pub use accounts::{AccountError, AccountManager};
pub use authenticator::Authenticator;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AuthConfig, AuthConfigBuilder, ConfigError};
pub use credential::{BcryptHasher, Credential, CredentialHasher, HashError};
pub use crypto::{constant_time_eq, constant_time_str_eq};
pub use error::{AuthFailure, AuthResult, ACCESS_DENIED, INTERNAL_ERROR, INVALID_CREDENTIALS};
pub use lockout::{LockState, LockoutPolicy, LockoutPolicyBuilder};
pub use observability::ObservabilityConfigBuilder;
pub use parse::{describe_duration, parse_duration};
pub use session::Session;
pub use store::{MemoryUserStore, StoreError, UserStore, UserTransaction};

#[cfg(feature = "postgres")]
pub use database::{
    create_pool, health_check, migrate, DatabaseConfig, DatabaseConfigBuilder, DatabaseError,
    HealthStatus, SslMode,
};
#[cfg(feature = "postgres")]
pub use store::PgUserStore;
