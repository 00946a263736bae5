//! User record store
//!
//! The authenticator reads an account and writes its lockout bookkeeping as a
//! single read-modify-write. [`UserStore::begin`] opens a transaction that
//! isolates that sequence per account: a second transaction touching the same
//! account waits until the first commits or rolls back, so two concurrent
//! failures cannot both read the same counter.
//!
//! Dropping a [`UserTransaction`] without calling `commit` rolls it back and
//! releases everything it holds.
//!
//! Two backends are provided:
//! - [`MemoryUserStore`]: in-process, per-account async mutex
//! - `PgUserStore` (feature `postgres`): `SELECT ... FOR UPDATE` in a sqlx transaction

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::account::{ProfileUpdate, Role, UserAccount, UserId};

mod memory;
#[cfg(feature = "postgres")]
mod postgres;

pub use memory::{MemoryTransaction, MemoryUserStore};
#[cfg(feature = "postgres")]
pub use postgres::{PgTransaction, PgUserStore};

/// Errors raised by a user store
#[derive(Debug, Error)]
pub enum StoreError {
    /// No account with this id
    #[error("user {0} not found")]
    UserNotFound(UserId),

    /// Username already taken
    #[error("username already exists: {0}")]
    DuplicateUsername(String),

    /// A stored row could not be mapped to an account
    #[error("corrupt user record: {0}")]
    Corrupt(String),

    /// The transaction was already committed or rolled back
    #[error("transaction already finished")]
    TransactionClosed,

    /// Backend-specific failure
    #[error("store backend error: {0}")]
    Backend(String),

    /// Database failure
    #[cfg(feature = "postgres")]
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A new account as it is written to the store (credential already hashed)
#[derive(Clone)]
pub struct NewAccount {
    pub username: String,
    pub credential: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub role: Role,
}

impl std::fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAccount")
            .field("username", &self.username)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Storage for user accounts
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Open a transaction for an authentication read-modify-write
    async fn begin(&self) -> Result<Box<dyn UserTransaction + '_>, StoreError>;

    /// Insert a new account with a zero failure counter and no lockout
    async fn insert_user(&self, account: NewAccount) -> Result<UserId, StoreError>;

    /// Fetch an account by id
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserAccount>, StoreError>;

    /// Every account, ordered by username
    async fn list_users(&self) -> Result<Vec<UserAccount>, StoreError>;

    /// Update profile fields; returns `false` when the id does not exist
    async fn update_profile(&self, id: UserId, update: &ProfileUpdate) -> Result<bool, StoreError>;

    /// Reset the counter and clear any lockout; returns `false` when the
    /// username does not exist
    async fn unlock(&self, username: &str) -> Result<bool, StoreError>;

    /// Remove an account; returns `false` when the id does not exist
    async fn delete_user(&self, id: UserId) -> Result<bool, StoreError>;
}

/// An isolated unit of work against one account
#[async_trait]
pub trait UserTransaction: Send {
    /// Look up an account and hold it until the transaction ends
    async fn find_by_username(&mut self, username: &str) -> Result<Option<UserAccount>, StoreError>;

    /// Persist a failed attempt: new counter and lockout expiry
    async fn record_failed_attempt(
        &mut self,
        id: UserId,
        failed_attempts: u32,
        lockout_until: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError>;

    /// Reset the counter to zero and clear the lockout
    async fn reset_failed_attempts(&mut self, id: UserId) -> Result<(), StoreError>;

    /// Replace the stored credential
    async fn replace_credential(&mut self, id: UserId, credential: &str) -> Result<(), StoreError>;

    /// Make all writes visible and release the account
    async fn commit(&mut self) -> Result<(), StoreError>;

    /// Discard all writes and release the account
    async fn rollback(&mut self) -> Result<(), StoreError>;
}
