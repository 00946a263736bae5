//! Account management
//!
//! Creating accounts, reading and editing profiles, and administrative
//! unlock. New credentials are always stored as bcrypt hashes.

use std::sync::Arc;

use thiserror::Error;

use crate::account::{NewUser, Profile, ProfileUpdate, UserId};
use crate::credential::{CredentialHasher, HashError, MAX_PASSWORD_BYTES};
use crate::lockout;
use crate::observability::SecurityEvent;
use crate::store::{NewAccount, StoreError, UserStore};

/// Account management errors
#[derive(Debug, Error)]
pub enum AccountError {
    /// Input rejected before reaching the store
    #[error("invalid account data: {0}")]
    Validation(&'static str),

    /// Username already taken
    #[error("username already exists: {0}")]
    DuplicateUsername(String),

    /// No such account
    #[error("account not found")]
    NotFound,

    /// Store failure
    #[error(transparent)]
    Store(StoreError),

    /// Hashing failure
    #[error(transparent)]
    Hash(#[from] HashError),
}

impl From<StoreError> for AccountError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateUsername(name) => Self::DuplicateUsername(name),
            StoreError::UserNotFound(_) => Self::NotFound,
            other => Self::Store(other),
        }
    }
}

/// Account operations outside of login
#[derive(Clone)]
pub struct AccountManager {
    store: Arc<dyn UserStore>,
    hasher: Arc<dyn CredentialHasher>,
}

impl AccountManager {
    /// Create a manager over a store and hasher
    pub fn new(store: Arc<dyn UserStore>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self { store, hasher }
    }

    /// Create an account with a zero failure counter and no lockout
    pub async fn create_user(&self, user: NewUser) -> Result<UserId, AccountError> {
        let username = user.username.trim();
        if username.is_empty() {
            return Err(AccountError::Validation("username must not be empty"));
        }
        if user.password.is_empty() {
            return Err(AccountError::Validation("password must not be empty"));
        }
        if user.password.len() > MAX_PASSWORD_BYTES {
            return Err(AccountError::Validation("password must be at most 72 bytes"));
        }

        let credential = self.hasher.hash(&user.password).await?;
        let id = self
            .store
            .insert_user(NewAccount {
                username: username.to_string(),
                credential,
                first_name: user.first_name,
                last_name: user.last_name,
                email: user.email,
                role: user.role,
            })
            .await?;

        crate::security_event!(
            SecurityEvent::UserRegistered,
            user_id = id,
            username = %username,
            role = %user.role,
            "Account created"
        );

        Ok(id)
    }

    /// Profile of an account
    pub async fn get_profile(&self, id: UserId) -> Result<Profile, AccountError> {
        let account = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(AccountError::NotFound)?;
        Ok(Profile::from(&account))
    }

    /// Profiles of every account, ordered by username
    pub async fn list_profiles(&self) -> Result<Vec<Profile>, AccountError> {
        let accounts = self.store.list_users().await?;
        Ok(accounts.iter().map(Profile::from).collect())
    }

    /// Replace the editable profile fields and return the stored result
    pub async fn update_profile(
        &self,
        id: UserId,
        update: &ProfileUpdate,
    ) -> Result<Profile, AccountError> {
        if !self.store.update_profile(id, update).await? {
            return Err(AccountError::NotFound);
        }

        crate::security_event!(
            SecurityEvent::UserModified,
            user_id = id,
            "Profile updated"
        );

        self.get_profile(id).await
    }

    /// Clear the failure counter and any lockout on an account
    pub async fn unlock_account(&self, username: &str) -> Result<(), AccountError> {
        if !self.store.unlock(username).await? {
            return Err(AccountError::NotFound);
        }
        lockout::log_account_unlocked(username);
        Ok(())
    }

    /// Remove an account permanently
    pub async fn delete_user(&self, id: UserId) -> Result<(), AccountError> {
        if !self.store.delete_user(id).await? {
            return Err(AccountError::NotFound);
        }

        crate::security_event!(
            SecurityEvent::UserDeleted,
            user_id = id,
            "Account deleted"
        );
        Ok(())
    }
}
