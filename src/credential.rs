//! Stored credential handling
//!
//! A stored credential is either a bcrypt hash, recognized by its `$2?$`
//! prefix, or a legacy plaintext value left over from before passwords were
//! hashed. [`Credential::parse`] picks the comparison strategy from the stored
//! value alone, so the rest of the crate never branches on the format.
//!
//! bcrypt work runs on the blocking thread pool to keep the async runtime
//! responsive.

use async_trait::async_trait;
use thiserror::Error;

use crate::crypto::constant_time_str_eq;

/// Prefixes that mark a stored credential as a bcrypt hash
pub const BCRYPT_PREFIXES: [&str; 4] = ["$2a$", "$2b$", "$2x$", "$2y$"];

/// Default bcrypt cost, matching the cost existing hashes were created with
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// bcrypt only reads the first 72 bytes of a password
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Range of work factors bcrypt accepts
pub const BCRYPT_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

/// Credential hashing errors
#[derive(Debug, Error)]
pub enum HashError {
    /// bcrypt rejected the input or the stored hash
    #[error("bcrypt failure: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),

    /// The blocking task panicked or was cancelled
    #[error("hashing task failed: {0}")]
    Task(String),
}

/// A stored credential, classified by its tag
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Credential<'a> {
    /// Untagged value compared as plaintext (migration path)
    LegacyPlaintext(&'a str),
    /// Salted bcrypt hash
    SaltedHash(&'a str),
}

impl<'a> Credential<'a> {
    /// Classify a stored credential string
    pub fn parse(stored: &'a str) -> Self {
        if BCRYPT_PREFIXES.iter().any(|p| stored.starts_with(p)) {
            Self::SaltedHash(stored)
        } else {
            Self::LegacyPlaintext(stored)
        }
    }

    /// Whether the stored value still needs migrating to a hash
    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::LegacyPlaintext(_))
    }

    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::LegacyPlaintext(_) => "legacy_plaintext",
            Self::SaltedHash(_) => "bcrypt",
        }
    }
}

impl std::fmt::Debug for Credential<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Credential::{}", self.kind())
    }
}

/// Hashes new passwords and verifies supplied passwords against stored ones
#[async_trait]
pub trait CredentialHasher: Send + Sync {
    /// Produce a tagged credential string for storage
    async fn hash(&self, plain: &str) -> Result<String, HashError>;

    /// Check `plain` against a stored credential of either kind
    async fn verify(&self, plain: &str, stored: &str) -> Result<bool, HashError>;
}

/// bcrypt-backed [`CredentialHasher`]
#[derive(Debug, Clone, Copy)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    /// Create a hasher with the given bcrypt cost (4..=31)
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// The configured cost
    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new(DEFAULT_BCRYPT_COST)
    }
}

#[async_trait]
impl CredentialHasher for BcryptHasher {
    async fn hash(&self, plain: &str) -> Result<String, HashError> {
        let plain = plain.to_string();
        let cost = self.cost;

        tokio::task::spawn_blocking(move || bcrypt::hash(plain, cost).map_err(HashError::from))
            .await
            .map_err(|e| HashError::Task(e.to_string()))?
    }

    async fn verify(&self, plain: &str, stored: &str) -> Result<bool, HashError> {
        match Credential::parse(stored) {
            Credential::LegacyPlaintext(expected) => Ok(constant_time_str_eq(plain, expected)),
            Credential::SaltedHash(hash) => {
                let plain = plain.to_string();
                let hash = hash.to_string();

                tokio::task::spawn_blocking(move || {
                    bcrypt::verify(plain, &hash).map_err(HashError::from)
                })
                .await
                .map_err(|e| HashError::Task(e.to_string()))?
            }
        }
    }
}
