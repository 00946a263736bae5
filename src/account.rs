//! User account records and the identity handed to callers

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Database identifier of a user account
pub type UserId = i64;

/// Account role
///
/// Only [`Role::Admin`] may complete a login to the management interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Privileged role allowed into the management interface
    Admin,
    /// Stock manager
    Manager,
    /// Regular employee
    Employee,
}

impl Role {
    /// Name as stored in the `role` column
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Employee => "employee",
        }
    }

    /// Whether this is the privileged role
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a stored role name is not recognized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            "employee" => Ok(Self::Employee),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// A stored user account, including the lockout bookkeeping fields
#[derive(Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub id: UserId,
    pub username: String,
    /// Stored credential, either a tagged hash or legacy plaintext
    pub credential: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub role: Role,
    /// Consecutive failed attempts since the last success
    pub failed_attempts: u32,
    /// Lockout expiry; the account is blocked while now is before this
    pub lockout_until: Option<DateTime<Utc>>,
}

impl fmt::Debug for UserAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserAccount")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("credential", &"***")
            .field("role", &self.role)
            .field("failed_attempts", &self.failed_attempts)
            .field("lockout_until", &self.lockout_until)
            .finish_non_exhaustive()
    }
}

impl UserAccount {
    /// Identity fields exposed to callers after a successful login
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id,
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            role: self.role,
        }
    }
}

/// Identity of an authenticated account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

/// Profile view of an account (identity plus contact details)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(flatten)]
    pub identity: Identity,
    pub email: Option<String>,
}

impl From<&UserAccount> for Profile {
    fn from(account: &UserAccount) -> Self {
        Self {
            identity: account.identity(),
            email: account.email.clone(),
        }
    }
}

/// Fields required to create an account
#[derive(Clone)]
pub struct NewUser {
    pub username: String,
    /// Plaintext password; hashed before it reaches the store
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub role: Role,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("password", &"***")
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Editable profile fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
}
