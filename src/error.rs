//! Login outcomes and the caller-facing failure taxonomy
//!
//! Failures are reported to the caller only through [`AuthFailure::reason`].
//! Store and hashing errors collapse into [`AuthFailure::Internal`] whose text
//! carries no detail; the underlying error goes to the log only.
//!
//! Unknown usernames and wrong passwords share the same leading text so the
//! reason cannot be used to discover which usernames exist.

use std::fmt;
use std::time::Duration;

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::account::Identity;
use crate::parse::describe_duration;

/// Text shared by unknown-username and wrong-password failures
pub const INVALID_CREDENTIALS: &str = "Invalid username or password.";

/// Text returned for any internal failure
pub const INTERNAL_ERROR: &str = "An internal error occurred. Please try again.";

/// Text returned when a non-admin account tries to log in
pub const ACCESS_DENIED: &str = "Access denied. Only administrators may sign in to this interface.";

/// Why an authentication attempt failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// Unknown username
    InvalidCredentials,
    /// Wrong password, account not yet locked
    BadCredential {
        /// Attempts left before the account locks
        remaining_attempts: u32,
    },
    /// Wrong password that hit the threshold; the account is now locked
    LockoutTriggered {
        /// Length of the lockout just applied
        duration: Duration,
    },
    /// Rejected without checking the password because a lockout is active
    LockedOut {
        /// Whole seconds until the lockout expires, rounded up
        remaining_secs: u64,
    },
    /// Valid credential, but the account lacks the admin role
    AccessDenied,
    /// Store or hashing failure
    Internal,
}

impl AuthFailure {
    /// User-facing reason text
    pub fn reason(&self) -> String {
        match self {
            Self::InvalidCredentials => INVALID_CREDENTIALS.to_string(),
            Self::BadCredential { remaining_attempts } => format!(
                "{} {} remaining before lockout.",
                INVALID_CREDENTIALS,
                attempts_phrase(*remaining_attempts)
            ),
            Self::LockoutTriggered { duration } => format!(
                "Too many failed attempts. Your account will be locked for {}.",
                describe_duration(*duration)
            ),
            Self::LockedOut { remaining_secs } => format!(
                "Account temporarily locked. Try again in {}.",
                describe_wait(*remaining_secs)
            ),
            Self::AccessDenied => ACCESS_DENIED.to_string(),
            Self::Internal => INTERNAL_ERROR.to_string(),
        }
    }
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason())
    }
}

impl std::error::Error for AuthFailure {}

fn attempts_phrase(n: u32) -> String {
    if n == 1 {
        "1 attempt".to_string()
    } else {
        format!("{} attempts", n)
    }
}

/// "4 minutes and 59 seconds", "1 minute", "30 seconds", or "a moment"
fn describe_wait(secs: u64) -> String {
    let minutes = secs / 60;
    let seconds = secs % 60;

    let mut parts = Vec::with_capacity(2);
    match minutes {
        0 => {}
        1 => parts.push("1 minute".to_string()),
        m => parts.push(format!("{} minutes", m)),
    }
    match seconds {
        0 => {}
        1 => parts.push("1 second".to_string()),
        s => parts.push(format!("{} seconds", s)),
    }

    if parts.is_empty() {
        "a moment".to_string()
    } else {
        parts.join(" and ")
    }
}

/// Outcome of an authentication or login attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthResult {
    /// Credentials accepted
    Success(Identity),
    /// Attempt rejected
    Failure(AuthFailure),
}

impl AuthResult {
    /// Whether the attempt succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Identity on success
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Success(identity) => Some(identity),
            Self::Failure(_) => None,
        }
    }

    /// Failure kind on failure
    pub fn failure(&self) -> Option<AuthFailure> {
        match self {
            Self::Success(_) => None,
            Self::Failure(failure) => Some(*failure),
        }
    }

    /// User-facing reason on failure
    pub fn reason(&self) -> Option<String> {
        self.failure().map(|f| f.reason())
    }

    /// Convert into a `Result`
    pub fn into_result(self) -> Result<Identity, AuthFailure> {
        match self {
            Self::Success(identity) => Ok(identity),
            Self::Failure(failure) => Err(failure),
        }
    }
}

impl From<AuthFailure> for AuthResult {
    fn from(failure: AuthFailure) -> Self {
        Self::Failure(failure)
    }
}

/// Serializes as `{"ok": true, "identity": {...}}` or
/// `{"ok": false, "reason": "..."}`.
impl Serialize for AuthResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("AuthResult", 2)?;
        match self {
            Self::Success(identity) => {
                state.serialize_field("ok", &true)?;
                state.serialize_field("identity", identity)?;
            }
            Self::Failure(failure) => {
                state.serialize_field("ok", &false)?;
                state.serialize_field("reason", &failure.reason())?;
            }
        }
        state.end()
    }
}
