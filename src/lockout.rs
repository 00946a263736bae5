//! Failed-attempt lockout policy
//!
//! Each account carries a failed-attempt counter and an optional lockout
//! expiry. Conceptually the account is in one of two states:
//!
//! - `Unlocked(counter)`: attempts are evaluated normally
//! - `LockedUntil(ts)`: every attempt is rejected until `ts` passes
//!
//! There is no explicit unlock transition. Once the expiry is in the past the
//! account is evaluated as unlocked again, with whatever counter it had.
//!
//! The functions here are pure. Persisting their results is the
//! authenticator's job, inside the same store transaction as the lookup.
//!
//! # Usage
//!
//! ```ignore
//! use stockroom_auth::lockout::{LockoutPolicy, LockState};
//!
//! let policy = LockoutPolicy::default(); // 3 failures, 5 min lockout
//!
//! if let LockState::LockedUntil(until) = LockState::of(&account, now) {
//!     // reject without checking the password
//! }
//!
//! let outcome = policy.register_failure(account.failed_attempts, now);
//! if outcome.locked() {
//!     // account is now locked
//! }
//! ```

use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, Utc};

use crate::account::UserAccount;
use crate::observability::SecurityEvent;

/// Lockout policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockoutPolicy {
    /// Failed attempts that trigger a lockout
    pub max_attempts: u32,

    /// How long a triggered lockout lasts
    pub lockout_duration: Duration,
}

impl Default for LockoutPolicy {
    /// 3 failed attempts, 5 minute lockout
    fn default() -> Self {
        Self {
            max_attempts: 3,
            lockout_duration: Duration::from_secs(5 * 60),
        }
    }
}

impl LockoutPolicy {
    /// Create a new builder
    pub fn builder() -> LockoutPolicyBuilder {
        LockoutPolicyBuilder::default()
    }

    /// Apply one failed attempt to an account that currently has
    /// `failed_attempts` recorded failures.
    pub fn register_failure(&self, failed_attempts: u32, now: DateTime<Utc>) -> FailureOutcome {
        let failed_attempts = failed_attempts.saturating_add(1);

        if failed_attempts >= self.max_attempts {
            let step = ChronoDuration::from_std(self.lockout_duration)
                .unwrap_or_else(|_| ChronoDuration::minutes(5));
            FailureOutcome {
                failed_attempts,
                lockout_until: Some(now + step),
                remaining_attempts: 0,
            }
        } else {
            FailureOutcome {
                failed_attempts,
                lockout_until: None,
                remaining_attempts: self.max_attempts - failed_attempts,
            }
        }
    }
}

/// Builder for LockoutPolicy
#[derive(Debug, Clone, Default)]
pub struct LockoutPolicyBuilder {
    policy: LockoutPolicy,
}

impl LockoutPolicyBuilder {
    /// Set failed attempts before lockout (minimum 1)
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.policy.max_attempts = attempts.max(1);
        self
    }

    /// Set lockout duration
    pub fn lockout_duration(mut self, duration: Duration) -> Self {
        self.policy.lockout_duration = duration;
        self
    }

    /// Build the policy
    pub fn build(self) -> LockoutPolicy {
        self.policy
    }
}

/// Lock state of an account at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    /// Attempts are evaluated; carries the current failure counter
    Unlocked(u32),
    /// Attempts are rejected until the timestamp
    LockedUntil(DateTime<Utc>),
}

impl LockState {
    /// Derive the state of `account` at `now`
    pub fn of(account: &UserAccount, now: DateTime<Utc>) -> Self {
        match account.lockout_until {
            Some(until) if until > now => Self::LockedUntil(until),
            _ => Self::Unlocked(account.failed_attempts),
        }
    }
}

/// Result of applying a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureOutcome {
    /// New counter value to persist
    pub failed_attempts: u32,
    /// New lockout expiry to persist, set when this failure hit the threshold
    pub lockout_until: Option<DateTime<Utc>>,
    /// Attempts left before lockout (0 once locked)
    pub remaining_attempts: u32,
}

impl FailureOutcome {
    /// Whether this failure triggered a lockout
    pub fn locked(&self) -> bool {
        self.lockout_until.is_some()
    }
}

/// Remaining lockout time in whole seconds, rounded up
pub fn remaining_secs(until: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let millis = (until - now).num_milliseconds();
    if millis <= 0 {
        0
    } else {
        (millis as u64).div_ceil(1000)
    }
}

// ============================================================================
// Security Event Logging
// ============================================================================

pub(crate) fn log_login_failure(username: &str, failed_count: u32, remaining: u32) {
    crate::security_event!(
        SecurityEvent::AuthenticationFailure,
        username = %username,
        failed_count = failed_count,
        remaining_attempts = remaining,
        "Login failed"
    );
}

pub(crate) fn log_account_locked(username: &str, failed_count: u32, duration: Duration) {
    crate::security_event!(
        SecurityEvent::AccountLocked,
        username = %username,
        failed_count = failed_count,
        lockout_duration_secs = duration.as_secs(),
        "Account locked due to failed login attempts"
    );
}

pub(crate) fn log_locked_attempt(username: &str, remaining_secs: u64) {
    crate::security_event!(
        SecurityEvent::AuthenticationFailure,
        username = %username,
        lockout_remaining_secs = remaining_secs,
        "Login attempt blocked, account locked out"
    );
}

pub(crate) fn log_account_unlocked(username: &str) {
    crate::security_event!(
        SecurityEvent::AccountUnlocked,
        username = %username,
        "Account unlocked"
    );
}
