//! Account authenticator
//!
//! Verifies a username and password against the user store and enforces the
//! failed-attempt lockout policy. Every attempt runs as one store transaction:
//! the account lookup, the lockout check, the credential check and the
//! bookkeeping write all happen while the account is held, so concurrent
//! attempts against the same account are serialized and no increment is lost.
//!
//! # Outcomes
//!
//! | Situation                         | Result                                   | Writes              |
//! |-----------------------------------|------------------------------------------|---------------------|
//! | Unknown username                  | [`AuthFailure::InvalidCredentials`]      | none, rolled back   |
//! | Lockout still active              | [`AuthFailure::LockedOut`]               | none, rolled back   |
//! | Wrong password, below threshold   | [`AuthFailure::BadCredential`]           | counter + 1         |
//! | Wrong password, reaches threshold | [`AuthFailure::LockoutTriggered`]        | counter + 1, expiry |
//! | Correct password                  | [`AuthResult::Success`]                  | counter 0, no expiry|
//! | Store or hashing error            | [`AuthFailure::Internal`]                | rolled back         |
//!
//! [`Authenticator::authorize_admin`] is applied on top of a result and never
//! touches the store.
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use stockroom_auth::{AuthConfig, Authenticator, BcryptHasher, MemoryUserStore};
//!
//! let config = AuthConfig::default();
//! let auth = Authenticator::new(
//!     Arc::new(MemoryUserStore::new()),
//!     Arc::new(BcryptHasher::new(config.bcrypt_cost)),
//!     &config,
//! );
//!
//! match auth.login("alice", "secret123").await {
//!     AuthResult::Success(identity) => { /* establish a session */ }
//!     AuthResult::Failure(failure) => eprintln!("{}", failure.reason()),
//! }
//! ```

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::account::UserAccount;
use crate::clock::{Clock, SystemClock};
use crate::config::AuthConfig;
use crate::credential::{Credential, CredentialHasher, HashError, MAX_PASSWORD_BYTES};
use crate::error::{AuthFailure, AuthResult};
use crate::lockout::{self, remaining_secs, LockState, LockoutPolicy};
use crate::observability::SecurityEvent;
use crate::store::{StoreError, UserStore, UserTransaction};

/// Failure inside an authentication transaction
#[derive(Debug, Error)]
enum AttemptError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Hash(#[from] HashError),
}

/// Result of an attempt, and whether it wrote anything
enum Attempt {
    /// Nothing written; the transaction is rolled back
    Unchanged(AuthResult),
    /// Bookkeeping written; the transaction must commit
    Recorded(AuthResult),
}

/// Authenticates accounts and enforces the lockout policy
#[derive(Clone)]
pub struct Authenticator {
    store: Arc<dyn UserStore>,
    hasher: Arc<dyn CredentialHasher>,
    clock: Arc<dyn Clock>,
    policy: LockoutPolicy,
    upgrade_legacy: bool,
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("policy", &self.policy)
            .field("upgrade_legacy", &self.upgrade_legacy)
            .finish_non_exhaustive()
    }
}

impl Authenticator {
    /// Create an authenticator using the system clock
    pub fn new(
        store: Arc<dyn UserStore>,
        hasher: Arc<dyn CredentialHasher>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            store,
            hasher,
            clock: Arc::new(SystemClock),
            policy: config.policy.clone(),
            upgrade_legacy: config.upgrade_legacy_credentials,
        }
    }

    /// Replace the clock used for lockout decisions
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Active lockout policy
    pub fn policy(&self) -> &LockoutPolicy {
        &self.policy
    }

    /// Verify `password` for `username` and update the lockout bookkeeping.
    ///
    /// Never returns an error: store and hashing failures are rolled back,
    /// logged, and reported as [`AuthFailure::Internal`].
    pub async fn authenticate(&self, username: &str, password: &str) -> AuthResult {
        match self.run_attempt(username, password).await {
            Ok(result) => result,
            Err(e) => {
                crate::security_event!(
                    SecurityEvent::StoreFailure,
                    username = %username,
                    error = %e,
                    "Authentication aborted by internal error"
                );
                AuthFailure::Internal.into()
            }
        }
    }

    /// Restrict a successful result to admin accounts.
    ///
    /// A success for a non-admin account becomes [`AuthFailure::AccessDenied`]
    /// and its identity is discarded. Failures pass through unchanged. Nothing
    /// is written: the bookkeeping done by [`authenticate`](Self::authenticate)
    /// stands.
    pub fn authorize_admin(&self, result: AuthResult) -> AuthResult {
        match result {
            AuthResult::Success(identity) if identity.role.is_admin() => {
                crate::security_event!(
                    SecurityEvent::AccessGranted,
                    user_id = identity.id,
                    username = %identity.username,
                    "Admin login authorized"
                );
                AuthResult::Success(identity)
            }
            AuthResult::Success(identity) => {
                crate::security_event!(
                    SecurityEvent::AccessDenied,
                    user_id = identity.id,
                    username = %identity.username,
                    role = %identity.role,
                    "Login refused, admin role required"
                );
                AuthFailure::AccessDenied.into()
            }
            failure => failure,
        }
    }

    /// Authenticate, then require the admin role
    pub async fn login(&self, username: &str, password: &str) -> AuthResult {
        let result = self.authenticate(username, password).await;
        self.authorize_admin(result)
    }

    async fn run_attempt(&self, username: &str, password: &str) -> Result<AuthResult, AttemptError> {
        let mut tx = self.store.begin().await?;

        match self.evaluate(tx.as_mut(), username, password).await {
            Ok(Attempt::Recorded(result)) => {
                tx.commit().await?;
                Ok(result)
            }
            Ok(Attempt::Unchanged(result)) => {
                if let Err(e) = tx.rollback().await {
                    warn!(error = %e, "Rollback of read-only attempt failed");
                }
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Rollback after failed attempt also failed");
                }
                Err(e)
            }
        }
    }

    async fn evaluate(
        &self,
        tx: &mut (dyn UserTransaction + '_),
        username: &str,
        password: &str,
    ) -> Result<Attempt, AttemptError> {
        let Some(account) = tx.find_by_username(username).await? else {
            crate::security_event!(
                SecurityEvent::AuthenticationFailure,
                username = %username,
                "Login failed, unknown username"
            );
            return Ok(Attempt::Unchanged(AuthFailure::InvalidCredentials.into()));
        };

        let now = self.clock.now();

        if let LockState::LockedUntil(until) = LockState::of(&account, now) {
            let remaining = remaining_secs(until, now);
            lockout::log_locked_attempt(username, remaining);
            return Ok(Attempt::Unchanged(
                AuthFailure::LockedOut {
                    remaining_secs: remaining,
                }
                .into(),
            ));
        }

        if !self.hasher.verify(password, &account.credential).await? {
            return self.record_failure(tx, &account, now).await.map(Attempt::Recorded);
        }

        tx.reset_failed_attempts(account.id).await?;

        if self.upgrade_legacy
            && password.len() <= MAX_PASSWORD_BYTES
            && Credential::parse(&account.credential).is_legacy()
        {
            let hashed = self.hasher.hash(password).await?;
            tx.replace_credential(account.id, &hashed).await?;
            crate::security_event!(
                SecurityEvent::PasswordChanged,
                user_id = account.id,
                username = %account.username,
                "Legacy credential upgraded to bcrypt"
            );
        }

        crate::security_event!(
            SecurityEvent::AuthenticationSuccess,
            user_id = account.id,
            username = %account.username,
            role = %account.role,
            "Login succeeded"
        );

        Ok(Attempt::Recorded(AuthResult::Success(account.identity())))
    }

    async fn record_failure(
        &self,
        tx: &mut (dyn UserTransaction + '_),
        account: &UserAccount,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<AuthResult, AttemptError> {
        let outcome = self.policy.register_failure(account.failed_attempts, now);
        debug!(
            user_id = account.id,
            failed_attempts = outcome.failed_attempts,
            "Recording failed attempt"
        );

        tx.record_failed_attempt(account.id, outcome.failed_attempts, outcome.lockout_until)
            .await?;

        if outcome.locked() {
            lockout::log_account_locked(
                &account.username,
                outcome.failed_attempts,
                self.policy.lockout_duration,
            );
            Ok(AuthFailure::LockoutTriggered {
                duration: self.policy.lockout_duration,
            }
            .into())
        } else {
            lockout::log_login_failure(
                &account.username,
                outcome.failed_attempts,
                outcome.remaining_attempts,
            );
            Ok(AuthFailure::BadCredential {
                remaining_attempts: outcome.remaining_attempts,
            }
            .into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use chrono::{TimeZone, Utc};

    use crate::account::{Identity, Role};
    use crate::clock::ManualClock;
    use crate::credential::BcryptHasher;
    use crate::error::INVALID_CREDENTIALS;
    use crate::store::{MemoryUserStore, NewAccount};

    struct Fixture {
        store: MemoryUserStore,
        clock: ManualClock,
        auth: Authenticator,
    }

    fn fixture_with(config: AuthConfig) -> Fixture {
        let store = MemoryUserStore::new();
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap());
        let auth = Authenticator::new(
            Arc::new(store.clone()),
            Arc::new(BcryptHasher::new(4)),
            &config,
        )
        .with_clock(Arc::new(clock.clone()));
        Fixture { store, clock, auth }
    }

    fn fixture() -> Fixture {
        fixture_with(AuthConfig::default())
    }

    async fn add_user(store: &MemoryUserStore, username: &str, credential: &str, role: Role) {
        store
            .insert_user(NewAccount {
                username: username.to_string(),
                credential: credential.to_string(),
                first_name: "Alice".to_string(),
                last_name: "Martin".to_string(),
                email: None,
                role,
            })
            .await
            .unwrap();
    }

    async fn add_hashed_user(store: &MemoryUserStore, username: &str, password: &str, role: Role) {
        let hashed = BcryptHasher::new(4).hash(password).await.unwrap();
        add_user(store, username, &hashed, role).await;
    }

    #[tokio::test]
    async fn test_legacy_credential_success() {
        let f = fixture();
        add_user(&f.store, "alice", "secret123", Role::Admin).await;

        let result = f.auth.authenticate("alice", "secret123").await;
        let identity = result.identity().unwrap();
        assert_eq!(identity.username, "alice");
        assert_eq!(identity.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_hashed_credential_success() {
        let f = fixture();
        add_hashed_user(&f.store, "bob", "hunter2", Role::Manager).await;

        assert!(f.auth.authenticate("bob", "hunter2").await.is_success());
        assert!(!f.auth.authenticate("bob", "hunter3").await.is_success());
    }

    #[tokio::test]
    async fn test_unknown_user_matches_bad_password_text() {
        let f = fixture();
        add_user(&f.store, "alice", "secret123", Role::Admin).await;

        let unknown = f.auth.authenticate("mallory", "whatever").await;
        assert_eq!(unknown.failure(), Some(AuthFailure::InvalidCredentials));
        assert_eq!(unknown.reason().unwrap(), INVALID_CREDENTIALS);

        let wrong = f.auth.authenticate("alice", "wrong").await.reason().unwrap();
        assert!(wrong.starts_with(INVALID_CREDENTIALS));
    }

    #[tokio::test]
    async fn test_unknown_user_writes_nothing() {
        let f = fixture();
        add_user(&f.store, "alice", "secret123", Role::Admin).await;
        f.auth.authenticate("mallory", "whatever").await;
        assert_eq!(f.store.snapshot("alice").await.unwrap().failed_attempts, 0);
    }

    #[tokio::test]
    async fn test_empty_password_is_a_failed_attempt() {
        let f = fixture();
        add_user(&f.store, "alice", "secret123", Role::Admin).await;

        let result = f.auth.authenticate("alice", "").await;
        assert_eq!(
            result.failure(),
            Some(AuthFailure::BadCredential { remaining_attempts: 2 })
        );
    }

    #[tokio::test]
    async fn test_three_failures_lock_the_account() {
        let f = fixture();
        add_user(&f.store, "alice", "secret123", Role::Admin).await;

        let reasons: Vec<String> = {
            let mut reasons = Vec::new();
            for _ in 0..3 {
                reasons.push(f.auth.authenticate("alice", "wrong").await.reason().unwrap());
            }
            reasons
        };

        assert!(reasons[0].contains("2 attempts remaining"));
        assert!(reasons[1].contains("1 attempt remaining"));
        assert!(reasons[2].contains("will be locked for 5 minutes"));
        assert!(!reasons[2].contains("remaining"));

        let account = f.store.snapshot("alice").await.unwrap();
        assert_eq!(account.failed_attempts, 3);
        assert_eq!(
            account.lockout_until,
            Some(f.clock.now() + chrono::Duration::minutes(5))
        );
    }

    #[tokio::test]
    async fn test_alice_scenario() {
        let f = fixture();
        add_user(&f.store, "alice", "secret123", Role::Admin).await;

        f.auth.authenticate("alice", "wrong").await;
        f.auth.authenticate("alice", "wrong").await;
        let third = f.auth.authenticate("alice", "wrong").await;
        assert!(third.reason().unwrap().contains("will be locked for 5 minutes"));

        let fourth = f.auth.authenticate("alice", "secret123").await;
        assert_eq!(
            fourth.failure(),
            Some(AuthFailure::LockedOut { remaining_secs: 300 })
        );
        assert_eq!(
            fourth.reason().unwrap(),
            "Account temporarily locked. Try again in 5 minutes."
        );
    }

    #[tokio::test]
    async fn test_locked_account_rejects_everything_without_counting() {
        let f = fixture();
        add_user(&f.store, "alice", "secret123", Role::Admin).await;
        for _ in 0..3 {
            f.auth.authenticate("alice", "wrong").await;
        }
        let before = f.store.snapshot("alice").await.unwrap();

        f.clock.advance(Duration::from_secs(61));
        let wrong = f.auth.authenticate("alice", "wrong").await;
        let right = f.auth.authenticate("alice", "secret123").await;

        assert_eq!(wrong.failure(), Some(AuthFailure::LockedOut { remaining_secs: 239 }));
        assert_eq!(
            right.reason().unwrap(),
            "Account temporarily locked. Try again in 3 minutes and 59 seconds."
        );
        assert_eq!(f.store.snapshot("alice").await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_success_after_lockout_expires_resets_state() {
        let f = fixture();
        add_user(&f.store, "alice", "secret123", Role::Admin).await;
        for _ in 0..3 {
            f.auth.authenticate("alice", "wrong").await;
        }

        f.clock.advance(Duration::from_secs(300));
        assert!(f.auth.authenticate("alice", "secret123").await.is_success());

        let account = f.store.snapshot("alice").await.unwrap();
        assert_eq!(account.failed_attempts, 0);
        assert!(account.lockout_until.is_none());
    }

    #[tokio::test]
    async fn test_failure_after_lockout_expires_relocks() {
        let f = fixture();
        add_user(&f.store, "alice", "secret123", Role::Admin).await;
        for _ in 0..3 {
            f.auth.authenticate("alice", "wrong").await;
        }

        f.clock.advance(Duration::from_secs(301));
        let result = f.auth.authenticate("alice", "wrong").await;
        assert!(matches!(
            result.failure(),
            Some(AuthFailure::LockoutTriggered { .. })
        ));
    }

    #[tokio::test]
    async fn test_success_resets_partial_counter() {
        let f = fixture();
        add_user(&f.store, "alice", "secret123", Role::Admin).await;
        f.auth.authenticate("alice", "wrong").await;
        f.auth.authenticate("alice", "wrong").await;

        assert!(f.auth.authenticate("alice", "secret123").await.is_success());
        assert_eq!(f.store.snapshot("alice").await.unwrap().failed_attempts, 0);

        let next = f.auth.authenticate("alice", "wrong").await;
        assert_eq!(
            next.failure(),
            Some(AuthFailure::BadCredential { remaining_attempts: 2 })
        );
    }

    #[tokio::test]
    async fn test_custom_policy() {
        let f = fixture_with(
            AuthConfig::builder()
                .max_failed_attempts(1)
                .lockout_duration(Duration::from_secs(90))
                .build(),
        );
        add_user(&f.store, "alice", "secret123", Role::Admin).await;

        let result = f.auth.authenticate("alice", "wrong").await;
        assert_eq!(
            result.reason().unwrap(),
            "Too many failed attempts. Your account will be locked for 90 seconds."
        );
    }

    #[tokio::test]
    async fn test_authorize_admin() {
        let f = fixture();
        let admin = Identity {
            id: 1,
            username: "alice".into(),
            first_name: "Alice".into(),
            last_name: "Martin".into(),
            role: Role::Admin,
        };
        let employee = Identity {
            role: Role::Employee,
            ..admin.clone()
        };

        assert_eq!(
            f.auth.authorize_admin(AuthResult::Success(admin.clone())),
            AuthResult::Success(admin)
        );
        assert_eq!(
            f.auth.authorize_admin(AuthResult::Success(employee)),
            AuthResult::Failure(AuthFailure::AccessDenied)
        );

        let locked = AuthResult::Failure(AuthFailure::LockedOut { remaining_secs: 10 });
        assert_eq!(f.auth.authorize_admin(locked.clone()), locked);
    }

    #[tokio::test]
    async fn test_non_admin_login_denied_but_counter_reset() {
        let f = fixture();
        add_user(&f.store, "eve", "pass", Role::Employee).await;
        f.auth.authenticate("eve", "wrong").await;

        let result = f.auth.login("eve", "pass").await;
        assert_eq!(result.failure(), Some(AuthFailure::AccessDenied));
        assert!(result.identity().is_none());
        assert_eq!(f.store.snapshot("eve").await.unwrap().failed_attempts, 0);
    }

    #[tokio::test]
    async fn test_store_failure_is_internal_and_rolled_back() {
        let f = fixture();
        add_user(&f.store, "alice", "secret123", Role::Admin).await;
        f.auth.authenticate("alice", "wrong").await;

        f.store.fail_writes(true);
        let result = f.auth.authenticate("alice", "wrong").await;
        assert_eq!(result.failure(), Some(AuthFailure::Internal));
        assert_eq!(result.reason().unwrap(), crate::error::INTERNAL_ERROR);

        f.store.fail_writes(false);
        assert_eq!(f.store.snapshot("alice").await.unwrap().failed_attempts, 1);

        // The account was released: the next attempt proceeds normally
        let next = f.auth.authenticate("alice", "wrong").await;
        assert_eq!(
            next.failure(),
            Some(AuthFailure::BadCredential { remaining_attempts: 1 })
        );
    }

    #[tokio::test]
    async fn test_read_only_outcomes_survive_rejected_writes() {
        let f = fixture();
        add_user(&f.store, "alice", "secret123", Role::Admin).await;
        for _ in 0..3 {
            f.auth.authenticate("alice", "wrong").await;
        }

        f.store.fail_writes(true);

        let locked = f.auth.authenticate("alice", "secret123").await;
        assert!(matches!(
            locked.failure(),
            Some(AuthFailure::LockedOut { remaining_secs: 300 })
        ));

        let unknown = f.auth.authenticate("nobody", "x").await;
        assert_eq!(unknown.failure(), Some(AuthFailure::InvalidCredentials));

        f.store.fail_writes(false);
        let account = f.store.snapshot("alice").await.unwrap();
        assert_eq!(account.failed_attempts, 3);
    }

    #[tokio::test]
    async fn test_malformed_hash_is_internal() {
        let f = fixture();
        add_user(&f.store, "alice", "$2a$10$tooshort", Role::Admin).await;

        let result = f.auth.authenticate("alice", "anything").await;
        assert_eq!(result.failure(), Some(AuthFailure::Internal));
        assert_eq!(f.store.snapshot("alice").await.unwrap().failed_attempts, 0);
    }

    #[tokio::test]
    async fn test_legacy_credential_kept_by_default() {
        let f = fixture();
        add_user(&f.store, "alice", "secret123", Role::Admin).await;

        assert!(f.auth.authenticate("alice", "secret123").await.is_success());
        assert_eq!(f.store.snapshot("alice").await.unwrap().credential, "secret123");
    }

    #[tokio::test]
    async fn test_legacy_credential_upgraded_when_enabled() {
        let f = fixture_with(AuthConfig::builder().upgrade_legacy_credentials(true).build());
        add_user(&f.store, "alice", "secret123", Role::Admin).await;

        assert!(f.auth.authenticate("alice", "secret123").await.is_success());

        let stored = f.store.snapshot("alice").await.unwrap().credential;
        assert!(!Credential::parse(&stored).is_legacy());
        assert!(f.auth.authenticate("alice", "secret123").await.is_success());
        assert!(!f.auth.authenticate("alice", "secret12").await.is_success());
    }

    #[tokio::test]
    async fn test_overlong_legacy_credential_not_upgraded() {
        let f = fixture_with(AuthConfig::builder().upgrade_legacy_credentials(true).build());
        let long = "x".repeat(MAX_PASSWORD_BYTES + 1);
        add_user(&f.store, "alice", &long, Role::Admin).await;

        assert!(f.auth.authenticate("alice", &long).await.is_success());
        assert_eq!(f.store.snapshot("alice").await.unwrap().credential, long);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_failures_lock_exactly_once() {
        let f = fixture();
        add_user(&f.store, "alice", "secret123", Role::Admin).await;

        let handles: Vec<_> = (0..5)
            .map(|_| {
                let auth = f.auth.clone();
                tokio::spawn(async move { auth.authenticate("alice", "wrong").await })
            })
            .collect();

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }

        let triggered = results
            .iter()
            .filter(|r| matches!(r.failure(), Some(AuthFailure::LockoutTriggered { .. })))
            .count();
        let bad = results
            .iter()
            .filter(|r| matches!(r.failure(), Some(AuthFailure::BadCredential { .. })))
            .count();
        let blocked = results
            .iter()
            .filter(|r| matches!(r.failure(), Some(AuthFailure::LockedOut { .. })))
            .count();

        assert_eq!(triggered, 1);
        assert_eq!(bad, 2);
        assert_eq!(blocked, 2);
        assert_eq!(f.store.snapshot("alice").await.unwrap().failed_attempts, 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_failures_below_threshold_all_counted() {
        let f = fixture();
        add_user(&f.store, "alice", "secret123", Role::Admin).await;

        let a = {
            let auth = f.auth.clone();
            tokio::spawn(async move { auth.authenticate("alice", "wrong").await })
        };
        let b = {
            let auth = f.auth.clone();
            tokio::spawn(async move { auth.authenticate("alice", "wrong").await })
        };

        let mut remaining = vec![
            a.await.unwrap().failure(),
            b.await.unwrap().failure(),
        ];
        remaining.sort_by_key(|f| match f {
            Some(AuthFailure::BadCredential { remaining_attempts }) => *remaining_attempts,
            _ => u32::MAX,
        });

        assert_eq!(
            remaining,
            vec![
                Some(AuthFailure::BadCredential { remaining_attempts: 1 }),
                Some(AuthFailure::BadCredential { remaining_attempts: 2 }),
            ]
        );

        let account = f.store.snapshot("alice").await.unwrap();
        assert_eq!(account.failed_attempts, 2);
        assert!(account.lockout_until.is_none());
    }

    #[tokio::test]
    async fn test_other_accounts_unaffected() {
        let f = fixture();
        add_user(&f.store, "alice", "secret123", Role::Admin).await;
        add_user(&f.store, "bob", "pw", Role::Admin).await;

        for _ in 0..3 {
            f.auth.authenticate("alice", "wrong").await;
        }
        assert!(f.auth.authenticate("bob", "pw").await.is_success());
    }
}
