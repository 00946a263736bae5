//! Logged-in session context
//!
//! A [`Session`] is created from a successful admin login and owned by the
//! caller. Operations that act on behalf of the logged-in account take the
//! session explicitly; there is no process-wide "current user".
//!
//! # Usage
//!
//! ```ignore
//! use stockroom_auth::session::Session;
//!
//! let mut session = Session::establish(auth.login("alice", "secret123").await)?;
//! session.update_profile(&accounts, &update).await?;
//! session.logout();
//! ```

use chrono::{DateTime, Utc};

use crate::account::{Identity, Profile, ProfileUpdate, UserId};
use crate::accounts::{AccountError, AccountManager};
use crate::error::{AuthFailure, AuthResult};
use crate::observability::SecurityEvent;

/// Session of a logged-in account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    identity: Identity,
    created_at: DateTime<Utc>,
    last_activity: DateTime<Utc>,
}

impl Session {
    /// Start a session from a login result.
    ///
    /// A failed result is handed back as the error so the caller can show
    /// its reason.
    pub fn establish(result: AuthResult) -> Result<Self, AuthFailure> {
        Self::establish_at(result, Utc::now())
    }

    /// Start a session with an explicit creation time
    pub fn establish_at(result: AuthResult, now: DateTime<Utc>) -> Result<Self, AuthFailure> {
        let identity = result.into_result()?;
        let session = Self {
            identity,
            created_at: now,
            last_activity: now,
        };
        log_session_created(&session);
        Ok(session)
    }

    /// Identity of the logged-in account
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Id of the logged-in account
    pub fn user_id(&self) -> UserId {
        self.identity.id
    }

    /// When the session was established
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Time of the last operation performed through the session
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    /// Time elapsed since the session was established
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.created_at
    }

    /// Re-read the account and refresh the cached identity
    pub async fn refresh(&mut self, accounts: &AccountManager) -> Result<Profile, AccountError> {
        let profile = accounts.get_profile(self.user_id()).await?;
        self.apply(&profile);
        Ok(profile)
    }

    /// Update the logged-in account's profile and refresh the cached identity
    pub async fn update_profile(
        &mut self,
        accounts: &AccountManager,
        update: &ProfileUpdate,
    ) -> Result<Profile, AccountError> {
        let profile = accounts.update_profile(self.user_id(), update).await?;
        self.apply(&profile);
        Ok(profile)
    }

    /// End the session
    pub fn logout(self) {
        crate::security_event!(
            SecurityEvent::SessionDestroyed,
            user_id = self.identity.id,
            username = %self.identity.username,
            duration_secs = self.age(Utc::now()).num_seconds(),
            "Session ended"
        );
    }

    fn apply(&mut self, profile: &Profile) {
        self.identity = profile.identity.clone();
        self.last_activity = Utc::now().max(self.last_activity);
    }
}

fn log_session_created(session: &Session) {
    crate::security_event!(
        SecurityEvent::SessionCreated,
        user_id = session.identity.id,
        username = %session.identity.username,
        role = %session.identity.role,
        "Session established"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::account::{NewUser, Role};
    use crate::config::AuthConfig;
    use crate::credential::BcryptHasher;
    use crate::store::MemoryUserStore;
    use crate::Authenticator;

    async fn setup() -> (Authenticator, AccountManager) {
        let store = Arc::new(MemoryUserStore::new());
        let hasher = Arc::new(BcryptHasher::new(4));
        let accounts = AccountManager::new(store.clone(), hasher.clone());
        accounts
            .create_user(NewUser {
                username: "alice".into(),
                password: "secret123".into(),
                first_name: "Alice".into(),
                last_name: "Martin".into(),
                email: None,
                role: Role::Admin,
            })
            .await
            .unwrap();
        let auth = Authenticator::new(store, hasher, &AuthConfig::default());
        (auth, accounts)
    }

    #[tokio::test]
    async fn test_establish_from_success() {
        let (auth, _) = setup().await;
        let session = Session::establish(auth.login("alice", "secret123").await).unwrap();
        assert_eq!(session.identity().username, "alice");
        assert_eq!(session.created_at(), session.last_activity());
    }

    #[tokio::test]
    async fn test_establish_from_failure() {
        let (auth, _) = setup().await;
        let err = Session::establish(auth.login("alice", "nope").await).unwrap_err();
        assert_eq!(err, AuthFailure::BadCredential { remaining_attempts: 2 });
    }

    #[tokio::test]
    async fn test_update_profile_refreshes_identity() {
        let (auth, accounts) = setup().await;
        let mut session = Session::establish(auth.login("alice", "secret123").await).unwrap();

        let profile = session
            .update_profile(
                &accounts,
                &ProfileUpdate {
                    first_name: "Alicia".into(),
                    last_name: "Martin".into(),
                    email: Some("alicia@example.com".into()),
                },
            )
            .await
            .unwrap();

        assert_eq!(profile.email.as_deref(), Some("alicia@example.com"));
        assert_eq!(session.identity().first_name, "Alicia");

        let refreshed = session.refresh(&accounts).await.unwrap();
        assert_eq!(refreshed.identity, *session.identity());
        session.logout();
    }

    #[test]
    fn test_age() {
        let start = Utc::now();
        let session = Session::establish_at(
            AuthResult::Success(Identity {
                id: 1,
                username: "alice".into(),
                first_name: "Alice".into(),
                last_name: "Martin".into(),
                role: Role::Admin,
            }),
            start,
        )
        .unwrap();
        assert_eq!(
            session.age(start + chrono::Duration::minutes(3)),
            chrono::Duration::minutes(3)
        );
    }
}
