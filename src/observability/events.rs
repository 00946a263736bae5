//! Security Event Logging
//!
//! Structured audit records for authentication and account events. Every
//! record carries `security_event`, `category` and `severity` fields so the
//! log pipeline can filter them without parsing messages.
//!
//! # Usage
//!
//! ```ignore
//! use stockroom_auth::observability::SecurityEvent;
//!
//! stockroom_auth::security_event!(
//!     SecurityEvent::AccountLocked,
//!     username = %username,
//!     failed_count = 3,
//!     "Account locked due to failed login attempts"
//! );
//! ```

use std::fmt;

/// Security event categories for audit logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityEvent {
    // Authentication events
    /// Successful credential check
    AuthenticationSuccess,
    /// Failed credential check or blocked attempt
    AuthenticationFailure,
    /// Session established after an authorized login
    SessionCreated,
    /// Session ended by logout
    SessionDestroyed,

    // Authorization events
    /// Login authorized for the management interface
    AccessGranted,
    /// Authenticated account lacks the required role
    AccessDenied,

    // Account management events
    /// New account created
    UserRegistered,
    /// Account profile modified
    UserModified,
    /// Account removed
    UserDeleted,
    /// Stored credential replaced (legacy upgrade)
    PasswordChanged,

    // Lockout events
    /// Account locked after too many failures
    AccountLocked,
    /// Account unlocked by an administrator
    AccountUnlocked,

    // System events
    /// Database pool established
    DatabaseConnected,
    /// The user store failed during an operation
    StoreFailure,
}

impl SecurityEvent {
    /// Get the event category for filtering/grouping
    pub fn category(&self) -> &'static str {
        match self {
            Self::AuthenticationSuccess
            | Self::AuthenticationFailure
            | Self::SessionCreated
            | Self::SessionDestroyed => "authentication",

            Self::AccessGranted | Self::AccessDenied => "authorization",

            Self::UserRegistered
            | Self::UserModified
            | Self::UserDeleted
            | Self::PasswordChanged => "user_management",

            Self::AccountLocked | Self::AccountUnlocked => "security",

            Self::DatabaseConnected | Self::StoreFailure => "system",
        }
    }

    /// Get the severity level for the event
    pub fn severity(&self) -> Severity {
        match self {
            Self::StoreFailure => Severity::Critical,

            Self::AuthenticationFailure | Self::AccessDenied | Self::AccountLocked => Severity::High,

            Self::AuthenticationSuccess
            | Self::UserRegistered
            | Self::UserModified
            | Self::UserDeleted
            | Self::PasswordChanged
            | Self::AccountUnlocked => Severity::Medium,

            Self::AccessGranted
            | Self::SessionCreated
            | Self::SessionDestroyed
            | Self::DatabaseConnected => Severity::Low,
        }
    }

    /// Get the event name as a string
    pub fn name(&self) -> &'static str {
        match self {
            Self::AuthenticationSuccess => "authentication_success",
            Self::AuthenticationFailure => "authentication_failure",
            Self::SessionCreated => "session_created",
            Self::SessionDestroyed => "session_destroyed",
            Self::AccessGranted => "access_granted",
            Self::AccessDenied => "access_denied",
            Self::UserRegistered => "user_registered",
            Self::UserModified => "user_modified",
            Self::UserDeleted => "user_deleted",
            Self::PasswordChanged => "password_changed",
            Self::AccountLocked => "account_locked",
            Self::AccountUnlocked => "account_unlocked",
            Self::DatabaseConnected => "database_connected",
            Self::StoreFailure => "store_failure",
        }
    }
}

impl fmt::Display for SecurityEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Event severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Routine operations
    Low,
    /// Important state changes
    Medium,
    /// Security-relevant failures
    High,
    /// Immediate attention required
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// Log a security event with structured fields.
///
/// Dispatches to the tracing level matching the event severity and adds the
/// `security_event`, `category` and `severity` fields.
#[macro_export]
macro_rules! security_event {
    ($event:expr, $($field:tt)*) => {{
        let event = $event;
        let category = event.category();
        let event_name = event.name();

        match event.severity() {
            $crate::observability::Severity::Critical => {
                ::tracing::error!(
                    security_event = event_name,
                    category = category,
                    severity = "critical",
                    $($field)*
                );
            }
            $crate::observability::Severity::High => {
                ::tracing::warn!(
                    security_event = event_name,
                    category = category,
                    severity = "high",
                    $($field)*
                );
            }
            $crate::observability::Severity::Medium => {
                ::tracing::info!(
                    security_event = event_name,
                    category = category,
                    severity = "medium",
                    $($field)*
                );
            }
            $crate::observability::Severity::Low => {
                ::tracing::debug!(
                    security_event = event_name,
                    category = category,
                    severity = "low",
                    $($field)*
                );
            }
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_categories() {
        assert_eq!(SecurityEvent::AuthenticationFailure.category(), "authentication");
        assert_eq!(SecurityEvent::AccessDenied.category(), "authorization");
        assert_eq!(SecurityEvent::UserRegistered.category(), "user_management");
        assert_eq!(SecurityEvent::UserDeleted.category(), "user_management");
        assert_eq!(SecurityEvent::AccountLocked.category(), "security");
        assert_eq!(SecurityEvent::StoreFailure.category(), "system");
    }

    #[test]
    fn test_event_severity() {
        assert_eq!(SecurityEvent::StoreFailure.severity(), Severity::Critical);
        assert_eq!(SecurityEvent::AccountLocked.severity(), Severity::High);
        assert_eq!(SecurityEvent::AccountUnlocked.severity(), Severity::Medium);
        assert_eq!(SecurityEvent::UserDeleted.severity(), Severity::Medium);
        assert_eq!(SecurityEvent::SessionCreated.severity(), Severity::Low);
        assert!(Severity::Medium < Severity::High);
    }

    #[test]
    fn test_macro_expands_for_every_level() {
        for event in [
            SecurityEvent::StoreFailure,
            SecurityEvent::AccessDenied,
            SecurityEvent::UserModified,
            SecurityEvent::SessionDestroyed,
        ] {
            crate::security_event!(event, username = "alice", "test event");
        }
    }
}
