//! Authentication store.
//!
//! Maps a fixed credential table to bearer-token sessions. Sessions live in a
//! concurrent cache so that token validation on every protected request does
//! not contend on a single lock.
//!
//! Expiry is absolute: a session is valid until `issued + ttl` regardless of
//! use. It is enforced lazily at validation time; the cache's own time-to-live
//! and [`AuthStore::cleanup_expired`] only reclaim memory.

mod error;

pub use error::AuthError;

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use moka::sync::Cache;
use secrecy::{ExposeSecret, SecretString};
use uuid::Uuid;

use bazaar_core::UserId;

use crate::models::{AuthSession, AuthUser};
use crate::store::seed::{ALICE_ID, BOB_ID};

/// One row of the credential table.
#[derive(Debug, Clone)]
struct Credential {
    password: SecretString,
    user: AuthUser,
}

/// Credential table plus live sessions.
#[derive(Debug)]
pub struct AuthStore {
    credentials: HashMap<String, Credential>,
    sessions: Cache<String, AuthSession>,
    ttl_secs: u32,
}

impl AuthStore {
    /// Create a store with an empty credential table.
    #[must_use]
    pub fn new(ttl_secs: u32) -> Self {
        let sessions = Cache::builder()
            .time_to_live(Duration::from_secs(u64::from(ttl_secs.max(1))))
            .build();

        Self {
            credentials: HashMap::new(),
            sessions,
            ttl_secs,
        }
    }

    /// Create a store with the two demo accounts:
    /// `alice@example.com` / `password123` and `bob@example.com` / `password456`.
    #[must_use]
    pub fn with_demo_credentials(ttl_secs: u32) -> Self {
        Self::new(ttl_secs)
            .with_credential(
                "alice@example.com",
                "password123",
                UserId::new(ALICE_ID),
                "Alice Johnson",
            )
            .with_credential(
                "bob@example.com",
                "password456",
                UserId::new(BOB_ID),
                "Bob Smith",
            )
    }

    /// Add an account to the credential table.
    #[must_use]
    pub fn with_credential(
        mut self,
        email: &str,
        password: &str,
        user_id: UserId,
        name: &str,
    ) -> Self {
        self.credentials.insert(
            email.to_owned(),
            Credential {
                password: SecretString::from(password.to_owned()),
                user: AuthUser {
                    id: user_id,
                    email: email.to_owned(),
                    name: name.to_owned(),
                },
            },
        );
        self
    }

    /// Session lifetime in seconds, reported to clients as `expiresIn`.
    #[must_use]
    pub const fn session_ttl_secs(&self) -> u32 {
        self.ttl_secs
    }

    // =========================================================================
    // Sessions
    // =========================================================================

    /// Log in with an exact email/password match and start a new session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email is unknown or the
    /// password does not match.
    pub fn login(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let Some(credential) = self
            .credentials
            .get(email)
            .filter(|c| c.password.expose_secret() == password)
        else {
            tracing::warn!(email = %email, "Login failed");
            return Err(AuthError::InvalidCredentials);
        };

        let session = AuthSession {
            token: Uuid::new_v4().to_string(),
            user: credential.user.clone(),
            expires_at: Utc::now() + TimeDelta::seconds(i64::from(self.ttl_secs)),
        };
        self.sessions
            .insert(session.token.clone(), session.clone());

        tracing::info!(user_id = %session.user.id, "User logged in");
        Ok(session)
    }

    /// End a session. Unknown tokens are ignored.
    pub fn logout(&self, token: &str) {
        self.sessions.invalidate(token);
    }

    /// Resolve a token to its session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SessionNotFound` if the token is unknown or expired.
    pub fn validate_token(&self, token: &str) -> Result<AuthSession, AuthError> {
        self.validate_at(token, Utc::now())
    }

    /// Resolve a token to its session as of `now`. An expired session is
    /// removed.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SessionNotFound` if the token is unknown or expired.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<AuthSession, AuthError> {
        let session = self
            .sessions
            .get(token)
            .ok_or(AuthError::SessionNotFound)?;

        if session.is_expired_at(now) {
            self.sessions.invalidate(token);
            return Err(AuthError::SessionNotFound);
        }

        Ok(session)
    }

    /// Remove every session that has expired. Returns how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        self.cleanup_expired_at(Utc::now())
    }

    /// Remove every session expired as of `now`.
    pub fn cleanup_expired_at(&self, now: DateTime<Utc>) -> usize {
        let expired: Vec<String> = self
            .sessions
            .iter()
            .filter(|(_, session)| session.is_expired_at(now))
            .map(|(token, _)| token.as_ref().clone())
            .collect();

        for token in &expired {
            self.sessions.invalidate(token);
        }
        self.sessions.run_pending_tasks();

        expired.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const TTL: u32 = 86_400;

    fn store() -> AuthStore {
        AuthStore::with_demo_credentials(TTL)
    }

    #[test]
    fn test_login_success() {
        let auth = store();
        let session = auth.login("alice@example.com", "password123").unwrap();

        assert_eq!(session.user.id.as_str(), ALICE_ID);
        assert_eq!(session.user.name, "Alice Johnson");
        assert!(!session.token.is_empty());

        let remaining = session.expires_at - Utc::now();
        assert!(remaining <= TimeDelta::seconds(i64::from(TTL)));
        assert!(remaining > TimeDelta::seconds(i64::from(TTL) - 60));
    }

    #[test]
    fn test_login_failures_are_indistinguishable() {
        let auth = store();
        assert_eq!(
            auth.login("alice@example.com", "wrong").unwrap_err(),
            AuthError::InvalidCredentials
        );
        assert_eq!(
            auth.login("nobody@example.com", "password123").unwrap_err(),
            AuthError::InvalidCredentials
        );
    }

    #[test]
    fn test_login_is_exact_match() {
        let auth = store();
        assert!(auth.login("Alice@example.com", "password123").is_err());
        assert!(auth.login("alice@example.com", "password123 ").is_err());
    }

    #[test]
    fn test_each_login_gets_a_new_token() {
        let auth = store();
        let a = auth.login("bob@example.com", "password456").unwrap();
        let b = auth.login("bob@example.com", "password456").unwrap();
        assert_ne!(a.token, b.token);
        assert!(auth.validate_token(&a.token).is_ok());
        assert!(auth.validate_token(&b.token).is_ok());
    }

    #[test]
    fn test_validate_and_logout() {
        let auth = store();
        let session = auth.login("alice@example.com", "password123").unwrap();

        let validated = auth.validate_token(&session.token).unwrap();
        assert_eq!(validated.user, session.user);

        auth.logout(&session.token);
        assert_eq!(
            auth.validate_token(&session.token).unwrap_err(),
            AuthError::SessionNotFound
        );
    }

    #[test]
    fn test_logout_unknown_token_is_noop() {
        let auth = store();
        auth.logout("never-issued");
        auth.logout("never-issued");
    }

    #[test]
    fn test_expired_session_is_rejected_and_removed() {
        let auth = store();
        let session = auth.login("alice@example.com", "password123").unwrap();
        let later = session.expires_at + TimeDelta::seconds(1);

        assert_eq!(
            auth.validate_at(&session.token, later).unwrap_err(),
            AuthError::SessionNotFound
        );
        // removed, so even a validation "in the past" now fails
        assert!(auth.validate_at(&session.token, Utc::now()).is_err());
    }

    #[test]
    fn test_exact_expiry_instant_is_still_valid() {
        let auth = store();
        let session = auth.login("alice@example.com", "password123").unwrap();
        assert!(auth.validate_at(&session.token, session.expires_at).is_ok());
    }

    #[test]
    fn test_cleanup_expired() {
        let auth = store();
        let a = auth.login("alice@example.com", "password123").unwrap();
        let b = auth.login("bob@example.com", "password456").unwrap();

        assert_eq!(auth.cleanup_expired(), 0);

        let later = a.expires_at.max(b.expires_at) + TimeDelta::seconds(1);
        assert_eq!(auth.cleanup_expired_at(later), 2);
        assert!(auth.validate_token(&a.token).is_err());
        assert!(auth.validate_token(&b.token).is_err());
    }

    #[test]
    fn test_password_not_in_debug_output() {
        let auth = store();
        let debug = format!("{auth:?}");
        assert!(!debug.contains("password123"));
    }
}
