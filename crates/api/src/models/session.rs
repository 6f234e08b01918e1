//! Authentication session types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bazaar_core::UserId;

/// Identity attached to an authenticated request.
///
/// A snapshot taken from the credential table at login time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthUser {
    pub id: UserId,
    pub email: String,
    pub name: String,
}

/// A bearer token bound to a user until `expires_at`.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub user: AuthUser,
    pub expires_at: DateTime<Utc>,
}

impl AuthSession {
    /// Whether the session has expired as of `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
