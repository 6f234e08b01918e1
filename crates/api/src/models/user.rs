//! User entity.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bazaar_core::{Address, Email, UserId};

/// A customer account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub address: Option<Address>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
