//! Postal address.

use serde::{Deserialize, Serialize};

/// A postal address, used both on user profiles and as the shipping snapshot
/// copied onto an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}
