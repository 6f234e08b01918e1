//! Shopping cart entity.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bazaar_core::{CartId, ProductId, UserId};

/// A user's shopping cart.
///
/// Holds at most one entry per product; adding a product that is already
/// present increases its quantity instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
    pub items: Vec<CartItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One product line in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl Cart {
    /// An empty cart for `user_id` with the deterministic `cart-<userId>` ID.
    #[must_use]
    pub fn empty(user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: CartId::for_user(&user_id),
            user_id,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Position of the entry for `product_id`, if present.
    #[must_use]
    pub fn position(&self, product_id: &ProductId) -> Option<usize> {
        self.items
            .iter()
            .position(|item| &item.product_id == product_id)
    }

    /// Mutable access to the entry for `product_id`, if present.
    pub fn item_mut(&mut self, product_id: &ProductId) -> Option<&mut CartItem> {
        self.items
            .iter_mut()
            .find(|item| &item.product_id == product_id)
    }
}
