//! Order entity.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bazaar_core::{Address, OrderId, OrderStatus, Price, ProductId, UserId};

/// A placed order.
///
/// Items, total and shipping address are snapshots taken at creation time
/// and never change afterwards; only `status` and `updated_at` do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub total_amount: Price,
    pub status: OrderStatus,
    pub shipping_address: Address,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One ordered product with its name and unit price frozen at order time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Price,
    pub product_name: String,
}
