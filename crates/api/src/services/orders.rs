//! Order workflow.
//!
//! Order creation and cancellation touch products, orders and carts through
//! independent store calls:
//!
//! 1. **create** reserves stock item by item, in request order. A failure at
//!    item N leaves items `1..N` reserved and creates no order.
//! 2. **cancel** switches the order to `cancelled` atomically, then returns
//!    stock item by item, skipping products that have since been deleted.
//!
//! Status changes follow [`OrderStatus::transition_to`].

use chrono::Utc;
use thiserror::Error;

use bazaar_core::{
    Address, OrderId, OrderStatus, Price, ProductId, StatusTransitionError, UserId,
};

use crate::models::{Order, OrderItem};
use crate::store::{MemoryStore, StockError};

/// One requested line of a new order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Errors from the order workflow.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrderError {
    #[error("User not found")]
    UserNotFound(UserId),

    #[error("Order not found")]
    OrderNotFound(OrderId),

    #[error("Product {0} not found")]
    ProductNotFound(ProductId),

    #[error("No items in order")]
    EmptyOrder,

    #[error("Quantity for product {0} must be at least 1")]
    InvalidQuantity(ProductId),

    #[error("Insufficient stock for product {product_name}")]
    InsufficientStock {
        product_id: ProductId,
        product_name: String,
        available: u32,
        requested: u32,
    },

    #[error("Order total is too large")]
    TotalOverflow,

    #[error("Cannot cancel order with status {0}")]
    NotCancellable(OrderStatus),

    #[error("Cannot transition from {} to {}", .0.from, .0.to)]
    InvalidTransition(#[from] StatusTransitionError),
}

impl From<StockError> for OrderError {
    fn from(err: StockError) -> Self {
        match err {
            StockError::ProductNotFound(id) => Self::ProductNotFound(id),
            StockError::Insufficient {
                product_id,
                product_name,
                available,
                requested,
            } => Self::InsufficientStock {
                product_id,
                product_name,
                available,
                requested,
            },
        }
    }
}

/// Order workflow over a [`MemoryStore`].
pub struct OrderService<'a> {
    store: &'a MemoryStore,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(store: &'a MemoryStore) -> Self {
        Self { store }
    }

    /// Place an order for `user_id` from an explicit item list.
    ///
    /// Stock is taken per item as it is processed. On success the order is
    /// stored as `pending` with frozen price and name snapshots, and the
    /// user's cart is emptied.
    ///
    /// # Errors
    ///
    /// - `OrderError::UserNotFound` if the user does not exist
    /// - `OrderError::EmptyOrder` if `lines` is empty
    /// - `OrderError::InvalidQuantity` if any quantity is zero
    /// - `OrderError::ProductNotFound` / `OrderError::InsufficientStock` for
    ///   the first item that cannot be fulfilled; earlier items stay reserved
    /// - `OrderError::TotalOverflow` if the total does not fit a [`Price`];
    ///   the overflowing item's stock is returned, earlier items stay reserved
    pub fn create(
        &self,
        user_id: &UserId,
        lines: &[OrderLine],
        shipping_address: Address,
    ) -> Result<Order, OrderError> {
        if self.store.user(user_id).is_none() {
            return Err(OrderError::UserNotFound(user_id.clone()));
        }
        if lines.is_empty() {
            return Err(OrderError::EmptyOrder);
        }
        if let Some(line) = lines.iter().find(|line| line.quantity == 0) {
            return Err(OrderError::InvalidQuantity(line.product_id.clone()));
        }

        let mut items = Vec::with_capacity(lines.len());
        let mut total_amount = Price::ZERO;
        for line in lines {
            let product = self
                .store
                .reserve_stock(&line.product_id, line.quantity)
                .inspect_err(|err| {
                    tracing::warn!(
                        user_id = %user_id,
                        reserved_items = items.len(),
                        error = %err,
                        "Order creation aborted after partial stock reservation"
                    );
                })?;

            let Some(total) = product
                .price
                .checked_times(line.quantity)
                .and_then(|line_total| total_amount.checked_add(line_total))
            else {
                self.store.release_stock(&product.id, line.quantity);
                tracing::warn!(
                    user_id = %user_id,
                    product_id = %product.id,
                    reserved_items = items.len(),
                    "Order total overflowed"
                );
                return Err(OrderError::TotalOverflow);
            };
            total_amount = total;

            items.push(OrderItem {
                product_id: product.id,
                quantity: line.quantity,
                price: product.price,
                product_name: product.name,
            });
        }

        let now = Utc::now();
        let order = self.store.create_order(Order {
            id: OrderId::generate(),
            user_id: user_id.clone(),
            items,
            total_amount,
            status: OrderStatus::Pending,
            shipping_address,
            created_at: now,
            updated_at: now,
        });

        self.store.clear_cart(user_id);

        tracing::info!(
            order_id = %order.id,
            user_id = %user_id,
            total = %order.total_amount,
            items = order.items.len(),
            "Order created"
        );
        Ok(order)
    }

    /// Cancel a `pending` or `processing` order and return its stock.
    ///
    /// # Errors
    ///
    /// - `OrderError::OrderNotFound` if the order does not exist
    /// - `OrderError::NotCancellable` if it has shipped, been delivered, or
    ///   is already cancelled; stock is untouched
    pub fn cancel(&self, order_id: &OrderId) -> Result<Order, OrderError> {
        let order = self
            .store
            .modify_order(order_id, |order| {
                if !order.status.is_cancellable() {
                    return Err(OrderError::NotCancellable(order.status));
                }
                order.status = OrderStatus::Cancelled;
                order.updated_at = Utc::now();
                Ok(())
            })
            .ok_or_else(|| OrderError::OrderNotFound(order_id.clone()))??;

        for item in &order.items {
            if self
                .store
                .release_stock(&item.product_id, item.quantity)
                .is_none()
            {
                tracing::warn!(
                    order_id = %order.id,
                    product_id = %item.product_id,
                    quantity = item.quantity,
                    "Skipped stock restoration for deleted product"
                );
            }
        }

        tracing::info!(order_id = %order.id, "Order cancelled");
        Ok(order)
    }

    /// Move an order to `next` if the transition table allows it.
    ///
    /// A move to `cancelled` goes through [`Self::cancel`] so that stock is
    /// returned.
    ///
    /// # Errors
    ///
    /// - `OrderError::OrderNotFound` if the order does not exist
    /// - `OrderError::InvalidTransition` naming both statuses; the order is
    ///   not modified
    pub fn update_status(&self, order_id: &OrderId, next: OrderStatus) -> Result<Order, OrderError> {
        if next == OrderStatus::Cancelled {
            return self.cancel(order_id).map_err(|err| match err {
                OrderError::NotCancellable(from) => {
                    OrderError::InvalidTransition(StatusTransitionError { from, to: next })
                }
                other => other,
            });
        }

        let order = self
            .store
            .modify_order(order_id, |order| {
                order.status = order.status.transition_to(next)?;
                order.updated_at = Utc::now();
                Ok::<_, OrderError>(())
            })
            .ok_or_else(|| OrderError::OrderNotFound(order_id.clone()))??;

        tracing::info!(order_id = %order.id, status = %order.status, "Order status changed");
        Ok(order)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rust_decimal::Decimal;

    use bazaar_core::{CategoryId, Email};

    use super::*;
    use crate::models::{CartItem, Product, User};

    fn address() -> Address {
        Address {
            street: "123 Test St".to_owned(),
            city: "Test City".to_owned(),
            state: "TC".to_owned(),
            postal_code: "12345".to_owned(),
            country: "USA".to_owned(),
        }
    }

    /// A store with user `u1` and products `p20` (20.00, stock 10) and
    /// `p30` (30.00, stock 5).
    fn fixture() -> MemoryStore {
        let store = MemoryStore::new();
        let now = Utc::now();
        store.create_user(User {
            id: UserId::new("u1"),
            email: Email::parse("u1@example.com").unwrap(),
            name: "User One".to_owned(),
            address: None,
            created_at: now,
            updated_at: now,
        });
        for (id, cents, stock) in [("p20", 2000, 10), ("p30", 3000, 5)] {
            store.create_product(Product {
                id: ProductId::new(id),
                name: format!("Product {id}"),
                description: String::new(),
                price: Price::new(Decimal::new(cents, 2)).unwrap(),
                stock,
                category_id: CategoryId::new("cat"),
                image_urls: Vec::new(),
                created_at: now,
                updated_at: now,
            });
        }
        store
    }

    fn line(product: &str, quantity: u32) -> OrderLine {
        OrderLine {
            product_id: ProductId::new(product),
            quantity,
        }
    }

    fn stock(store: &MemoryStore, id: &str) -> u32 {
        store.product(&ProductId::new(id)).unwrap().stock
    }

    fn place(store: &MemoryStore) -> Order {
        OrderService::new(store)
            .create(
                &UserId::new("u1"),
                &[line("p20", 2), line("p30", 1)],
                address(),
            )
            .unwrap()
    }

    #[test]
    fn test_create_computes_total_and_decrements_stock() {
        let store = fixture();
        let order = place(&store);

        assert_eq!(order.total_amount.to_string(), "70.00");
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].product_name, "Product p20");
        assert_eq!(order.items[0].price.to_string(), "20.00");
        assert_eq!(stock(&store, "p20"), 8);
        assert_eq!(stock(&store, "p30"), 4);
        assert_eq!(store.order(&order.id).unwrap(), order);
    }

    #[test]
    fn test_create_clears_cart() {
        let store = fixture();
        let user_id = UserId::new("u1");
        store
            .modify_cart(&user_id, |cart| {
                cart.items.push(CartItem {
                    product_id: ProductId::new("p20"),
                    quantity: 1,
                });
                Ok::<_, ()>(())
            })
            .unwrap();

        place(&store);
        assert!(store.cart_by_user(&user_id).items.is_empty());
    }

    #[test]
    fn test_snapshot_survives_price_change() {
        let store = fixture();
        let order = place(&store);

        let mut product = store.product(&ProductId::new("p20")).unwrap();
        product.price = Price::new(Decimal::new(99_900, 2)).unwrap();
        product.name = "Renamed".to_owned();
        store.update_product(product);

        let stored = store.order(&order.id).unwrap();
        assert_eq!(stored.items[0].price.to_string(), "20.00");
        assert_eq!(stored.items[0].product_name, "Product p20");
        assert_eq!(stored.total_amount.to_string(), "70.00");
    }

    #[test]
    fn test_create_unknown_user() {
        let store = fixture();
        let err = OrderService::new(&store)
            .create(&UserId::new("ghost"), &[line("p20", 1)], address())
            .unwrap_err();
        assert_eq!(err, OrderError::UserNotFound(UserId::new("ghost")));
        assert_eq!(stock(&store, "p20"), 10);
    }

    #[test]
    fn test_create_empty_items() {
        let store = fixture();
        let err = OrderService::new(&store)
            .create(&UserId::new("u1"), &[], address())
            .unwrap_err();
        assert_eq!(err, OrderError::EmptyOrder);
    }

    #[test]
    fn test_create_zero_quantity_touches_nothing() {
        let store = fixture();
        let err = OrderService::new(&store)
            .create(
                &UserId::new("u1"),
                &[line("p20", 1), line("p30", 0)],
                address(),
            )
            .unwrap_err();
        assert_eq!(err, OrderError::InvalidQuantity(ProductId::new("p30")));
        assert_eq!(stock(&store, "p20"), 10);
    }

    #[test]
    fn test_partial_failure_keeps_earlier_reservations() {
        let store = fixture();
        let err = OrderService::new(&store)
            .create(
                &UserId::new("u1"),
                &[line("p20", 3), line("p30", 6)],
                address(),
            )
            .unwrap_err();

        assert!(matches!(
            err,
            OrderError::InsufficientStock {
                available: 5,
                requested: 6,
                ..
            }
        ));
        assert_eq!(stock(&store, "p20"), 7);
        assert_eq!(stock(&store, "p30"), 5);
        assert!(store.orders().is_empty());
    }

    #[test]
    fn test_total_overflow_returns_the_item_stock() {
        let store = fixture();
        let now = Utc::now();
        store.create_product(Product {
            id: ProductId::new("huge"),
            name: "Huge".to_owned(),
            description: String::new(),
            price: Price::new(Decimal::MAX).unwrap(),
            stock: 10,
            category_id: CategoryId::new("cat"),
            image_urls: Vec::new(),
            created_at: now,
            updated_at: now,
        });

        let err = OrderService::new(&store)
            .create(
                &UserId::new("u1"),
                &[line("p20", 1), line("huge", 2)],
                address(),
            )
            .unwrap_err();

        assert_eq!(err, OrderError::TotalOverflow);
        assert_eq!(stock(&store, "huge"), 10);
        assert_eq!(stock(&store, "p20"), 9);
        assert!(store.orders().is_empty());
    }

    #[test]
    fn test_create_missing_product() {
        let store = fixture();
        let err = OrderService::new(&store)
            .create(&UserId::new("u1"), &[line("nope", 1)], address())
            .unwrap_err();
        assert_eq!(err.to_string(), "Product nope not found");
    }

    #[test]
    fn test_cancel_restores_stock() {
        let store = fixture();
        let order = place(&store);

        let cancelled = OrderService::new(&store).cancel(&order.id).unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(stock(&store, "p20"), 10);
        assert_eq!(stock(&store, "p30"), 5);
    }

    #[test]
    fn test_cancel_processing_order() {
        let store = fixture();
        let order = place(&store);
        let service = OrderService::new(&store);

        service
            .update_status(&order.id, OrderStatus::Processing)
            .unwrap();
        assert!(service.cancel(&order.id).is_ok());
        assert_eq!(stock(&store, "p20"), 10);
    }

    #[test]
    fn test_cancel_shipped_order_fails_without_touching_stock() {
        let store = fixture();
        let order = place(&store);
        let service = OrderService::new(&store);

        service
            .update_status(&order.id, OrderStatus::Processing)
            .unwrap();
        service.update_status(&order.id, OrderStatus::Shipped).unwrap();

        let err = service.cancel(&order.id).unwrap_err();
        assert_eq!(err, OrderError::NotCancellable(OrderStatus::Shipped));
        assert_eq!(err.to_string(), "Cannot cancel order with status shipped");
        assert_eq!(stock(&store, "p20"), 8);
        assert_eq!(
            store.order(&order.id).unwrap().status,
            OrderStatus::Shipped
        );
    }

    #[test]
    fn test_cancel_twice_restores_once() {
        let store = fixture();
        let order = place(&store);
        let service = OrderService::new(&store);

        service.cancel(&order.id).unwrap();
        assert!(service.cancel(&order.id).is_err());
        assert_eq!(stock(&store, "p20"), 10);
    }

    #[test]
    fn test_cancel_skips_deleted_product() {
        let store = fixture();
        let order = place(&store);
        store.delete_product(&ProductId::new("p20"));

        let cancelled = OrderService::new(&store).cancel(&order.id).unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(stock(&store, "p30"), 5);
    }

    #[test]
    fn test_cancel_missing_order() {
        let store = fixture();
        let err = OrderService::new(&store)
            .cancel(&OrderId::new("missing"))
            .unwrap_err();
        assert_eq!(err, OrderError::OrderNotFound(OrderId::new("missing")));
    }

    #[test]
    fn test_status_happy_path() {
        let store = fixture();
        let order = place(&store);
        let service = OrderService::new(&store);

        for next in [
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ] {
            let updated = service.update_status(&order.id, next).unwrap();
            assert_eq!(updated.status, next);
        }
    }

    #[test]
    fn test_status_skip_is_rejected() {
        let store = fixture();
        let order = place(&store);

        let err = OrderService::new(&store)
            .update_status(&order.id, OrderStatus::Delivered)
            .unwrap_err();
        assert_eq!(err.to_string(), "Cannot transition from pending to delivered");
        assert_eq!(
            store.order(&order.id).unwrap().status,
            OrderStatus::Pending
        );
    }

    #[test]
    fn test_status_to_cancelled_restores_stock() {
        let store = fixture();
        let order = place(&store);

        OrderService::new(&store)
            .update_status(&order.id, OrderStatus::Cancelled)
            .unwrap();
        assert_eq!(stock(&store, "p20"), 10);
    }

    #[test]
    fn test_status_from_delivered_to_cancelled_is_a_transition_error() {
        let store = fixture();
        let order = place(&store);
        let service = OrderService::new(&store);
        for next in [
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ] {
            service.update_status(&order.id, next).unwrap();
        }

        let err = service
            .update_status(&order.id, OrderStatus::Cancelled)
            .unwrap_err();
        assert!(matches!(err, OrderError::InvalidTransition(_)));
    }
}
