//! Cart operations.
//!
//! Carts are keyed by user and materialized on first write. Stock is checked
//! when items are added or changed but not reserved; reservation happens at
//! order time.

use chrono::Utc;
use thiserror::Error;

use bazaar_core::{ProductId, UserId};

use crate::models::{Cart, CartItem};
use crate::store::MemoryStore;

/// Errors from cart operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CartError {
    #[error("Product not found")]
    ProductNotFound(ProductId),

    #[error("Item not found in cart")]
    ItemNotFound(ProductId),

    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    #[error("Insufficient stock")]
    InsufficientStock {
        product_id: ProductId,
        available: u32,
        requested: u32,
    },
}

/// Cart operations over a [`MemoryStore`].
pub struct CartService<'a> {
    store: &'a MemoryStore,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(store: &'a MemoryStore) -> Self {
        Self { store }
    }

    /// The user's cart, synthesized empty if none has been stored.
    #[must_use]
    pub fn get(&self, user_id: &UserId) -> Cart {
        self.store.cart_by_user(user_id)
    }

    /// Add `quantity` units of a product. An existing entry for the product
    /// has its quantity increased.
    ///
    /// Only `quantity` itself is checked against stock, not the resulting
    /// total in the cart.
    ///
    /// # Errors
    ///
    /// - `CartError::InvalidQuantity` if `quantity` is zero
    /// - `CartError::ProductNotFound` if the product does not exist
    /// - `CartError::InsufficientStock` if stock is below `quantity`
    pub fn add_item(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Cart, CartError> {
        self.check_stock(product_id, quantity)?;

        self.store.modify_cart(user_id, |cart| {
            match cart.item_mut(product_id) {
                Some(item) => item.quantity = item.quantity.saturating_add(quantity),
                None => cart.items.push(CartItem {
                    product_id: product_id.clone(),
                    quantity,
                }),
            }
            cart.updated_at = Utc::now();
            Ok(())
        })
    }

    /// Set the quantity of a product already in the cart.
    ///
    /// # Errors
    ///
    /// - `CartError::InvalidQuantity` if `quantity` is zero
    /// - `CartError::ProductNotFound` if the product does not exist
    /// - `CartError::ItemNotFound` if the product is not in the cart
    /// - `CartError::InsufficientStock` if stock is below `quantity`
    pub fn update_item(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Cart, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        let product = self
            .store
            .product(product_id)
            .ok_or_else(|| CartError::ProductNotFound(product_id.clone()))?;

        self.store.modify_cart(user_id, |cart| {
            let item = cart
                .item_mut(product_id)
                .ok_or_else(|| CartError::ItemNotFound(product_id.clone()))?;

            if product.stock < quantity {
                return Err(CartError::InsufficientStock {
                    product_id: product_id.clone(),
                    available: product.stock,
                    requested: quantity,
                });
            }

            item.quantity = quantity;
            cart.updated_at = Utc::now();
            Ok(())
        })
    }

    /// Remove a product from the cart, keeping the order of the rest.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if the product is not in the cart.
    pub fn remove_item(&self, user_id: &UserId, product_id: &ProductId) -> Result<Cart, CartError> {
        self.store.modify_cart(user_id, |cart| {
            let index = cart
                .position(product_id)
                .ok_or_else(|| CartError::ItemNotFound(product_id.clone()))?;
            cart.items.remove(index);
            cart.updated_at = Utc::now();
            Ok(())
        })
    }

    /// Empty the cart.
    pub fn clear(&self, user_id: &UserId) -> Cart {
        self.store.clear_cart(user_id)
    }

    fn check_stock(&self, product_id: &ProductId, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        let product = self
            .store
            .product(product_id)
            .ok_or_else(|| CartError::ProductNotFound(product_id.clone()))?;

        if product.stock < quantity {
            return Err(CartError::InsufficientStock {
                product_id: product_id.clone(),
                available: product.stock,
                requested: quantity,
            });
        }
        Ok(())
    }
}
