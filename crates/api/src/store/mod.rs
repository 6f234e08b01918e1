//! In-memory data store.
//!
//! Holds every entity in keyed maps behind a single reader/writer lock.
//! Reads run concurrently; every mutation takes the write lock. Each method
//! acquires and releases the lock on its own, so multi-step workflows (see
//! [`crate::services::orders`]) are sequences of independent calls, not
//! transactions.
//!
//! A few operations do more than one step under one lock because callers
//! depend on it:
//! - [`MemoryStore::reserve_stock`] checks and decrements stock atomically,
//!   so concurrent orders cannot both pass the check and over-sell.
//! - [`MemoryStore::modify_order`] / [`MemoryStore::modify_cart`] apply a
//!   validated read-modify-write without a lost update in between.
//! - [`MemoryStore::update_category_checked`] validates a new parent link and
//!   writes it, so concurrent moves cannot form a cycle.
//!
//! # Collections
//!
//! - products, categories, users, orders - keyed by their ID
//! - carts - keyed by owning user ID
//!
//! List methods return entities in creation order.

pub mod seed;

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use thiserror::Error;

use bazaar_core::{CategoryId, OrderId, ProductId, UserId};

use crate::models::{Cart, Category, Order, Product, User};

/// Failure to take stock from a product.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StockError {
    /// The product does not exist.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// The product exists but has fewer units than requested.
    #[error("insufficient stock for product {product_name}: {available} available, {requested} requested")]
    Insufficient {
        product_id: ProductId,
        product_name: String,
        available: u32,
        requested: u32,
    },
}

/// A rejected parent link for a category.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParentError {
    #[error("parent category {0} not found")]
    NotFound(CategoryId),

    /// The parent is the category itself or one of its descendants.
    #[error("category {0} would become its own ancestor")]
    Cycle(CategoryId),
}

/// In-memory store for all domain entities.
///
/// Shared between handlers as `Arc<MemoryStore>` inside the application
/// state.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    products: HashMap<ProductId, Product>,
    categories: HashMap<CategoryId, Category>,
    users: HashMap<UserId, User>,
    carts: HashMap<UserId, Cart>,
    orders: HashMap<OrderId, Order>,
}

/// Whether `parent` is `id` itself or one of its descendants.
fn closes_cycle(
    categories: &HashMap<CategoryId, Category>,
    id: &CategoryId,
    parent: &CategoryId,
) -> bool {
    let mut seen = HashSet::new();
    let mut cursor = Some(parent);

    while let Some(current) = cursor {
        if current == id {
            return true;
        }
        if !seen.insert(current) {
            // pre-existing loop that does not involve `id`
            return false;
        }
        cursor = categories.get(current).and_then(|c| c.parent_id.as_ref());
    }
    false
}

/// Collect map values sorted by creation time, ties broken by key.
fn in_creation_order<K: Ord, V: Clone>(
    map: &HashMap<K, V>,
    created_at: impl Fn(&V) -> DateTime<Utc>,
) -> Vec<V> {
    let mut entries: Vec<(&K, &V)> = map.iter().collect();
    entries.sort_by(|(ka, va), (kb, vb)| created_at(va).cmp(&created_at(vb)).then(ka.cmp(kb)));
    entries.into_iter().map(|(_, v)| v.clone()).collect()
}

/// Replace an existing entry, returning the stored value, or `None` when the
/// key is absent.
fn replace<K: std::hash::Hash + Eq, V: Clone>(
    map: &mut HashMap<K, V>,
    key: &K,
    value: V,
) -> Option<V> {
    let slot = map.get_mut(key)?;
    *slot = value;
    Some(slot.clone())
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// All products in creation order.
    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        in_creation_order(&self.tables.read().products, |p| p.created_at)
    }

    /// Look up a product by ID.
    #[must_use]
    pub fn product(&self, id: &ProductId) -> Option<Product> {
        self.tables.read().products.get(id).cloned()
    }

    /// Insert a fully formed product.
    pub fn create_product(&self, product: Product) -> Product {
        self.tables
            .write()
            .products
            .insert(product.id.clone(), product.clone());
        product
    }

    /// Replace an existing product. Returns `None` if it no longer exists.
    pub fn update_product(&self, product: Product) -> Option<Product> {
        let id = product.id.clone();
        replace(&mut self.tables.write().products, &id, product)
    }

    /// Remove a product, returning it.
    pub fn delete_product(&self, id: &ProductId) -> Option<Product> {
        self.tables.write().products.remove(id)
    }

    /// Atomically check and decrement a product's stock.
    ///
    /// Returns the product as it is after the decrement.
    ///
    /// # Errors
    ///
    /// Returns [`StockError::ProductNotFound`] if the product is missing and
    /// [`StockError::Insufficient`] if it has fewer than `quantity` units.
    /// Stock is unchanged on error.
    pub fn reserve_stock(&self, id: &ProductId, quantity: u32) -> Result<Product, StockError> {
        let mut tables = self.tables.write();
        let product = tables
            .products
            .get_mut(id)
            .ok_or_else(|| StockError::ProductNotFound(id.clone()))?;

        if product.stock < quantity {
            return Err(StockError::Insufficient {
                product_id: id.clone(),
                product_name: product.name.clone(),
                available: product.stock,
                requested: quantity,
            });
        }

        product.stock -= quantity;
        product.updated_at = Utc::now();
        Ok(product.clone())
    }

    /// Return units to a product's stock.
    ///
    /// Returns `None` (and does nothing) if the product has been deleted.
    pub fn release_stock(&self, id: &ProductId, quantity: u32) -> Option<Product> {
        let mut tables = self.tables.write();
        let product = tables.products.get_mut(id)?;
        product.stock = product.stock.saturating_add(quantity);
        product.updated_at = Utc::now();
        Some(product.clone())
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// All categories in creation order.
    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        in_creation_order(&self.tables.read().categories, |c| c.created_at)
    }

    /// Look up a category by ID.
    #[must_use]
    pub fn category(&self, id: &CategoryId) -> Option<Category> {
        self.tables.read().categories.get(id).cloned()
    }

    /// Insert a fully formed category.
    pub fn create_category(&self, category: Category) -> Category {
        self.tables
            .write()
            .categories
            .insert(category.id.clone(), category.clone());
        category
    }

    /// Remove a category, returning it. Children and products keep their
    /// (now dangling) references.
    pub fn delete_category(&self, id: &CategoryId) -> Option<Category> {
        self.tables.write().categories.remove(id)
    }

    /// Replace an existing category. A changed parent link is checked under
    /// the same write lock, so concurrent moves cannot close a cycle.
    ///
    /// Returns `None` if the category no longer exists.
    pub fn update_category_checked(
        &self,
        category: Category,
    ) -> Option<Result<Category, ParentError>> {
        let mut tables = self.tables.write();
        let moved = tables.categories.get(&category.id)?.parent_id != category.parent_id;
        if let Some(parent) = category.parent_id.as_ref().filter(|_| moved) {
            if !tables.categories.contains_key(parent) {
                return Some(Err(ParentError::NotFound(parent.clone())));
            }
            if closes_cycle(&tables.categories, &category.id, parent) {
                return Some(Err(ParentError::Cycle(parent.clone())));
            }
        }
        tables
            .categories
            .insert(category.id.clone(), category.clone());
        Some(Ok(category))
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// All users in creation order.
    #[must_use]
    pub fn users(&self) -> Vec<User> {
        in_creation_order(&self.tables.read().users, |u| u.created_at)
    }

    /// Look up a user by ID.
    #[must_use]
    pub fn user(&self, id: &UserId) -> Option<User> {
        self.tables.read().users.get(id).cloned()
    }

    /// Insert a fully formed user together with an empty cart.
    pub fn create_user(&self, user: User) -> User {
        let mut tables = self.tables.write();
        tables
            .carts
            .insert(user.id.clone(), Cart::empty(user.id.clone(), user.created_at));
        tables.users.insert(user.id.clone(), user.clone());
        user
    }

    /// Replace an existing user. Returns `None` if it no longer exists.
    pub fn update_user(&self, user: User) -> Option<User> {
        let id = user.id.clone();
        replace(&mut self.tables.write().users, &id, user)
    }

    /// Remove a user and their cart, returning the user. Orders are kept.
    pub fn delete_user(&self, id: &UserId) -> Option<User> {
        let mut tables = self.tables.write();
        let user = tables.users.remove(id)?;
        tables.carts.remove(id);
        Some(user)
    }

    // =========================================================================
    // Carts
    // =========================================================================

    /// The cart for a user. Never fails.
    ///
    /// If no cart has been persisted for the user, an empty cart with ID
    /// `cart-<userId>` is synthesized and returned *without* being stored.
    #[must_use]
    pub fn cart_by_user(&self, user_id: &UserId) -> Cart {
        self.tables
            .read()
            .carts
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| Cart::empty(user_id.clone(), Utc::now()))
    }

    /// Whether a cart has actually been stored for the user.
    #[must_use]
    pub fn has_persisted_cart(&self, user_id: &UserId) -> bool {
        self.tables.read().carts.contains_key(user_id)
    }

    /// Store a cart under its owner, replacing any previous one.
    pub fn update_cart(&self, cart: Cart) -> Cart {
        self.tables
            .write()
            .carts
            .insert(cart.user_id.clone(), cart.clone());
        cart
    }

    /// Empty a user's cart, persisting it if it was only synthesized.
    pub fn clear_cart(&self, user_id: &UserId) -> Cart {
        let now = Utc::now();
        let mut tables = self.tables.write();
        let cart = tables
            .carts
            .entry(user_id.clone())
            .or_insert_with(|| Cart::empty(user_id.clone(), now));
        cart.items.clear();
        cart.updated_at = now;
        cart.clone()
    }

    /// Read-modify-write a user's cart under the write lock.
    ///
    /// A missing cart is materialized first. `f` works on a copy; the copy is
    /// stored only if `f` succeeds.
    ///
    /// # Errors
    ///
    /// Returns whatever `f` returns; the stored cart is untouched in that case.
    pub fn modify_cart<E>(
        &self,
        user_id: &UserId,
        f: impl FnOnce(&mut Cart) -> Result<(), E>,
    ) -> Result<Cart, E> {
        let mut tables = self.tables.write();
        let mut cart = tables
            .carts
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| Cart::empty(user_id.clone(), Utc::now()));

        f(&mut cart)?;
        tables.carts.insert(user_id.clone(), cart.clone());
        Ok(cart)
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// All orders in creation order.
    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        in_creation_order(&self.tables.read().orders, |o| o.created_at)
    }

    /// Look up an order by ID.
    #[must_use]
    pub fn order(&self, id: &OrderId) -> Option<Order> {
        self.tables.read().orders.get(id).cloned()
    }

    /// All orders placed by a user, in creation order.
    #[must_use]
    pub fn orders_by_user(&self, user_id: &UserId) -> Vec<Order> {
        let mut orders = self.orders();
        orders.retain(|o| &o.user_id == user_id);
        orders
    }

    /// Insert a fully formed order.
    pub fn create_order(&self, order: Order) -> Order {
        self.tables
            .write()
            .orders
            .insert(order.id.clone(), order.clone());
        order
    }

    /// Replace an existing order. Returns `None` if it no longer exists.
    pub fn update_order(&self, order: Order) -> Option<Order> {
        let id = order.id.clone();
        replace(&mut self.tables.write().orders, &id, order)
    }

    /// Read-modify-write an order under the write lock.
    ///
    /// Returns `None` if the order does not exist. `f` works on a copy; the
    /// copy is stored only if `f` succeeds.
    pub fn modify_order<E>(
        &self,
        id: &OrderId,
        f: impl FnOnce(&mut Order) -> Result<(), E>,
    ) -> Option<Result<Order, E>> {
        let mut tables = self.tables.write();
        let slot = tables.orders.get_mut(id)?;
        let mut order = slot.clone();

        Some(f(&mut order).map(|()| {
            *slot = order.clone();
            order
        }))
    }
}
