//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                              - Liveness check
//!
//! # Auth
//! POST   /auth/login                          - Exchange credentials for a bearer token
//! POST   /auth/logout                         - End the current session (auth)
//! GET    /auth/me                             - Current user snapshot (auth)
//!
//! # Catalog (public)
//! GET    /products                            - Filtered, sorted, paginated list
//! POST   /products                            - Create product
//! GET    /products/{id}                       - Product detail
//! PATCH  /products/{id}                       - Partial update
//! DELETE /products/{id}                       - Delete
//! GET    /categories                          - All categories
//! POST   /categories                          - Create category
//! GET    /categories/tree                     - Nested category tree
//! GET    /categories/{id}                     - Category detail
//! PATCH  /categories/{id}                     - Partial update
//! DELETE /categories/{id}                     - Delete
//!
//! # Users (auth)
//! GET    /users                               - Paginated list
//! POST   /users                               - Create user (and cart)
//! GET    /users/{id}                          - User detail
//! PATCH  /users/{id}                          - Partial update
//! DELETE /users/{id}                          - Delete user and cart
//!
//! # Carts (auth)
//! GET    /carts/users/{userId}                - Cart (empty if none stored)
//! POST   /carts/users/{userId}/items          - Add item
//! DELETE /carts/users/{userId}/items          - Clear
//! PATCH  /carts/users/{userId}/items/{productId} - Set quantity
//! DELETE /carts/users/{userId}/items/{productId} - Remove item
//!
//! # Orders (auth)
//! GET    /orders                              - Filtered, paginated list
//! GET    /orders/{id}                         - Order detail
//! GET    /orders/users/{userId}               - A user's orders
//! POST   /orders/users/{userId}               - Place order
//! PATCH  /orders/status/{id}                  - Change status
//! POST   /orders/cancel/{id}                  - Cancel and restore stock
//! ```

pub mod auth;
pub mod carts;
pub mod categories;
pub mod orders;
pub mod products;
pub mod users;

use axum::{Router, routing::get};

use crate::middleware::rate_limit::RateLimiterLayer;
use crate::models::Page;
use crate::state::AppState;

/// Create the full API router.
///
/// `login_limiter` is applied to `POST /auth/login` only.
pub fn routes(login_limiter: Option<RateLimiterLayer>) -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .merge(auth::routes(login_limiter))
        .merge(products::routes())
        .merge(categories::routes())
        .merge(users::routes())
        .merge(carts::routes())
        .merge(orders::routes())
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Cut a page from a filtered and sorted list, applying defaults for missing
/// `limit` / `offset`.
fn paginate<T>(items: Vec<T>, limit: Option<usize>, offset: Option<usize>, default_limit: usize) -> Page<T> {
    Page::slice(items, limit.unwrap_or(default_limit), offset.unwrap_or(0))
}

/// Reject a blank required string field.
fn require_non_blank(field: &str, value: &str) -> crate::error::Result<()> {
    if value.trim().is_empty() {
        return Err(crate::error::AppError::Validation(format!("{field} is required")));
    }
    Ok(())
}
