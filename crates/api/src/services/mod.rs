//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Credential table and bearer-token sessions
//! - `carts` - Cart item operations with stock checks
//! - `orders` - Order creation, cancellation and status workflow

pub mod auth;
pub mod carts;
pub mod orders;

pub use auth::{AuthError, AuthStore};
pub use carts::{CartError, CartService};
pub use orders::{OrderError, OrderLine, OrderService};
