//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request spans)
//! 3. Request ID (honour or generate `x-request-id`)
//! 4. Bearer auth (protected path prefixes only)
//!
//! The login rate limiter is attached to `/auth/login` by the binary.

pub mod auth;
pub mod rate_limit;
pub mod request_id;

pub use auth::{CurrentSession, RequireAuth, is_protected, require_bearer};
pub use rate_limit::login_rate_limiter;
pub use request_id::{RequestId, request_id_middleware};
