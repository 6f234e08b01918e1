//! Bazaar API - JSON HTTP backend for a small commerce catalog.
//!
//! # Architecture
//!
//! - Axum web framework, one shared [`AppState`]
//! - In-memory [`store::MemoryStore`] behind a reader/writer lock
//! - Bearer-token sessions in [`services::AuthStore`]
//! - Order and cart workflows in [`services`]
//!
//! The binary (`bazaar-api`) adds tracing, Sentry, the login rate limiter,
//! the session sweep and graceful shutdown around [`app_with_rate_limits`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

use axum::{Router, middleware::from_fn, middleware::from_fn_with_state};

pub use config::ApiConfig;
pub use error::{AppError, ErrorCode};
pub use state::AppState;

use crate::middleware::rate_limit::RateLimiterLayer;

/// Build the application router without rate limiting.
pub fn app(state: AppState) -> Router {
    build(state, None)
}

/// Build the application router with the login rate limiter attached.
///
/// The limiter keys on the client IP, so the server must be started with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn app_with_rate_limits(state: AppState) -> Router {
    build(state, Some(middleware::login_rate_limiter()))
}

fn build(state: AppState, login_limiter: Option<RateLimiterLayer>) -> Router {
    routes::routes(login_limiter)
        .layer(from_fn_with_state(state.clone(), middleware::require_bearer))
        .layer(from_fn(middleware::request_id_middleware))
        .with_state(state)
}
