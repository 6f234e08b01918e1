//! Bazaar Core - Domain types shared by the Bazaar crates.
//!
//! This crate provides the value types used by the API server and its tests:
//! - `api` - JSON HTTP server (store, auth, order workflow)
//! - `integration-tests` - End-to-end HTTP tests
//!
//! # Architecture
//!
//! The core crate contains only types and pure rules - no I/O, no locking,
//! no HTTP. The order status state machine lives here so that every caller
//! agrees on which transitions are legal.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, addresses and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
