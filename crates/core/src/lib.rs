//! Emberline Core - Shared types library.
//!
//! This crate provides common types used across all Emberline components:
//! - `server` - HTTP JSON API (catalog, cart, checkout, auth, admin)
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure domain logic - no I/O, no
//! database access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere, including in tests that never touch a database.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, validated emails, the cart state machine, and
//!   order/role enumerations

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
