//! API Hub Core - Shared types library.
//!
//! This crate provides common types used across all API Hub components:
//! - `server` - HTTP service (proxy, catalog, call log)
//! - `cli` - Command-line tools for migrations and ad-hoc proxied calls
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, HTTP methods, key/value rows and call statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
