//! Core types for API Hub.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod key_value;
pub mod method;
pub mod status;

pub use id::*;
pub use key_value::{KeyValue, encode_query, with_query};
pub use method::{HttpMethod, ParseMethodError};
pub use status::ApiStatus;
