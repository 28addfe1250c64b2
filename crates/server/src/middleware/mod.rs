//! HTTP middleware stack for the hub.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, transaction per route)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. API token guard (protected `/api/*` routes only)

pub mod auth;
pub mod request_id;

pub use auth::{AUTH_COOKIE, require_api_token};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
