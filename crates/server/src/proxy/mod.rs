//! Generic API-calling proxy with cursor pagination.
//!
//! Backs `POST /api/apiCall` and the declared-API connect flow:
//!
//! 1. [`request`] turns the loosely typed inbound payload into a [`ProxyCall`]
//! 2. [`client`] issues the request, follows `Link: <...>; rel="next"` cursors
//!    with a fixed pause between pages
//! 3. [`merge`] folds each page body into a single array
//!
//! Only Shopify-style `page_info` cursors are followed; other APIs get a
//! single request.

pub mod client;
pub mod link;
pub mod merge;
pub mod request;

pub use client::ApiProxy;
pub use request::{ApiCallRequest, PINTEREST_TOKEN_MARKER, ProxyCall};

use thiserror::Error;

/// Errors raised while proxying a call.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The inbound payload cannot be turned into a call.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The target (or derived page) URL is not an absolute URL.
    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A caller-supplied header name or value is not valid HTTP.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// Connection, TLS or timeout failure.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The upstream API answered with a non-2xx status.
    #[error("HTTP error! status: {status}, details: {body}")]
    Upstream { status: u16, body: String },

    /// The upstream body is not JSON.
    #[error("invalid JSON response: {0}")]
    Decode(String),
}

impl ProxyError {
    /// Whether the caller, rather than the upstream API, is at fault.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest(_) | Self::InvalidUrl { .. } | Self::InvalidHeader(_)
        )
    }
}
