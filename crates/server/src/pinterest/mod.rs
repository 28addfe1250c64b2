//! Pinterest OAuth integration.
//!
//! The dashboard sends the user to Pinterest's consent page, Pinterest
//! redirects back with a `code`, and the code is traded for tokens here.
//!
//! # API Reference
//!
//! - Consent page: `https://www.pinterest.com/oauth/`
//! - Token endpoint: `https://api.pinterest.com/v5/oauth/token`
//! - Authentication: HTTP Basic with `client_id:client_secret`

mod oauth;

pub use oauth::{OAuthCredentials, PinterestClient, authorize_url};

use thiserror::Error;

/// Errors that can occur during the Pinterest OAuth flow.
#[derive(Debug, Error)]
pub enum PinterestError {
    /// A value required by the exchange was not supplied.
    #[error("Missing {0}")]
    MissingField(&'static str),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Pinterest rejected the exchange.
    #[error("Token exchange failed: HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The configured consent page URL is unusable.
    #[error("Invalid authorize URL: {0}")]
    InvalidAuthorizeUrl(#[from] url::ParseError),
}
