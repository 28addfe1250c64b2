//! Shared-token guard for the `/api/*` routes.
//!
//! Active only when `HUB_API_TOKEN` is configured. A request passes with
//! `Authorization: Bearer <token>` or an `authToken=<token>` cookie.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use secrecy::ExposeSecret;

use crate::error::AppError;
use crate::state::AppState;

/// Cookie the dashboard stores its token in.
pub const AUTH_COOKIE: &str = "authToken";

/// Reject requests that do not present the configured API token.
pub async fn require_api_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.config().api_token.as_ref() else {
        return next.run(request).await;
    };

    let matches = presented_token(request.headers())
        .map(|token| constant_time_eq(token.as_bytes(), expected.expose_secret().as_bytes()));

    match matches {
        Some(true) => next.run(request).await,
        Some(false) => {
            tracing::warn!(path = %request.uri().path(), "Rejected request with wrong API token");
            AppError::Unauthorized("Invalid API token".to_string()).into_response()
        }
        None => AppError::Unauthorized("Missing API token".to_string()).into_response(),
    }
}

/// The bearer token, or else the `authToken` cookie.
fn presented_token(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    bearer.or_else(|| {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == AUTH_COOKIE)
            .map(|(_, value)| value.trim())
            .filter(|t| !t.is_empty())
    })
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
