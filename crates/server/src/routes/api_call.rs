//! `POST /api/apiCall`: the generic proxy endpoint.
//!
//! Either exchanges a Pinterest authorization code (when `url` is the
//! `pinterest/token` marker) or proxies the call, following pagination.
//!
//! Responses: `{"data": [...]}`, `{"token": {...}}`, or an error body.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};
use serde_json::{Value, json};
use tracing::instrument;

use crate::error::AppError;
use crate::pinterest::{OAuthCredentials, PinterestError};
use crate::proxy::{ApiCallRequest, ProxyCall};
use crate::state::AppState;

/// Build the proxy router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/apiCall", post(api_call))
}

/// Proxy a call to a partner API, or exchange a Pinterest code.
///
/// # Errors
///
/// Returns 400 for malformed input, 500 with details when the partner API
/// fails, and 502 when Pinterest rejects the exchange.
#[instrument(skip(state, payload))]
pub async fn api_call(
    State(state): State<AppState>,
    payload: Result<Json<ApiCallRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    tracing::debug!(?request, "Received API call");

    if request.is_pinterest_token_exchange() {
        let code = request
            .param("code")
            .ok_or(PinterestError::MissingField("code"))?;
        let credentials = OAuthCredentials::from_parts(
            request.client_id.as_deref(),
            request.client_secret.as_deref(),
            request.redirect_url.as_deref(),
        )?;

        let token = state.pinterest().exchange_code(&credentials, &code).await?;
        return Ok(Json(json!({ "token": token })));
    }

    let call = ProxyCall::try_from(&request)?;
    let data = state.proxy().fetch_all(&call).await?;

    Ok(Json(json!({ "data": data })))
}
