//! Unified error handling for the hub API.
//!
//! Every error renders as JSON: `{"error": "..."}`, plus `"details"` where the
//! cause is safe to show (upstream failures).

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::pinterest::PinterestError;
use crate::proxy::ProxyError;

/// Application-level error type for API handlers.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Proxying a call to a partner API failed.
    #[error("Proxy error: {0}")]
    Proxy(#[from] ProxyError),

    /// Pinterest OAuth operation failed.
    #[error("Pinterest error: {0}")]
    Pinterest(#[from] PinterestError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or wrong API token.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this error is the server's (or an upstream's) fault.
    fn is_server_error(&self) -> bool {
        match self {
            Self::Database(e) => {
                !matches!(
                    e,
                    RepositoryError::NotFound
                        | RepositoryError::Conflict(_)
                        | RepositoryError::InvalidInput(_)
                )
            }
            Self::Proxy(e) => !e.is_client_error(),
            Self::Pinterest(e) => !matches!(e, PinterestError::MissingField(_)),
            Self::Internal(_) => true,
            Self::NotFound(_) | Self::Unauthorized(_) | Self::BadRequest(_) => false,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(RepositoryError::Conflict(_)) => StatusCode::CONFLICT,
            Self::Database(RepositoryError::InvalidInput(_))
            | Self::Pinterest(PinterestError::MissingField(_))
            | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Proxy(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Proxy(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Pinterest(_) => StatusCode::BAD_GATEWAY,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }

    fn body(&self) -> Value {
        match self {
            Self::Database(RepositoryError::NotFound) => json!({ "error": "Not found" }),
            Self::Database(RepositoryError::Conflict(msg) | RepositoryError::InvalidInput(msg)) => {
                json!({ "error": msg })
            }
            // Don't expose internal error details to clients
            Self::Database(_) | Self::Internal(_) => json!({ "error": "Internal server error" }),
            Self::Proxy(ProxyError::InvalidRequest(msg)) => json!({ "error": msg }),
            Self::Proxy(e) if e.is_client_error() => json!({ "error": e.to_string() }),
            Self::Proxy(e) => json!({
                "error": "Error connecting to API",
                "details": e.to_string(),
            }),
            Self::Pinterest(e @ PinterestError::MissingField(_)) => json!({ "error": e.to_string() }),
            Self::Pinterest(e) => json!({
                "error": "Error exchanging Pinterest code",
                "details": e.to_string(),
            }),
            Self::NotFound(msg) | Self::Unauthorized(msg) | Self::BadRequest(msg) => {
                json!({ "error": msg })
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Hub request error"
            );
        }

        (self.status(), Json(self.body())).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("declared API".to_string());
        assert_eq!(err.to_string(), "Not found: declared API");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[tokio::test]
    async fn test_missing_url_renders_plain_error() {
        let (status, body) = render(ProxyError::InvalidRequest("URL is required".into()).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "URL is required" }));
    }

    #[tokio::test]
    async fn test_upstream_failure_renders_details() {
        let err = ProxyError::Upstream {
            status: 401,
            body: "Unauthorized".to_string(),
        };
        let (status, body) = render(err.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Error connecting to API");
        assert_eq!(body["details"], "HTTP error! status: 401, details: Unauthorized");
    }

    #[tokio::test]
    async fn test_pinterest_errors() {
        let (status, body) = render(PinterestError::MissingField("code").into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing code");

        let err = PinterestError::Rejected {
            status: 400,
            body: "invalid_grant".to_string(),
        };
        let (status, body) = render(err.into()).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["details"].as_str().unwrap().contains("invalid_grant"));
    }

    #[tokio::test]
    async fn test_database_details_are_hidden() {
        let err = RepositoryError::DataCorruption("bad method XYZ".to_string());
        let (status, body) = render(err.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Internal server error" }));

        let (status, _) = render(RepositoryError::NotFound.into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = render(RepositoryError::Conflict("API name already exists".into()).into()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "API name already exists");
    }

    #[tokio::test]
    async fn test_blank_name_is_a_bad_request() {
        let err = RepositoryError::InvalidInput("name is required".into());
        let (status, body) = render(err.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "name is required" }));
    }

    #[tokio::test]
    async fn test_client_errors_map_to_status() {
        let (status, _) = render(AppError::Unauthorized("Missing API token".into())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = render(AppError::NotFound("declared API".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
