//! API Hub server library.
//!
//! Backend of the API dashboard: a generic proxy that follows cursor
//! pagination of partner APIs (Shopify-style `Link` headers), the Pinterest
//! OAuth code exchange, and a `PostgreSQL` catalog of declared APIs with a
//! call log.
//!
//! The binary in `main.rs` only wires configuration, telemetry and the
//! listener around [`build_router`], so tests drive the same router
//! in-process.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod pinterest;
pub mod proxy;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

pub use config::HubConfig;
pub use state::AppState;

/// Build the application router with request tracing and Sentry layers.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::routes(state.clone()))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
