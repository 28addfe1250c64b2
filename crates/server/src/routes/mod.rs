//! HTTP route handlers for the hub.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                                   - Liveness
//! GET  /health/ready                             - Readiness (database ping)
//!
//! # Open
//! GET  /api/testapi                              - Connectivity check
//! POST /api/testapi                              - Echo JSON body
//!
//! # Token-guarded (when HUB_API_TOKEN is set)
//! POST /api/apiCall                              - Proxy / Pinterest code exchange
//! GET  /api/api-names                            - List API names
//! POST /api/api-names                            - Create API name
//! DELETE /api/api-names/{id}                     - Delete API name
//! GET  /api/api-accounts                         - List accounts (?apiNameId=)
//! POST /api/api-accounts                         - Create account
//! GET  /api/api-accounts/{id}/declared-apis      - Account's declared APIs
//! GET  /api/declared-apis                        - List declared APIs
//! POST /api/declared-apis                        - Declare API
//! GET  /api/declared-apis/{id}                   - Get declared API
//! PUT  /api/declared-apis/{id}                   - Replace declared API
//! DELETE /api/declared-apis/{id}                 - Delete declared API
//! POST /api/declared-apis/{id}/connect           - Call it and log the outcome
//! GET  /api/declared-apis/{id}/pinterest/authorize - Redirect to Pinterest consent
//! GET  /api/logs                                 - Recent call log (?limit=&declaredApiId=)
//! ```

pub mod api_call;
pub mod catalog;
pub mod declared_apis;
pub mod health;
pub mod logs;
pub mod testapi;

use axum::{Router, routing::get};

use crate::middleware::require_api_token;
use crate::state::AppState;

/// Build the complete route table.
pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .merge(api_call::router())
        .merge(catalog::router())
        .merge(declared_apis::router())
        .merge(logs::router())
        .route_layer(axum::middleware::from_fn_with_state(state, require_api_token));

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(testapi::router())
        .merge(protected)
}
