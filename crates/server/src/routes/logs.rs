//! Call log API handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;

use api_hub_core::DeclaredApiId;

use crate::db::ApiLogRepository;
use crate::db::api_logs::clamp_limit;
use crate::error::AppError;
use crate::models::ApiLogEntry;
use crate::state::AppState;

/// Build the call log router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/logs", get(list_logs))
}

/// Query string of `GET /api/logs`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsQuery {
    pub limit: Option<i64>,
    pub declared_api_id: Option<DeclaredApiId>,
}

/// List recent call log entries, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn list_logs(
    State(state): State<AppState>,
    Query(query): Query<LogsQuery>,
) -> Result<Json<Vec<ApiLogEntry>>, AppError> {
    let entries = ApiLogRepository::new(state.pool())
        .list_recent(query.declared_api_id, clamp_limit(query.limit))
        .await?;
    Ok(Json(entries))
}
