//! Declared API handlers: CRUD, connect, and the Pinterest consent redirect.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::Redirect,
    routing::{get, post},
};
use serde_json::{Value, json};
use tracing::instrument;

use api_hub_core::DeclaredApiId;

use crate::db::{ApiLogRepository, DeclaredApiRepository};
use crate::error::AppError;
use crate::models::{ConnectOptions, DeclaredApi, NewApiLogEntry, NewDeclaredApi};
use crate::pinterest::authorize_url;
use crate::state::AppState;

/// Build the declared API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/declared-apis",
            get(list_declared_apis).post(create_declared_api),
        )
        .route(
            "/api/declared-apis/{id}",
            get(get_declared_api)
                .put(update_declared_api)
                .delete(delete_declared_api),
        )
        .route("/api/declared-apis/{id}/connect", post(connect_declared_api))
        .route(
            "/api/declared-apis/{id}/pinterest/authorize",
            get(pinterest_authorize),
        )
}

async fn load(state: &AppState, id: DeclaredApiId) -> Result<DeclaredApi, AppError> {
    DeclaredApiRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("declared API {id}")))
}

/// List all declared APIs, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn list_declared_apis(
    State(state): State<AppState>,
) -> Result<Json<Vec<DeclaredApi>>, AppError> {
    Ok(Json(DeclaredApiRepository::new(state.pool()).list_all().await?))
}

/// Get one declared API.
///
/// # Errors
///
/// Returns 404 if it does not exist.
pub async fn get_declared_api(
    State(state): State<AppState>,
    Path(id): Path<DeclaredApiId>,
) -> Result<Json<DeclaredApi>, AppError> {
    Ok(Json(load(&state, id).await?))
}

/// Declare a new API.
///
/// # Errors
///
/// Returns 400 if the title or base URL is invalid.
pub async fn create_declared_api(
    State(state): State<AppState>,
    Json(input): Json<NewDeclaredApi>,
) -> Result<(StatusCode, Json<DeclaredApi>), AppError> {
    input.validate().map_err(AppError::BadRequest)?;

    let created = DeclaredApiRepository::new(state.pool()).create(&input).await?;
    tracing::info!(id = %created.id, title = %created.api_title, "Declared API created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// Replace a declared API.
///
/// # Errors
///
/// Returns 400 if the title or base URL is invalid, 404 if it does not exist.
pub async fn update_declared_api(
    State(state): State<AppState>,
    Path(id): Path<DeclaredApiId>,
    Json(input): Json<NewDeclaredApi>,
) -> Result<Json<DeclaredApi>, AppError> {
    input.validate().map_err(AppError::BadRequest)?;

    let updated = DeclaredApiRepository::new(state.pool())
        .update(id, &input)
        .await?;
    tracing::info!(%id, "Declared API updated");
    Ok(Json(updated))
}

/// Delete a declared API.
///
/// # Errors
///
/// Returns 404 if it does not exist.
pub async fn delete_declared_api(
    State(state): State<AppState>,
    Path(id): Path<DeclaredApiId>,
) -> Result<StatusCode, AppError> {
    DeclaredApiRepository::new(state.pool()).delete(id).await?;
    tracing::info!(%id, "Declared API deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Call a declared API through the proxy and record the outcome.
///
/// The body is optional; `{}` or no body at all connects without a date range.
///
/// # Errors
///
/// Returns 404 if the declaration does not exist, and the proxy error when
/// the call fails (after logging it).
#[instrument(skip(state, options), fields(id = %id))]
pub async fn connect_declared_api(
    State(state): State<AppState>,
    Path(id): Path<DeclaredApiId>,
    options: Option<Json<ConnectOptions>>,
) -> Result<Json<Value>, AppError> {
    let options = options.map(|Json(o)| o).unwrap_or_default();
    let api = load(&state, id).await?;
    let logs = ApiLogRepository::new(state.pool());

    let call = api.connect_call(&options)?;
    match state.proxy().fetch_all(&call).await {
        Ok(data) => {
            let entry = NewApiLogEntry::success(
                api.id,
                &api.api_title,
                &call.url,
                options.requested_by.clone(),
                data.len(),
            );
            logs.insert(&entry).await?;
            tracing::info!(records = data.len(), "Declared API connected");
            Ok(Json(json!({ "data": data })))
        }
        Err(e) => {
            let entry = NewApiLogEntry::failure(
                api.id,
                &api.api_title,
                &call.url,
                options.requested_by.clone(),
                e.to_string(),
            );
            if let Err(log_err) = logs.insert(&entry).await {
                tracing::error!(error = %log_err, "Failed to record call log entry");
            }
            Err(e.into())
        }
    }
}

/// Redirect to the Pinterest consent page for a declared API.
///
/// # Errors
///
/// Returns 400 if the declaration lacks a client ID or redirect URL.
pub async fn pinterest_authorize(
    State(state): State<AppState>,
    Path(id): Path<DeclaredApiId>,
) -> Result<Redirect, AppError> {
    let api = load(&state, id).await?;

    let client_id = api
        .client_id
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("declared API has no clientId".to_string()))?;
    let redirect_url = api
        .redirect_url
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("declared API has no redirectUrl".to_string()))?;

    let url = authorize_url(&state.config().pinterest, client_id, redirect_url)?;
    Ok(Redirect::to(url.as_str()))
}
