//! API name and API account handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
};
use serde::Deserialize;

use api_hub_core::{ApiAccountId, ApiNameId};

use crate::db::{ApiAccountRepository, ApiNameRepository, DeclaredApiRepository};
use crate::error::AppError;
use crate::models::{ApiAccount, ApiName, DeclaredApi, NewApiAccount, NewApiName};
use crate::state::AppState;

/// Build the catalog router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/api-names", get(list_api_names).post(create_api_name))
        .route("/api/api-names/{id}", delete(delete_api_name))
        .route(
            "/api/api-accounts",
            get(list_api_accounts).post(create_api_account),
        )
        .route(
            "/api/api-accounts/{id}/declared-apis",
            get(list_account_declared_apis),
        )
}

// =============================================================================
// API Names
// =============================================================================

/// List API names alphabetically.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn list_api_names(State(state): State<AppState>) -> Result<Json<Vec<ApiName>>, AppError> {
    Ok(Json(ApiNameRepository::new(state.pool()).list_all().await?))
}

/// Create an API name.
///
/// # Errors
///
/// Returns 400 for a blank name and 409 if the name exists.
pub async fn create_api_name(
    State(state): State<AppState>,
    Json(input): Json<NewApiName>,
) -> Result<(StatusCode, Json<ApiName>), AppError> {
    if input.normalized_name().is_none() {
        return Err(AppError::BadRequest("name is required".to_string()));
    }

    let created = ApiNameRepository::new(state.pool()).create(&input).await?;
    tracing::info!(id = %created.id, name = %created.name, "API name created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// Delete an API name.
///
/// # Errors
///
/// Returns 404 if the API name does not exist.
pub async fn delete_api_name(
    State(state): State<AppState>,
    Path(id): Path<ApiNameId>,
) -> Result<StatusCode, AppError> {
    ApiNameRepository::new(state.pool()).delete(id).await?;
    tracing::info!(%id, "API name deleted");
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// API Accounts
// =============================================================================

/// Query string of `GET /api/api-accounts`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountsQuery {
    pub api_name_id: Option<ApiNameId>,
}

/// List API accounts, optionally under one API name.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn list_api_accounts(
    State(state): State<AppState>,
    Query(query): Query<AccountsQuery>,
) -> Result<Json<Vec<ApiAccount>>, AppError> {
    let accounts = ApiAccountRepository::new(state.pool())
        .list(query.api_name_id)
        .await?;
    Ok(Json(accounts))
}

/// Create an API account.
///
/// # Errors
///
/// Returns 400 for a blank name and 409 if the name is taken or the API
/// name does not exist.
pub async fn create_api_account(
    State(state): State<AppState>,
    Json(input): Json<NewApiAccount>,
) -> Result<(StatusCode, Json<ApiAccount>), AppError> {
    if input.normalized_name().is_none() {
        return Err(AppError::BadRequest("name is required".to_string()));
    }

    let created = ApiAccountRepository::new(state.pool()).create(&input).await?;
    tracing::info!(id = %created.id, name = %created.name, "API account created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// List the declared APIs attached to an account.
///
/// # Errors
///
/// Returns 404 if the account does not exist.
pub async fn list_account_declared_apis(
    State(state): State<AppState>,
    Path(id): Path<ApiAccountId>,
) -> Result<Json<Vec<DeclaredApi>>, AppError> {
    ApiAccountRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("API account {id}")))?;

    let apis = DeclaredApiRepository::new(state.pool())
        .list_by_account(id)
        .await?;
    Ok(Json(apis))
}
