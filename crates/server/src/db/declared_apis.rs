//! Declared API repository.
//!
//! Header, query-parameter and variable rows are stored as JSONB arrays of
//! `{key, value}` objects. The method is stored as its upper-case name.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};
use tracing::instrument;
use uuid::Uuid;

use api_hub_core::{ApiAccountId, ApiNameId, DeclaredApiId, HttpMethod, KeyValue};

use super::RepositoryError;
use super::catalog::{get_or_create_account, get_or_create_name};
use crate::models::{DeclaredApi, NewDeclaredApi, declares_date_range};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct DeclaredApiRow {
    id: Uuid,
    api_title: String,
    api_name_id: Option<Uuid>,
    api_account_id: Option<Uuid>,
    base_url: String,
    main_url: String,
    method: String,
    headers: Json<Vec<KeyValue>>,
    query_params: Json<Vec<KeyValue>>,
    variables: Json<Vec<KeyValue>>,
    callback_url: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    redirect_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<DeclaredApiRow> for DeclaredApi {
    type Error = RepositoryError;

    fn try_from(row: DeclaredApiRow) -> Result<Self, Self::Error> {
        let method: HttpMethod = row.method.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid method in database: {e}"))
        })?;

        Ok(Self {
            id: DeclaredApiId::new(row.id),
            api_title: row.api_title,
            api_name_id: row.api_name_id.map(ApiNameId::new),
            api_account_id: row.api_account_id.map(ApiAccountId::new),
            base_url: row.base_url,
            main_url: row.main_url,
            method,
            headers: row.headers.0,
            uses_date_range: declares_date_range(&row.query_params.0),
            query_params: row.query_params.0,
            variables: row.variables.0,
            callback_url: row.callback_url,
            client_id: row.client_id,
            client_secret: row.client_secret.map(SecretString::from),
            redirect_url: row.redirect_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Catalog references of a declaration after name lookups.
struct CatalogRefs {
    api_name_id: Option<Uuid>,
    api_account_id: Option<Uuid>,
}

/// Resolve `apiName` / `apiAccount` names to IDs, creating entries as needed.
async fn resolve_catalog(
    conn: &mut PgConnection,
    input: &NewDeclaredApi,
) -> Result<CatalogRefs, RepositoryError> {
    let created_by = input.created_by.as_deref();

    let api_name_id = match (input.api_name_id, input.api_name_to_create()) {
        (Some(id), _) => Some(id),
        (None, Some(name)) => Some(get_or_create_name(&mut *conn, name, created_by).await?.id),
        (None, None) => None,
    };

    let api_account_id = match (input.api_account_id, input.api_account_to_create()) {
        (Some(id), _) => Some(id),
        (None, Some(name)) => Some(
            get_or_create_account(&mut *conn, name, api_name_id, created_by)
                .await?
                .id,
        ),
        (None, None) => None,
    };

    Ok(CatalogRefs {
        api_name_id: api_name_id.map(|id| id.as_uuid()),
        api_account_id: api_account_id.map(|id| id.as_uuid()),
    })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for declared API database operations.
pub struct DeclaredApiRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DeclaredApiRepository<'a> {
    /// Create a new declared API repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all declarations, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored method is invalid.
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<DeclaredApi>, RepositoryError> {
        let rows = sqlx::query_as::<_, DeclaredApiRow>(
            r"
            SELECT id, api_title, api_name_id, api_account_id, base_url, main_url,
                   method, headers, query_params, variables, callback_url,
                   client_id, client_secret, redirect_url, created_at, updated_at
            FROM declared_apis
            ORDER BY created_at DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// List the declarations attached to one account, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored method is invalid.
    #[instrument(skip(self), fields(account_id = %account_id))]
    pub async fn list_by_account(
        &self,
        account_id: ApiAccountId,
    ) -> Result<Vec<DeclaredApi>, RepositoryError> {
        let rows = sqlx::query_as::<_, DeclaredApiRow>(
            r"
            SELECT id, api_title, api_name_id, api_account_id, base_url, main_url,
                   method, headers, query_params, variables, callback_url,
                   client_id, client_secret, redirect_url, created_at, updated_at
            FROM declared_apis
            WHERE api_account_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(account_id.as_uuid())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a declaration by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored method is invalid.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn get_by_id(&self, id: DeclaredApiId) -> Result<Option<DeclaredApi>, RepositoryError> {
        let row = sqlx::query_as::<_, DeclaredApiRow>(
            r"
            SELECT id, api_title, api_name_id, api_account_id, base_url, main_url,
                   method, headers, query_params, variables, callback_url,
                   client_id, client_secret, redirect_url, created_at, updated_at
            FROM declared_apis
            WHERE id = $1
            ",
        )
        .bind(id.as_uuid())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Store a new declaration, creating any named API name or account in the
    /// same transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a referenced catalog entry does
    /// not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, input), fields(api_title = %input.api_title))]
    pub async fn create(&self, input: &NewDeclaredApi) -> Result<DeclaredApi, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let refs = resolve_catalog(&mut *tx, input).await?;

        let row = sqlx::query_as::<_, DeclaredApiRow>(
            r"
            INSERT INTO declared_apis (
                id, api_title, api_name_id, api_account_id, base_url, main_url,
                method, headers, query_params, variables, callback_url,
                client_id, client_secret, redirect_url, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING id, api_title, api_name_id, api_account_id, base_url, main_url,
                      method, headers, query_params, variables, callback_url,
                      client_id, client_secret, redirect_url, created_at, updated_at
            ",
        )
        .bind(DeclaredApiId::generate().as_uuid())
        .bind(input.api_title.trim())
        .bind(refs.api_name_id)
        .bind(refs.api_account_id)
        .bind(input.base_url.trim())
        .bind(input.main_url())
        .bind(input.method.as_str())
        .bind(Json(&input.headers))
        .bind(Json(&input.query_params))
        .bind(Json(&input.variables))
        .bind(non_blank(input.callback_url.as_deref()))
        .bind(non_blank(input.client_id.as_deref()))
        .bind(non_blank(input.client_secret.as_deref()))
        .bind(non_blank(input.redirect_url.as_deref()))
        .bind(input.created_by.as_deref())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_write(e, "declared API"))?;

        tx.commit().await?;
        row.try_into()
    }

    /// Replace a declaration. A blank or absent client secret keeps the
    /// stored one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such declaration exists.
    /// Returns `RepositoryError::Conflict` if a referenced catalog entry does
    /// not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, input), fields(id = %id))]
    pub async fn update(
        &self,
        id: DeclaredApiId,
        input: &NewDeclaredApi,
    ) -> Result<DeclaredApi, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let refs = resolve_catalog(&mut *tx, input).await?;

        let row = sqlx::query_as::<_, DeclaredApiRow>(
            r"
            UPDATE declared_apis SET
                api_title = $2,
                api_name_id = $3,
                api_account_id = $4,
                base_url = $5,
                main_url = $6,
                method = $7,
                headers = $8,
                query_params = $9,
                variables = $10,
                callback_url = $11,
                client_id = $12,
                client_secret = COALESCE($13, client_secret),
                redirect_url = $14,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, api_title, api_name_id, api_account_id, base_url, main_url,
                      method, headers, query_params, variables, callback_url,
                      client_id, client_secret, redirect_url, created_at, updated_at
            ",
        )
        .bind(id.as_uuid())
        .bind(input.api_title.trim())
        .bind(refs.api_name_id)
        .bind(refs.api_account_id)
        .bind(input.base_url.trim())
        .bind(input.main_url())
        .bind(input.method.as_str())
        .bind(Json(&input.headers))
        .bind(Json(&input.query_params))
        .bind(Json(&input.variables))
        .bind(non_blank(input.callback_url.as_deref()))
        .bind(non_blank(input.client_id.as_deref()))
        .bind(non_blank(input.client_secret.as_deref()))
        .bind(non_blank(input.redirect_url.as_deref()))
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_write(e, "declared API"))?
        .ok_or(RepositoryError::NotFound)?;

        tx.commit().await?;
        row.try_into()
    }

    /// Delete a declaration. Its log entries keep existing with the reference
    /// cleared.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such declaration exists.
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&self, id: DeclaredApiId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM declared_apis WHERE id = $1")
            .bind(id.as_uuid())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
