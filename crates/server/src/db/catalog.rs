//! Repositories for API names and API accounts.
//!
//! The `get_or_create_*` helpers take a bare connection so declared-API
//! writes can resolve catalog entries inside their own transaction.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use tracing::instrument;
use uuid::Uuid;

use api_hub_core::{ApiAccountId, ApiNameId};

use super::RepositoryError;
use crate::models::{ApiAccount, ApiName, NewApiAccount, NewApiName};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ApiNameRow {
    id: Uuid,
    name: String,
    created_by: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ApiNameRow> for ApiName {
    fn from(row: ApiNameRow) -> Self {
        Self {
            id: ApiNameId::new(row.id),
            name: row.name,
            created_by: row.created_by,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ApiAccountRow {
    id: Uuid,
    name: String,
    api_name_id: Option<Uuid>,
    created_by: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ApiAccountRow> for ApiAccount {
    fn from(row: ApiAccountRow) -> Self {
        Self {
            id: ApiAccountId::new(row.id),
            name: row.name,
            api_name_id: row.api_name_id.map(ApiNameId::new),
            created_by: row.created_by,
            created_at: row.created_at,
        }
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

/// Find an API name by exact name, creating it if absent.
pub(crate) async fn get_or_create_name(
    conn: &mut PgConnection,
    name: &str,
    created_by: Option<&str>,
) -> Result<ApiName, RepositoryError> {
    let row = sqlx::query_as::<_, ApiNameRow>(
        r"
        INSERT INTO api_names (id, name, created_by)
        VALUES ($1, $2, $3)
        ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
        RETURNING id, name, created_by, created_at
        ",
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(created_by)
    .fetch_one(conn)
    .await?;

    Ok(row.into())
}

/// Find an account by name under `api_name_id`, creating it if absent.
pub(crate) async fn get_or_create_account(
    conn: &mut PgConnection,
    name: &str,
    api_name_id: Option<ApiNameId>,
    created_by: Option<&str>,
) -> Result<ApiAccount, RepositoryError> {
    let existing = sqlx::query_as::<_, ApiAccountRow>(
        r"
        SELECT id, name, api_name_id, created_by, created_at
        FROM api_accounts
        WHERE name = $1 AND api_name_id IS NOT DISTINCT FROM $2
        ",
    )
    .bind(name)
    .bind(api_name_id.map(|id| id.as_uuid()))
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(row) = existing {
        return Ok(row.into());
    }

    let row = sqlx::query_as::<_, ApiAccountRow>(
        r"
        INSERT INTO api_accounts (id, name, api_name_id, created_by)
        VALUES ($1, $2, $3, $4)
        RETURNING id, name, api_name_id, created_by, created_at
        ",
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(api_name_id.map(|id| id.as_uuid()))
    .bind(created_by)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| RepositoryError::from_write(e, "API account"))?;

    Ok(row.into())
}

// =============================================================================
// API Names
// =============================================================================

/// Repository for API name database operations.
pub struct ApiNameRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ApiNameRepository<'a> {
    /// Create a new API name repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all API names alphabetically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<ApiName>, RepositoryError> {
        let rows = sqlx::query_as::<_, ApiNameRow>(
            r"
            SELECT id, name, created_by, created_at
            FROM api_names
            ORDER BY name
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Create a new API name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidInput` if the name is blank.
    /// Returns `RepositoryError::Conflict` if the name already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: &NewApiName) -> Result<ApiName, RepositoryError> {
        let name = input
            .normalized_name()
            .ok_or_else(|| RepositoryError::InvalidInput("name is required".to_owned()))?;

        let row = sqlx::query_as::<_, ApiNameRow>(
            r"
            INSERT INTO api_names (id, name, created_by)
            VALUES ($1, $2, $3)
            RETURNING id, name, created_by, created_at
            ",
        )
        .bind(ApiNameId::generate().as_uuid())
        .bind(name)
        .bind(input.created_by.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "API name"))?;

        Ok(row.into())
    }

    /// Delete an API name. Accounts and declarations keep existing with the
    /// reference cleared.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such API name exists.
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&self, id: ApiNameId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM api_names WHERE id = $1")
            .bind(id.as_uuid())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

// =============================================================================
// API Accounts
// =============================================================================

/// Repository for API account database operations.
pub struct ApiAccountRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ApiAccountRepository<'a> {
    /// Create a new API account repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List accounts, optionally only those under one API name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        api_name_id: Option<ApiNameId>,
    ) -> Result<Vec<ApiAccount>, RepositoryError> {
        let rows = sqlx::query_as::<_, ApiAccountRow>(
            r"
            SELECT id, name, api_name_id, created_by, created_at
            FROM api_accounts
            WHERE $1::uuid IS NULL OR api_name_id = $1
            ORDER BY name
            ",
        )
        .bind(api_name_id.map(|id| id.as_uuid()))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get an account by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn get_by_id(&self, id: ApiAccountId) -> Result<Option<ApiAccount>, RepositoryError> {
        let row = sqlx::query_as::<_, ApiAccountRow>(
            r"
            SELECT id, name, api_name_id, created_by, created_at
            FROM api_accounts
            WHERE id = $1
            ",
        )
        .bind(id.as_uuid())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Create a new account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is taken under the same
    /// API name, or the API name does not exist.
    /// Returns `RepositoryError::InvalidInput` if the name is blank.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: &NewApiAccount) -> Result<ApiAccount, RepositoryError> {
        let name = input
            .normalized_name()
            .ok_or_else(|| RepositoryError::InvalidInput("name is required".to_owned()))?;

        let row = sqlx::query_as::<_, ApiAccountRow>(
            r"
            INSERT INTO api_accounts (id, name, api_name_id, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, api_name_id, created_by, created_at
            ",
        )
        .bind(ApiAccountId::generate().as_uuid())
        .bind(name)
        .bind(input.api_name_id.map(|id| id.as_uuid()))
        .bind(input.created_by.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "API account"))?;

        Ok(row.into())
    }
}
