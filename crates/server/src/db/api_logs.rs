//! Call log repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use api_hub_core::{ApiLogId, ApiStatus, DeclaredApiId};

use super::RepositoryError;
use crate::models::{ApiLogEntry, NewApiLogEntry};

/// Page size of `list_recent` when none is given.
pub const DEFAULT_LOG_LIMIT: i64 = 50;

/// Largest page `list_recent` returns.
pub const MAX_LOG_LIMIT: i64 = 500;

#[derive(Debug, sqlx::FromRow)]
struct ApiLogRow {
    id: Uuid,
    declared_api_id: Option<Uuid>,
    api_title: String,
    status: ApiStatus,
    main_url: String,
    requested_by: Option<String>,
    record_count: i32,
    error: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ApiLogRow> for ApiLogEntry {
    fn from(row: ApiLogRow) -> Self {
        Self {
            id: ApiLogId::new(row.id),
            declared_api_id: row.declared_api_id.map(DeclaredApiId::new),
            api_title: row.api_title,
            status: row.status,
            main_url: row.main_url,
            requested_by: row.requested_by,
            record_count: row.record_count,
            error: row.error,
            created_at: row.created_at,
        }
    }
}

/// Clamp a requested page size to `1..=MAX_LOG_LIMIT`.
#[must_use]
pub fn clamp_limit(requested: Option<i64>) -> i64 {
    requested.unwrap_or(DEFAULT_LOG_LIMIT).clamp(1, MAX_LOG_LIMIT)
}

/// Repository for call log database operations.
pub struct ApiLogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ApiLogRepository<'a> {
    /// Create a new call log repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a connect attempt.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    #[instrument(skip(self, entry), fields(api_title = %entry.api_title, status = %entry.status))]
    pub async fn insert(&self, entry: &NewApiLogEntry) -> Result<ApiLogEntry, RepositoryError> {
        let row = sqlx::query_as::<_, ApiLogRow>(
            r"
            INSERT INTO api_logs (
                id, declared_api_id, api_title, status, main_url,
                requested_by, record_count, error
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, declared_api_id, api_title, status, main_url,
                      requested_by, record_count, error, created_at
            ",
        )
        .bind(ApiLogId::generate().as_uuid())
        .bind(entry.declared_api_id.map(|id| id.as_uuid()))
        .bind(&entry.api_title)
        .bind(entry.status)
        .bind(&entry.main_url)
        .bind(entry.requested_by.as_deref())
        .bind(entry.record_count)
        .bind(entry.error.as_deref())
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Most recent entries first, optionally for one declaration only.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list_recent(
        &self,
        declared_api_id: Option<DeclaredApiId>,
        limit: i64,
    ) -> Result<Vec<ApiLogEntry>, RepositoryError> {
        let rows = sqlx::query_as::<_, ApiLogRow>(
            r"
            SELECT id, declared_api_id, api_title, status, main_url,
                   requested_by, record_count, error, created_at
            FROM api_logs
            WHERE $1::uuid IS NULL OR declared_api_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            ",
        )
        .bind(declared_api_id.map(|id| id.as_uuid()))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None), 50);
        assert_eq!(clamp_limit(Some(10)), 10);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(-3)), 1);
        assert_eq!(clamp_limit(Some(10_000)), 500);
    }
}
