//! Call log entries written by the declared-API connect flow.

use chrono::{DateTime, Utc};
use serde::Serialize;

use api_hub_core::{ApiLogId, ApiStatus, DeclaredApiId};

/// One recorded connect attempt.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLogEntry {
    pub id: ApiLogId,
    pub declared_api_id: Option<DeclaredApiId>,
    pub api_title: String,
    pub status: ApiStatus,
    pub main_url: String,
    pub requested_by: Option<String>,
    /// Number of merged records (0 on failure).
    pub record_count: i32,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Values for a new log entry.
#[derive(Debug, Clone)]
pub struct NewApiLogEntry {
    pub declared_api_id: Option<DeclaredApiId>,
    pub api_title: String,
    pub status: ApiStatus,
    pub main_url: String,
    pub requested_by: Option<String>,
    pub record_count: i32,
    pub error: Option<String>,
}

impl NewApiLogEntry {
    /// Entry for a call that returned `record_count` records.
    #[must_use]
    pub fn success(
        declared_api_id: DeclaredApiId,
        api_title: &str,
        main_url: &str,
        requested_by: Option<String>,
        record_count: usize,
    ) -> Self {
        Self {
            declared_api_id: Some(declared_api_id),
            api_title: api_title.to_string(),
            status: ApiStatus::Success,
            main_url: main_url.to_string(),
            requested_by,
            record_count: i32::try_from(record_count).unwrap_or(i32::MAX),
            error: None,
        }
    }

    /// Entry for a call that failed with `error`.
    #[must_use]
    pub fn failure(
        declared_api_id: DeclaredApiId,
        api_title: &str,
        main_url: &str,
        requested_by: Option<String>,
        error: String,
    ) -> Self {
        Self {
            declared_api_id: Some(declared_api_id),
            api_title: api_title.to_string(),
            status: ApiStatus::Failure,
            main_url: main_url.to_string(),
            requested_by,
            record_count: 0,
            error: Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_entry() {
        let entry = NewApiLogEntry::success(
            DeclaredApiId::generate(),
            "Products",
            "https://shop.example.com/admin/products.json",
            Some("ops@example.com".to_string()),
            42,
        );
        assert_eq!(entry.status, ApiStatus::Success);
        assert_eq!(entry.record_count, 42);
        assert!(entry.error.is_none());
    }

    #[test]
    fn test_failure_entry() {
        let entry = NewApiLogEntry::failure(
            DeclaredApiId::generate(),
            "Orders",
            "https://shop.example.com/admin/orders.json",
            None,
            "HTTP error! status: 401, details: Unauthorized".to_string(),
        );
        assert_eq!(entry.status, ApiStatus::Failure);
        assert_eq!(entry.record_count, 0);
        assert!(entry.error.as_deref().is_some_and(|e| e.contains("401")));
    }
}
