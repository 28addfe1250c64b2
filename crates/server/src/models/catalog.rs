//! API names (provider families) and API accounts grouped under them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use api_hub_core::{ApiAccountId, ApiNameId};

/// A provider family such as "Shopify" or "Pinterest".
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiName {
    pub id: ApiNameId,
    pub name: String,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A named credential grouping under which declared APIs are tested.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAccount {
    pub id: ApiAccountId,
    pub name: String,
    pub api_name_id: Option<ApiNameId>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /api/api-names`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewApiName {
    pub name: String,
    #[serde(default)]
    pub created_by: Option<String>,
}

/// Body of `POST /api/api-accounts`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewApiAccount {
    pub name: String,
    #[serde(default)]
    pub api_name_id: Option<ApiNameId>,
    #[serde(default)]
    pub created_by: Option<String>,
}

impl NewApiName {
    /// Trimmed name, or `None` when blank.
    #[must_use]
    pub fn normalized_name(&self) -> Option<&str> {
        Some(self.name.trim()).filter(|n| !n.is_empty())
    }
}

impl NewApiAccount {
    /// Trimmed name, or `None` when blank.
    #[must_use]
    pub fn normalized_name(&self) -> Option<&str> {
        Some(self.name.trim()).filter(|n| !n.is_empty())
    }
}
