//! Declared APIs: stored descriptions of a partner endpoint.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize, Serializer};
use url::Url;

use api_hub_core::{ApiAccountId, ApiNameId, DeclaredApiId, HttpMethod, KeyValue, with_query};

use crate::proxy::{ProxyCall, ProxyError};

/// Query parameters the connect flow lets the caller override per call.
pub const DATE_RANGE_PARAMS: [&str; 2] = ["created_at_min", "created_at_max"];

/// A declared partner endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclaredApi {
    pub id: DeclaredApiId,
    pub api_title: String,
    pub api_name_id: Option<ApiNameId>,
    pub api_account_id: Option<ApiAccountId>,
    pub base_url: String,
    /// `base_url` with the complete query parameters applied.
    pub main_url: String,
    pub method: HttpMethod,
    pub headers: Vec<KeyValue>,
    pub query_params: Vec<KeyValue>,
    /// Whether connecting should ask for a `created_at` range.
    pub uses_date_range: bool,
    pub variables: Vec<KeyValue>,
    pub callback_url: Option<String>,
    pub client_id: Option<String>,
    /// Never serialized; responses only say whether one is stored.
    #[serde(rename = "hasClientSecret", serialize_with = "serialize_presence")]
    pub client_secret: Option<SecretString>,
    pub redirect_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn serialize_presence<S: Serializer>(
    secret: &Option<SecretString>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_bool(secret.is_some())
}

/// Per-call options of `POST /api/declared-apis/{id}/connect`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectOptions {
    #[serde(default)]
    pub created_at_min: Option<String>,
    #[serde(default)]
    pub created_at_max: Option<String>,
    #[serde(default)]
    pub requested_by: Option<String>,
}

impl ConnectOptions {
    fn value_for(&self, key: &str) -> Option<&str> {
        let value = match key {
            "created_at_min" => self.created_at_min.as_deref(),
            "created_at_max" => self.created_at_max.as_deref(),
            _ => None,
        };
        value.map(str::trim).filter(|v| !v.is_empty())
    }
}

/// Whether `params` declares any of the `DATE_RANGE_PARAMS`.
#[must_use]
pub fn declares_date_range(params: &[KeyValue]) -> bool {
    params
        .iter()
        .any(|p| DATE_RANGE_PARAMS.iter().any(|key| p.key == *key))
}

impl DeclaredApi {
    /// Whether the declaration lists `key` among its query parameters.
    #[must_use]
    pub fn declares_param(&self, key: &str) -> bool {
        self.query_params.iter().any(|p| p.key == key)
    }

    /// The call the connect flow issues.
    ///
    /// Date-range values from `options` are applied only for parameters the
    /// declaration lists; they replace any stored value for that parameter.
    ///
    /// # Errors
    ///
    /// Returns `ProxyError::InvalidUrl` if an override has to be applied and
    /// `main_url` is not an absolute URL.
    pub fn connect_call(&self, options: &ConnectOptions) -> Result<ProxyCall, ProxyError> {
        let overrides: Vec<(&str, &str)> = DATE_RANGE_PARAMS
            .iter()
            .filter(|key| self.declares_param(key))
            .filter_map(|key| options.value_for(key).map(|value| (*key, value)))
            .collect();

        let url = if overrides.is_empty() {
            self.main_url.clone()
        } else {
            let mut url = Url::parse(&self.main_url).map_err(|source| ProxyError::InvalidUrl {
                url: self.main_url.clone(),
                source,
            })?;
            let kept: Vec<(String, String)> = url
                .query_pairs()
                .into_owned()
                .filter(|(key, _)| !overrides.iter().any(|(k, _)| k == key))
                .collect();
            url.query_pairs_mut()
                .clear()
                .extend_pairs(kept)
                .extend_pairs(overrides);
            url.to_string()
        };

        Ok(ProxyCall {
            url,
            method: self.method,
            headers: self.headers.clone(),
            params: Vec::new(),
        })
    }
}

/// Body of `POST /api/declared-apis` and `PUT /api/declared-apis/{id}`.
///
/// `apiName` / `apiAccount` name a catalog entry to create when the matching
/// `apiNameId` / `apiAccountId` is absent.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDeclaredApi {
    pub api_title: String,
    pub base_url: String,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default)]
    pub headers: Vec<KeyValue>,
    #[serde(default)]
    pub query_params: Vec<KeyValue>,
    #[serde(default)]
    pub variables: Vec<KeyValue>,
    #[serde(default)]
    pub callback_url: Option<String>,
    #[serde(default)]
    pub api_name: Option<String>,
    #[serde(default)]
    pub api_name_id: Option<ApiNameId>,
    #[serde(default)]
    pub api_account: Option<String>,
    #[serde(default)]
    pub api_account_id: Option<ApiAccountId>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub redirect_url: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
}

impl std::fmt::Debug for NewDeclaredApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewDeclaredApi")
            .field("api_title", &self.api_title)
            .field("base_url", &self.base_url)
            .field("method", &self.method)
            .field("api_name", &self.api_name)
            .field("api_name_id", &self.api_name_id)
            .field("api_account", &self.api_account)
            .field("api_account_id", &self.api_account_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

impl NewDeclaredApi {
    /// Check the fields a declaration cannot do without.
    ///
    /// # Errors
    ///
    /// Returns a message naming the offending field.
    pub fn validate(&self) -> Result<(), String> {
        if self.api_title.trim().is_empty() {
            return Err("apiTitle is required".to_string());
        }

        let base_url = self.base_url.trim();
        match Url::parse(base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
            _ => Err(format!("baseUrl must be an absolute http(s) URL: {base_url}")),
        }
    }

    /// `base_url` with the complete query parameters applied.
    #[must_use]
    pub fn main_url(&self) -> String {
        with_query(self.base_url.trim(), &self.query_params)
    }

    /// Name of an API name to create, when no existing ID was given.
    #[must_use]
    pub fn api_name_to_create(&self) -> Option<&str> {
        if self.api_name_id.is_some() {
            return None;
        }
        self.api_name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }

    /// Name of an API account to create, when no existing ID was given.
    #[must_use]
    pub fn api_account_to_create(&self) -> Option<&str> {
        if self.api_account_id.is_some() {
            return None;
        }
        self.api_account
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }
}
