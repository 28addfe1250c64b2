//! Inbound `apiCall` payload and the validated call plan derived from it.

use api_hub_core::{HttpMethod, KeyValue, with_query};
use serde::Deserialize;
use serde_json::{Map, Value};
use url::Url;

use super::ProxyError;

/// Marker URL the dashboard sends to request a Pinterest code exchange.
pub const PINTEREST_TOKEN_MARKER: &str = "pinterest/token";

/// JSON body of `POST /api/apiCall`.
///
/// Header and parameter values arrive as loosely typed JSON: strings are
/// used as-is, numbers and booleans are stringified, everything else is
/// dropped.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCallRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub headers: Option<Map<String, Value>>,
    #[serde(default)]
    pub params: Option<Map<String, Value>>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub redirect_url: Option<String>,
}

impl std::fmt::Debug for ApiCallRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCallRequest")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("header_names", &self.headers.as_ref().map(|h| h.keys().collect::<Vec<_>>()))
            .field("params", &self.params)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "[REDACTED]"))
            .field("redirect_url", &self.redirect_url)
            .finish()
    }
}

impl ApiCallRequest {
    /// The target URL, if present and non-blank.
    #[must_use]
    pub fn target_url(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }

    /// Whether this call asks for a Pinterest OAuth code exchange.
    #[must_use]
    pub fn is_pinterest_token_exchange(&self) -> bool {
        self.target_url()
            .is_some_and(|u| u.trim_matches('/').eq_ignore_ascii_case(PINTEREST_TOKEN_MARKER))
    }

    /// Look up a parameter value as a string.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<String> {
        self.params
            .as_ref()
            .and_then(|p| p.get(key))
            .and_then(scalar_to_string)
            .filter(|v| !v.is_empty())
    }
}

/// Stringify a scalar JSON value; `null`, arrays and objects yield `None`.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn rows_from_map(map: Option<&Map<String, Value>>) -> Vec<KeyValue> {
    map.into_iter()
        .flatten()
        .filter_map(|(key, value)| scalar_to_string(value).map(|v| KeyValue::new(key.clone(), v)))
        .filter(KeyValue::is_complete)
        .collect()
}

/// A validated outbound call: target, method, headers and first-page params.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyCall {
    pub url: String,
    pub method: HttpMethod,
    pub headers: Vec<KeyValue>,
    pub params: Vec<KeyValue>,
}

impl ProxyCall {
    /// Build a call with no extra headers or parameters.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Get,
            headers: Vec::new(),
            params: Vec::new(),
        }
    }

    /// URL of the first page: target plus encoded params.
    ///
    /// # Errors
    ///
    /// Returns `ProxyError::InvalidUrl` if the result is not an absolute URL.
    pub fn first_page_url(&self) -> Result<Url, ProxyError> {
        parse_url(&with_query(&self.url, &self.params))
    }

    /// URL of a follow-up page: origin and path of the target, with the
    /// cursor as the only query parameter.
    ///
    /// # Errors
    ///
    /// Returns `ProxyError::InvalidUrl` if the target is not an absolute URL.
    pub fn next_page_url(&self, page_info: &str) -> Result<Url, ProxyError> {
        let mut url = parse_url(&self.url)?;
        url.set_fragment(None);
        url.set_query(None);
        url.query_pairs_mut().append_pair("page_info", page_info);
        Ok(url)
    }
}

fn parse_url(raw: &str) -> Result<Url, ProxyError> {
    Url::parse(raw).map_err(|source| ProxyError::InvalidUrl {
        url: raw.to_string(),
        source,
    })
}

impl TryFrom<&ApiCallRequest> for ProxyCall {
    type Error = ProxyError;

    fn try_from(request: &ApiCallRequest) -> Result<Self, Self::Error> {
        let url = request
            .target_url()
            .ok_or_else(|| ProxyError::InvalidRequest("URL is required".to_string()))?
            .to_string();

        let method = match request.method.as_deref().map(str::trim) {
            None | Some("") => HttpMethod::default(),
            Some(raw) => raw
                .parse()
                .map_err(|e: api_hub_core::ParseMethodError| ProxyError::InvalidRequest(e.to_string()))?,
        };

        Ok(Self {
            url,
            method,
            headers: rows_from_map(request.headers.as_ref()),
            params: rows_from_map(request.params.as_ref()),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(body: Value) -> ApiCallRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_missing_url_is_rejected() {
        let err = ProxyCall::try_from(&request(json!({"method": "GET"}))).unwrap_err();
        assert_eq!(err.to_string(), "invalid request: URL is required");

        let err = ProxyCall::try_from(&request(json!({"url": "   "}))).unwrap_err();
        assert!(matches!(err, ProxyError::InvalidRequest(_)));
    }

    #[test]
    fn test_method_defaults_to_get_and_rejects_unknown() {
        let call = ProxyCall::try_from(&request(json!({"url": "https://a.example.com"}))).unwrap();
        assert_eq!(call.method, HttpMethod::Get);

        let err = ProxyCall::try_from(&request(json!({"url": "https://a.example.com", "method": "BREW"})))
            .unwrap_err();
        assert!(matches!(err, ProxyError::InvalidRequest(_)));
    }

    #[test]
    fn test_empty_and_non_scalar_headers_are_dropped() {
        let call = ProxyCall::try_from(&request(json!({
            "url": "https://a.example.com",
            "headers": {
                "X-Shopify-Access-Token": "shpat_123",
                "X-Empty": "",
                "": "no-key",
                "X-Null": null,
                "X-Retry": 3
            }
        })))
        .unwrap();

        let mut names: Vec<_> = call.headers.iter().map(|h| h.key.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, vec!["X-Retry", "X-Shopify-Access-Token"]);
    }

    #[test]
    fn test_first_page_url_appends_params() {
        let mut call = ProxyCall::get("https://shop.example.com/admin/products.json");
        call.params = vec![KeyValue::new("limit", "250")];
        assert_eq!(
            call.first_page_url().unwrap().as_str(),
            "https://shop.example.com/admin/products.json?limit=250"
        );

        call.url = "https://shop.example.com/admin/orders.json?status=any".to_string();
        assert_eq!(
            call.first_page_url().unwrap().as_str(),
            "https://shop.example.com/admin/orders.json?status=any&limit=250"
        );
    }

    #[test]
    fn test_first_page_url_rejects_relative() {
        let err = ProxyCall::get("products.json").first_page_url().unwrap_err();
        assert!(matches!(err, ProxyError::InvalidUrl { .. }));
    }

    #[test]
    fn test_next_page_url_keeps_only_cursor() {
        let call = ProxyCall::get("https://shop.example.com/admin/orders.json?status=any&limit=250#top");
        assert_eq!(
            call.next_page_url("eyJsYXN0X2lkIjo0fQ").unwrap().as_str(),
            "https://shop.example.com/admin/orders.json?page_info=eyJsYXN0X2lkIjo0fQ"
        );
    }

    #[test]
    fn test_pinterest_marker_detection() {
        assert!(request(json!({"url": "pinterest/token"})).is_pinterest_token_exchange());
        assert!(request(json!({"url": "/Pinterest/Token/"})).is_pinterest_token_exchange());
        assert!(!request(json!({"url": "https://api.pinterest.com/v5/boards"})).is_pinterest_token_exchange());
    }

    #[test]
    fn test_param_lookup_stringifies() {
        let req = request(json!({"params": {"code": "abc", "n": 5, "empty": ""}}));
        assert_eq!(req.param("code").as_deref(), Some("abc"));
        assert_eq!(req.param("n").as_deref(), Some("5"));
        assert_eq!(req.param("empty"), None);
    }

    #[test]
    fn test_debug_redacts_client_secret() {
        let req = request(json!({"url": "pinterest/token", "clientSecret": "pinterest-secret-value"}));
        let debug_output = format!("{req:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("pinterest-secret-value"));
    }
}
