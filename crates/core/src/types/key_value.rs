//! Key/value rows for headers, query parameters and variables.
//!
//! Declarations are edited as ordered lists of rows, and half-filled rows
//! (empty key or empty value) are common. Every consumer in this workspace
//! skips them, so the filtering lives here.

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// One header, query parameter or variable row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct KeyValue {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
}

impl KeyValue {
    /// Create a row.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// A row is usable only when both key and value are non-empty.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.key.is_empty() && !self.value.is_empty()
    }
}

/// URL-encode the complete rows of `pairs` as a query string.
///
/// Incomplete rows are skipped. Returns an empty string when nothing remains.
#[must_use]
pub fn encode_query<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        if !key.is_empty() && !value.is_empty() {
            serializer.append_pair(key, value);
        }
    }
    serializer.finish()
}

/// Append the complete rows of `params` to `base_url`.
///
/// Uses `&` when `base_url` already carries a query string and `?` otherwise.
/// Returns `base_url` unchanged when no complete row exists.
#[must_use]
pub fn with_query(base_url: &str, params: &[KeyValue]) -> String {
    let query = encode_query(params.iter().map(|p| (p.key.as_str(), p.value.as_str())));
    if query.is_empty() {
        return base_url.to_string();
    }
    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!("{base_url}{separator}{query}")
}
