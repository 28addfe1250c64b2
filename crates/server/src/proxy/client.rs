//! Paginating HTTP client.

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, LINK};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::link::next_page_info;
use super::merge::{PageShape, merge_page};
use super::{ProxyCall, ProxyError};
use crate::config::ProxyConfig;

/// Follows cursor pagination of a partner API and gathers every page.
#[derive(Debug, Clone)]
pub struct ApiProxy {
    client: reqwest::Client,
    page_delay: Duration,
    max_pages: Option<u32>,
}

impl ApiProxy {
    /// Create a proxy with its own connection pool.
    ///
    /// # Errors
    ///
    /// Returns `ProxyError::Http` if the HTTP client fails to build.
    pub fn new(config: &ProxyConfig) -> Result<Self, ProxyError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("api-hub/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            page_delay: config.page_delay,
            max_pages: config.max_pages,
        })
    }

    /// The shared HTTP client, for other outbound integrations.
    #[must_use]
    pub const fn http_client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Fetch the first page of `call` and every page its `Link` headers
    /// point to, merging all bodies into one array.
    ///
    /// # Errors
    ///
    /// Fails on the first transport error, non-2xx response or non-JSON body.
    /// Records gathered before the failure are discarded.
    #[instrument(skip(self, call), fields(url = %call.url, method = %call.method))]
    pub async fn fetch_all(&self, call: &ProxyCall) -> Result<Vec<Value>, ProxyError> {
        let headers = build_headers(call)?;
        let method = reqwest::Method::from_bytes(call.method.as_str().as_bytes())
            .map_err(|e| ProxyError::InvalidRequest(e.to_string()))?;

        let mut records = Vec::new();
        let mut url = call.first_page_url()?;
        let mut pages: u32 = 0;

        loop {
            debug!(request_url = %url, "Requesting page");
            let response = self
                .client
                .request(method.clone(), url)
                .headers(headers.clone())
                .send()
                .await?;

            let status = response.status();
            let cursor = response
                .headers()
                .get(LINK)
                .and_then(|v| v.to_str().ok())
                .and_then(next_page_info);

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                warn!(status = status.as_u16(), body = %body, "Upstream returned an error");
                return Err(ProxyError::Upstream {
                    status: status.as_u16(),
                    body,
                });
            }

            let bytes = response.bytes().await?;
            let body: Value = serde_json::from_slice(&bytes)
                .map_err(|e| ProxyError::Decode(e.to_string()))?;

            let before = records.len();
            let shape = merge_page(&mut records, body);
            pages += 1;

            if shape == PageShape::Unrecognized {
                warn!(page = pages, "Unexpected response format, nothing merged");
            } else {
                debug!(
                    page = pages,
                    shape = shape.as_str(),
                    merged = records.len() - before,
                    "Merged page"
                );
            }

            let Some(page_info) = cursor else {
                break;
            };

            if self.max_pages.is_some_and(|max| pages >= max) {
                warn!(pages, "Page limit reached, stopping pagination early");
                break;
            }

            tokio::time::sleep(self.page_delay).await;
            url = call.next_page_url(&page_info)?;
        }

        info!(pages, total = records.len(), "Fetched all pages");
        Ok(records)
    }
}

/// `Content-Type: application/json` followed by the caller's headers, which
/// replace it when they name it too.
fn build_headers(call: &ProxyCall) -> Result<HeaderMap, ProxyError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    for row in call.headers.iter().filter(|h| h.is_complete()) {
        let name = HeaderName::from_bytes(row.key.as_bytes())
            .map_err(|_| ProxyError::InvalidHeader(row.key.clone()))?;
        let value = HeaderValue::from_str(&row.value)
            .map_err(|_| ProxyError::InvalidHeader(row.key.clone()))?;
        headers.insert(name, value);
    }

    Ok(headers)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use api_hub_core::KeyValue;

    #[test]
    fn test_build_headers_caller_overrides_content_type() {
        let mut call = ProxyCall::get("https://a.example.com");
        call.headers = vec![
            KeyValue::new("Content-Type", "application/x-www-form-urlencoded"),
            KeyValue::new("X-Shopify-Access-Token", "shpat_abc"),
        ];
        let headers = build_headers(&call).unwrap();
        assert_eq!(
            headers.get(CONTENT_TYPE).unwrap(),
            "application/x-www-form-urlencoded"
        );
        assert_eq!(headers.get("x-shopify-access-token").unwrap(), "shpat_abc");
    }

    #[test]
    fn test_build_headers_rejects_invalid_name() {
        let mut call = ProxyCall::get("https://a.example.com");
        call.headers = vec![KeyValue::new("Bad Header", "v")];
        let err = build_headers(&call).unwrap_err();
        assert_eq!(err.to_string(), "invalid header: Bad Header");
    }
}
