//! Ad-hoc proxy call.
//!
//! Uses the same paginating client as `POST /api/apiCall`, configured from
//! the `PROXY_*` environment variables.

use api_hub_core::{HttpMethod, KeyValue, ParseMethodError};
use api_hub_server::config::{ConfigError, ProxyConfig};
use api_hub_server::proxy::{ApiProxy, ProxyCall, ProxyError};
use serde_json::json;
use thiserror::Error;

/// Errors that can occur during a call.
#[derive(Debug, Error)]
pub enum CallError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Method(#[from] ParseMethodError),

    #[error(transparent)]
    Proxy(#[from] ProxyError),

    #[error("Failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

/// Parse a `KEY=VALUE` argument. The value may itself contain `=`.
///
/// # Errors
///
/// Returns a message if there is no `=` or the key is empty.
pub fn parse_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got `{raw}`")),
    }
}

fn rows(pairs: Vec<(String, String)>) -> Vec<KeyValue> {
    pairs
        .into_iter()
        .map(|(key, value)| KeyValue::new(key, value))
        .collect()
}

/// Fetch every page of `url` and print `{"data": [...]}` to stdout.
///
/// # Errors
///
/// Returns `CallError` for invalid configuration or method, and for any
/// proxy failure.
pub async fn run(
    url: String,
    method: &str,
    headers: Vec<(String, String)>,
    params: Vec<(String, String)>,
) -> Result<(), CallError> {
    let proxy = ApiProxy::new(&ProxyConfig::from_env()?)?;
    let call = ProxyCall {
        url,
        method: method.parse::<HttpMethod>()?,
        headers: rows(headers),
        params: rows(params),
    };

    let data = proxy.fetch_all(&call).await?;
    tracing::info!(records = data.len(), "Call complete");

    let output = serde_json::to_string_pretty(&json!({ "data": data }))?;
    #[allow(clippy::print_stdout)]
    {
        println!("{output}");
    }
    Ok(())
}
