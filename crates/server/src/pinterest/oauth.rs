//! Authorization-code exchange and consent-page URL construction.

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{info, instrument, warn};
use url::Url;

use super::PinterestError;
use crate::config::PinterestConfig;

/// App credentials registered with Pinterest.
#[derive(Clone)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: SecretString,
    /// Must match the redirect URI used on the consent page.
    pub redirect_uri: Option<String>,
}

impl std::fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

impl OAuthCredentials {
    /// Assemble credentials from optional parts, rejecting blanks.
    ///
    /// # Errors
    ///
    /// Returns `PinterestError::MissingField` when the client ID or secret
    /// is absent or empty.
    pub fn from_parts(
        client_id: Option<&str>,
        client_secret: Option<&str>,
        redirect_uri: Option<&str>,
    ) -> Result<Self, PinterestError> {
        let client_id = client_id
            .filter(|v| !v.is_empty())
            .ok_or(PinterestError::MissingField("clientId"))?;
        let client_secret = client_secret
            .filter(|v| !v.is_empty())
            .ok_or(PinterestError::MissingField("clientSecret"))?;

        Ok(Self {
            client_id: client_id.to_string(),
            client_secret: SecretString::from(client_secret.to_string()),
            redirect_uri: redirect_uri.filter(|v| !v.is_empty()).map(String::from),
        })
    }
}

/// Client for the Pinterest OAuth token endpoint.
#[derive(Debug, Clone)]
pub struct PinterestClient {
    http: reqwest::Client,
    token_url: String,
}

impl PinterestClient {
    /// Create a client sharing an existing connection pool.
    #[must_use]
    pub fn new(http: reqwest::Client, config: &PinterestConfig) -> Self {
        Self {
            http,
            token_url: config.token_url.clone(),
        }
    }

    /// Trade an authorization `code` for an access token.
    ///
    /// Returns Pinterest's JSON response unchanged (`access_token`,
    /// `refresh_token`, `expires_in`, `scope`, ...).
    ///
    /// # Errors
    ///
    /// Returns `PinterestError::Rejected` if Pinterest answers non-2xx, and
    /// `PinterestError::Http` / `PinterestError::Parse` on transport or
    /// decoding failures.
    #[instrument(skip(self, credentials, code), fields(client_id = %credentials.client_id))]
    pub async fn exchange_code(
        &self,
        credentials: &OAuthCredentials,
        code: &str,
    ) -> Result<Value, PinterestError> {
        if code.is_empty() {
            return Err(PinterestError::MissingField("code"));
        }

        let mut form = vec![("grant_type", "authorization_code"), ("code", code)];
        if let Some(redirect_uri) = credentials.redirect_uri.as_deref() {
            form.push(("redirect_uri", redirect_uri));
        }

        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(
                &credentials.client_id,
                Some(credentials.client_secret.expose_secret()),
            )
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(status = status.as_u16(), "Pinterest token exchange rejected");
            return Err(PinterestError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let token: Value = response
            .json()
            .await
            .map_err(|e| PinterestError::Parse(format!("Failed to parse token response: {e}")))?;

        info!("Pinterest token exchange succeeded");
        Ok(token)
    }
}

/// Build the consent-page URL the user is sent to.
///
/// # Errors
///
/// Returns `PinterestError::InvalidAuthorizeUrl` if the configured consent
/// page is not a valid URL.
pub fn authorize_url(
    config: &PinterestConfig,
    client_id: &str,
    redirect_uri: &str,
) -> Result<Url, PinterestError> {
    let mut url = Url::parse(&config.authorize_url)?;
    url.query_pairs_mut()
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("response_type", "code")
        .append_pair("scope", &config.scopes.join(","));
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize_url() {
        let url = authorize_url(
            &PinterestConfig::default(),
            "1484362",
            "https://hub.example.com/callback",
        )
        .unwrap();

        assert_eq!(url.host_str(), Some("www.pinterest.com"));
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("client_id".to_string(), "1484362".to_string()),
                (
                    "redirect_uri".to_string(),
                    "https://hub.example.com/callback".to_string()
                ),
                ("response_type".to_string(), "code".to_string()),
                (
                    "scope".to_string(),
                    "boards:read,boards:write,pins:read,pins:write".to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_credentials_require_id_and_secret() {
        let err = OAuthCredentials::from_parts(None, Some("s"), None).unwrap_err();
        assert_eq!(err.to_string(), "Missing clientId");

        let err = OAuthCredentials::from_parts(Some("id"), Some(""), None).unwrap_err();
        assert_eq!(err.to_string(), "Missing clientSecret");

        let creds = OAuthCredentials::from_parts(Some("id"), Some("s"), Some("")).unwrap();
        assert!(creds.redirect_uri.is_none());
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let creds =
            OAuthCredentials::from_parts(Some("id"), Some("pinterest-app-secret"), None).unwrap();
        let debug_output = format!("{creds:?}");
        assert!(!debug_output.contains("pinterest-app-secret"));
        assert!(debug_output.contains("[REDACTED]"));
    }
}
