//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - `PostgreSQL` connection string
//!
//! ## Optional
//! - `HUB_HOST` - Bind address (default: 127.0.0.1)
//! - `HUB_PORT` - Listen port (default: 3001)
//! - `HUB_API_TOKEN` - Shared token guarding `/api/*` (unset = open)
//! - `HUB_LOG_FORMAT` - `json` for structured logs, anything else for text
//! - `PROXY_PAGE_DELAY_MS` - Pause between paginated requests (default: 3000)
//! - `PROXY_TIMEOUT_SECS` - Timeout per upstream request (default: 30)
//! - `PROXY_MAX_PAGES` - Stop paginating after this many pages (default: unlimited)
//! - `PINTEREST_TOKEN_URL` - OAuth token endpoint
//! - `PINTEREST_AUTHORIZE_URL` - OAuth consent page
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const MIN_API_TOKEN_LENGTH: usize = 24;

/// Default pause between paginated requests.
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(3000);
/// Default timeout for a single upstream request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_PINTEREST_TOKEN_URL: &str = "https://api.pinterest.com/v5/oauth/token";
pub const DEFAULT_PINTEREST_AUTHORIZE_URL: &str = "https://www.pinterest.com/oauth/";
pub const DEFAULT_PINTEREST_SCOPES: &[&str] =
    &["boards:read", "boards:write", "pins:read", "pins:write"];

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Shared token required on `/api/*` when set
    pub api_token: Option<SecretString>,
    /// Emit JSON logs instead of text
    pub json_logs: bool,
    /// Outbound proxy behaviour
    pub proxy: ProxyConfig,
    /// Pinterest OAuth endpoints
    pub pinterest: PinterestConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Outbound proxy and pagination settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Pause before requesting the next page.
    pub page_delay: Duration,
    /// Timeout for each upstream request.
    pub request_timeout: Duration,
    /// Upper bound on pages fetched per call. `None` follows every cursor.
    pub max_pages: Option<u32>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            page_delay: DEFAULT_PAGE_DELAY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_pages: None,
        }
    }
}

impl ProxyConfig {
    /// Read the `PROXY_*` variables, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` for malformed numbers or a page
    /// cap of zero.
    pub fn from_env() -> Result<Self, ConfigError> {
        let page_delay_ms = parse_optional_env::<u64>("PROXY_PAGE_DELAY_MS")?;
        let timeout_secs = parse_optional_env::<u64>("PROXY_TIMEOUT_SECS")?;
        let max_pages = parse_optional_env::<u32>("PROXY_MAX_PAGES")?;

        if max_pages == Some(0) {
            return Err(ConfigError::InvalidEnvVar(
                "PROXY_MAX_PAGES".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            page_delay: page_delay_ms.map_or(DEFAULT_PAGE_DELAY, Duration::from_millis),
            request_timeout: timeout_secs.map_or(DEFAULT_REQUEST_TIMEOUT, Duration::from_secs),
            max_pages,
        })
    }
}

/// Pinterest OAuth endpoints and requested scopes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinterestConfig {
    /// Token exchange endpoint
    pub token_url: String,
    /// Consent page the user is redirected to
    pub authorize_url: String,
    /// Scopes requested on the consent page
    pub scopes: Vec<String>,
}

impl Default for PinterestConfig {
    fn default() -> Self {
        Self {
            token_url: DEFAULT_PINTEREST_TOKEN_URL.to_string(),
            authorize_url: DEFAULT_PINTEREST_AUTHORIZE_URL.to_string(),
            scopes: DEFAULT_PINTEREST_SCOPES
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

impl PinterestConfig {
    /// Read the `PINTEREST_*` endpoint overrides.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            token_url: get_optional_env("PINTEREST_TOKEN_URL").unwrap_or(defaults.token_url),
            authorize_url: get_optional_env("PINTEREST_AUTHORIZE_URL")
                .unwrap_or(defaults.authorize_url),
            scopes: defaults.scopes,
        }
    }
}

impl HubConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the API token fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_required_secret("DATABASE_URL")?;
        let host = get_env_or_default("HUB_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("HUB_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("HUB_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("HUB_PORT".to_string(), e.to_string()))?;

        let api_token = match get_optional_env("HUB_API_TOKEN") {
            Some(token) => {
                validate_api_token(&token, "HUB_API_TOKEN")?;
                Some(SecretString::from(token))
            }
            None => None,
        };

        let json_logs = get_optional_env("HUB_LOG_FORMAT").is_some_and(|f| f == "json");
        let proxy = ProxyConfig::from_env()?;
        let pinterest = PinterestConfig::from_env();

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.0);

        Ok(Self {
            database_url,
            host,
            port,
            api_token,
            json_logs,
            proxy,
            pinterest,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Configuration suitable for tests and local tooling: no token guard,
    /// no Sentry, default proxy and Pinterest settings.
    #[must_use]
    pub fn local(database_url: impl Into<String>) -> Self {
        Self {
            database_url: SecretString::from(database_url.into()),
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3001,
            api_token: None,
            json_logs: false,
            proxy: ProxyConfig::default(),
            pinterest: PinterestConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an optional environment variable, failing on malformed values.
fn parse_optional_env<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
        .transpose()
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Validate the shared API token: long enough, not a placeholder, random-looking.
fn validate_api_token(token: &str, var_name: &str) -> Result<(), ConfigError> {
    if token.len() < MIN_API_TOKEN_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {MIN_API_TOKEN_LENGTH} characters (got {})",
                token.len()
            ),
        ));
    }
    validate_secret_strength(token, var_name)
}
