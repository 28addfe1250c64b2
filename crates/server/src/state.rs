//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::HubConfig;
use crate::pinterest::PinterestClient;
use crate::proxy::{ApiProxy, ProxyError};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: HubConfig,
    pool: PgPool,
    proxy: ApiProxy,
    pinterest: PinterestClient,
}

impl AppState {
    /// Build the state, creating the outbound HTTP clients from `config`.
    ///
    /// The proxy and the Pinterest client share one connection pool.
    ///
    /// # Errors
    ///
    /// Returns `ProxyError::Http` if the HTTP client fails to build.
    pub fn new(config: HubConfig, pool: PgPool) -> Result<Self, ProxyError> {
        let proxy = ApiProxy::new(&config.proxy)?;
        let pinterest = PinterestClient::new(proxy.http_client().clone(), &config.pinterest);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                proxy,
                pinterest,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &HubConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn proxy(&self) -> &ApiProxy {
        &self.inner.proxy
    }

    #[must_use]
    pub fn pinterest(&self) -> &PinterestClient {
        &self.inner.pinterest
    }
}
