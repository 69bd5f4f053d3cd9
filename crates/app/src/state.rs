//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{AppConfig, ShopifyAppConfig};
use crate::shopify::{AdminClient, ShopSession};
use crate::webhooks::AdminWebhookRegistrar;

/// Application state shared across all handlers.
///
/// Cheap to clone via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    http: reqwest::Client,
    registrar: AdminWebhookRegistrar,
    admin_endpoint: Option<String>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: AppConfig) -> Result<Self, reqwest::Error> {
        Self::build(config, None)
    }

    /// Create a state whose Admin API calls all go to `endpoint`, whatever
    /// the shop. Used to point the app at a local stand-in for Shopify.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_admin_endpoint(
        config: AppConfig,
        endpoint: impl Into<String>,
    ) -> Result<Self, reqwest::Error> {
        Self::build(config, Some(endpoint.into()))
    }

    fn build(config: AppConfig, admin_endpoint: Option<String>) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        let registrar = AdminWebhookRegistrar::from_config(&config.shopify);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                http,
                registrar,
                admin_endpoint,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn shopify(&self) -> &ShopifyAppConfig {
        &self.inner.config.shopify
    }

    #[must_use]
    pub fn registrar(&self) -> &AdminWebhookRegistrar {
        &self.inner.registrar
    }

    /// Admin API client acting for `session`.
    #[must_use]
    pub fn admin_client(&self, session: &ShopSession) -> AdminClient {
        let http = self.inner.http.clone();
        match &self.inner.admin_endpoint {
            Some(endpoint) => AdminClient::with_endpoint(http, session, endpoint.clone()),
            None => AdminClient::new(http, session, &self.shopify().api_version),
        }
    }
}
