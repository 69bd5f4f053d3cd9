//! Webhook subscription for an authenticated shop.
//!
//! Runs on every authentication, so a topic that is already subscribed to the
//! same callback counts as registered rather than as a failure.

use std::future::Future;

use preferences_core::{UserError, format_user_errors};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument};

use crate::config::ShopifyAppConfig;
use crate::shopify::{AdminClient, AdminShopifyError, WebhookSubscriptionOutcome};

/// Webhook registration failed for a topic.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The subscription request did not complete.
    #[error("webhook subscription for {topic} failed: {source}")]
    Remote {
        topic: String,
        #[source]
        source: AdminShopifyError,
    },

    /// Shopify refused the subscription.
    #[error("webhook subscription for {topic} rejected: {}", format_user_errors(.errors))]
    Rejected {
        topic: String,
        errors: Vec<UserError>,
    },
}

/// Registration state of one topic after a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WebhookStatus {
    Created { subscription_id: String },
    AlreadyRegistered,
}

/// A topic the shop is now subscribed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisteredWebhook {
    pub topic: String,
    #[serde(flatten)]
    pub status: WebhookStatus,
}

/// Subscribes a shop to the app's webhook topics.
pub trait WebhookRegistrar: Send + Sync {
    /// Register every topic for the shop behind `client`.
    fn register(
        &self,
        client: &AdminClient,
    ) -> impl Future<Output = Result<Vec<RegisteredWebhook>, WebhookError>> + Send;
}

/// Registers the configured topics through the Admin API.
#[derive(Debug, Clone)]
pub struct AdminWebhookRegistrar {
    topics: Vec<String>,
    callback_url: String,
}

impl AdminWebhookRegistrar {
    /// Create a registrar for `topics`, all delivered to `callback_url`.
    #[must_use]
    pub fn new(topics: Vec<String>, callback_url: impl Into<String>) -> Self {
        Self {
            topics,
            callback_url: callback_url.into(),
        }
    }

    /// Create a registrar from the app configuration.
    #[must_use]
    pub fn from_config(config: &ShopifyAppConfig) -> Self {
        Self::new(config.webhook_topics.clone(), config.webhook_callback_url())
    }

    /// Topics this registrar subscribes to, in order.
    #[must_use]
    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    /// Callback URL every subscription delivers to.
    #[must_use]
    pub fn callback_url(&self) -> &str {
        &self.callback_url
    }
}

impl WebhookRegistrar for AdminWebhookRegistrar {
    #[instrument(skip_all, fields(shop = %client.shop(), topics = self.topics.len()))]
    async fn register(&self, client: &AdminClient) -> Result<Vec<RegisteredWebhook>, WebhookError> {
        let mut registered = Vec::with_capacity(self.topics.len());

        for topic in &self.topics {
            let outcome = client
                .create_webhook_subscription(topic, &self.callback_url)
                .await
                .map_err(|source| WebhookError::Remote {
                    topic: topic.clone(),
                    source,
                })?;

            let status = match outcome {
                WebhookSubscriptionOutcome::Created(subscription) => {
                    info!(topic = %topic, subscription_id = %subscription.id, "Webhook registered");
                    WebhookStatus::Created {
                        subscription_id: subscription.id,
                    }
                }
                WebhookSubscriptionOutcome::Rejected(errors) if is_already_registered(&errors) => {
                    info!(topic = %topic, "Webhook already registered");
                    WebhookStatus::AlreadyRegistered
                }
                WebhookSubscriptionOutcome::Rejected(errors) => {
                    return Err(WebhookError::Rejected {
                        topic: topic.clone(),
                        errors,
                    });
                }
            };

            registered.push(RegisteredWebhook {
                topic: topic.clone(),
                status,
            });
        }

        Ok(registered)
    }
}

/// Whether every user error says the subscription already exists.
fn is_already_registered(errors: &[UserError]) -> bool {
    !errors.is_empty()
        && errors.iter().all(|e| {
            e.code.as_deref() == Some("TAKEN") || e.message.to_lowercase().contains("taken")
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_error(message: &str) -> UserError {
        UserError {
            field: Some(vec!["webhookSubscription".into(), "callbackUrl".into()]),
            message: message.into(),
            code: None,
        }
    }

    #[test]
    fn test_taken_address_counts_as_registered() {
        assert!(is_already_registered(&[user_error(
            "Address for this topic has already been taken"
        )]));
    }

    #[test]
    fn test_taken_code_counts_as_registered() {
        let error = UserError {
            code: Some("TAKEN".into()),
            ..user_error("Duplicate")
        };
        assert!(is_already_registered(&[error]));
    }

    #[test]
    fn test_other_user_errors_fail() {
        assert!(!is_already_registered(&[user_error(
            "Address is an invalid URL"
        )]));
        assert!(!is_already_registered(&[
            user_error("Address for this topic has already been taken"),
            user_error("Topic is not allowed"),
        ]));
        assert!(!is_already_registered(&[]));
    }

    #[test]
    fn test_registrar_from_config() {
        let config = crate::config::tests::test_shopify_config();
        let registrar = AdminWebhookRegistrar::from_config(&config);

        assert_eq!(registrar.callback_url(), "https://prefs.test/webhooks");
        assert_eq!(registrar.topics(), config.webhook_topics.as_slice());
    }

    #[test]
    fn test_rejected_error_message() {
        let err = WebhookError::Rejected {
            topic: "APP_UNINSTALLED".into(),
            errors: vec![user_error("Address is an invalid URL")],
        };
        assert_eq!(
            err.to_string(),
            "webhook subscription for APP_UNINSTALLED rejected: webhookSubscription.callbackUrl: Address is an invalid URL"
        );
    }
}
