//! Shopify Admin API GraphQL client bound to one shop session.
//!
//! This module provides a type-safe client for the two metafield definition
//! operations the app needs and for webhook subscription.

use std::sync::Arc;

use graphql_client::GraphQLQuery;
use preferences_core::{MetafieldAccess, MetafieldSpec};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::instrument;

use super::{
    AdminShopifyError, GraphQLError,
    types::{
        CreateDefinitionOutcome, MetafieldDefinition, ShopSession, WebhookSubscriptionOutcome,
    },
};

pub mod queries;

use queries::{
    GetMetafieldDefinition, MetafieldDefinitionCreate, WebhookSubscriptionCreate,
    get_metafield_definition, metafield_definition_create, webhook_subscription_create,
};

/// Shopify Admin API GraphQL client.
///
/// Cheap to clone; all clones share one HTTP connection pool.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    client: reqwest::Client,
    shop: String,
    endpoint: String,
    access_token: SecretString,
}

/// GraphQL response wrapper.
#[derive(Debug, Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLErrorResponse>>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorResponse {
    message: String,
    #[serde(default, deserialize_with = "preferences_core::null_as_empty")]
    path: Vec<serde_json::Value>,
}

impl AdminClient {
    /// Create a client for the session's shop.
    ///
    /// # Arguments
    ///
    /// * `client` - Shared HTTP client
    /// * `session` - Authenticated shop session
    /// * `api_version` - Admin API version (e.g., 2025-01)
    #[must_use]
    pub fn new(client: reqwest::Client, session: &ShopSession, api_version: &str) -> Self {
        let endpoint = format!(
            "https://{}/admin/api/{}/graphql.json",
            session.shop, api_version
        );
        Self::with_endpoint(client, session, endpoint)
    }

    /// Create a client that sends every request to `endpoint`.
    #[must_use]
    pub fn with_endpoint(
        client: reqwest::Client,
        session: &ShopSession,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            inner: Arc::new(AdminClientInner {
                client,
                shop: session.shop.clone(),
                endpoint: endpoint.into(),
                access_token: session.access_token.clone(),
            }),
        }
    }

    /// Get the shop domain.
    #[must_use]
    pub fn shop(&self) -> &str {
        &self.inner.shop
    }

    /// Get the GraphQL endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    // =========================================================================
    // GraphQL Execution
    // =========================================================================

    /// Execute a GraphQL operation.
    async fn execute<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, AdminShopifyError>
    where
        Q::ResponseData: DeserializeOwned,
    {
        let body = Q::build_query(variables);

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .header(
                "X-Shopify-Access-Token",
                self.inner.access_token.expose_secret(),
            )
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.split('.').next())
                .and_then(|whole| whole.parse().ok())
                .unwrap_or(2);
            return Err(AdminShopifyError::RateLimited(retry_after));
        }

        // Check for unauthorized
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(AdminShopifyError::Unauthorized(
                "Invalid or expired access token".to_string(),
            ));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdminShopifyError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let graphql_response: GraphQLResponse<Q::ResponseData> = serde_json::from_slice(&bytes)?;

        // Check for GraphQL errors
        if let Some(errors) = graphql_response.errors
            && !errors.is_empty()
        {
            let converted_errors: Vec<GraphQLError> = errors
                .into_iter()
                .map(|e| GraphQLError {
                    message: e.message,
                    path: e.path,
                })
                .collect();
            return Err(AdminShopifyError::GraphQL(converted_errors));
        }

        graphql_response
            .data
            .ok_or_else(|| AdminShopifyError::graphql("No data in response"))
    }

    // =========================================================================
    // Metafield definitions
    // =========================================================================

    /// Look up the definition matching the spec's key, namespace and owner type.
    ///
    /// At most one definition can match the triple, so the first node wins.
    ///
    /// # Errors
    ///
    /// Returns an error if the spec is incomplete or the request fails.
    #[instrument(skip(self, spec), fields(shop = %self.shop(), key = spec.key, owner_type = %spec.owner_type))]
    pub async fn fetch_definition(
        &self,
        spec: &MetafieldSpec,
    ) -> Result<Option<MetafieldDefinition>, AdminShopifyError> {
        spec.validate_for_lookup()?;

        let variables = get_metafield_definition::Variables {
            key: spec.key.to_string(),
            namespace: spec.namespace.to_string(),
            owner_type: spec.owner_type,
        };

        let response = self.execute::<GetMetafieldDefinition>(variables).await?;

        Ok(response.metafield_definitions.nodes.into_iter().next())
    }

    /// Create the spec's definition with the app's access policy.
    ///
    /// Not idempotent: creating an existing definition comes back as
    /// [`CreateDefinitionOutcome::Rejected`].
    ///
    /// # Errors
    ///
    /// Returns an error if the spec is incomplete or the request fails.
    /// Shopify user errors are returned in the outcome, not as an error.
    #[instrument(skip(self, spec), fields(shop = %self.shop(), key = spec.key, owner_type = %spec.owner_type))]
    pub async fn create_definition(
        &self,
        spec: &MetafieldSpec,
    ) -> Result<CreateDefinitionOutcome, AdminShopifyError> {
        spec.validate_for_create()?;

        let variables = metafield_definition_create::Variables {
            definition: metafield_definition_create::MetafieldDefinitionInput {
                access: MetafieldAccess::PREFERENCES,
                key: spec.key.to_string(),
                name: spec.name.to_string(),
                namespace: spec.namespace.to_string(),
                owner_type: spec.owner_type,
                value_type: spec.value_type,
            },
        };

        let response = self.execute::<MetafieldDefinitionCreate>(variables).await?;

        let payload = response.metafield_definition_create.ok_or_else(|| {
            AdminShopifyError::graphql("metafieldDefinitionCreate returned no payload")
        })?;

        if !payload.user_errors.is_empty() {
            return Ok(CreateDefinitionOutcome::Rejected(payload.user_errors));
        }

        payload
            .created_definition
            .map(CreateDefinitionOutcome::Created)
            .ok_or_else(|| AdminShopifyError::graphql("No definition in create response"))
    }

    // =========================================================================
    // Webhooks
    // =========================================================================

    /// Subscribe to `topic`, delivering JSON payloads to `callback_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails. Shopify user errors are
    /// returned in the outcome.
    #[instrument(skip(self), fields(shop = %self.shop()))]
    pub async fn create_webhook_subscription(
        &self,
        topic: &str,
        callback_url: &str,
    ) -> Result<WebhookSubscriptionOutcome, AdminShopifyError> {
        let variables = webhook_subscription_create::Variables {
            topic: topic.to_string(),
            webhook_subscription: webhook_subscription_create::WebhookSubscriptionInput {
                callback_url: callback_url.to_string(),
                format: "JSON",
            },
        };

        let response = self.execute::<WebhookSubscriptionCreate>(variables).await?;

        let payload = response.webhook_subscription_create.ok_or_else(|| {
            AdminShopifyError::graphql("webhookSubscriptionCreate returned no payload")
        })?;

        if !payload.user_errors.is_empty() {
            return Ok(WebhookSubscriptionOutcome::Rejected(payload.user_errors));
        }

        payload
            .webhook_subscription
            .map(WebhookSubscriptionOutcome::Created)
            .ok_or_else(|| AdminShopifyError::graphql("No subscription in create response"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_from_session() {
        let session = ShopSession::new("pistachio.myshopify.com", SecretString::from("shpat_1"));
        let client = AdminClient::new(reqwest::Client::new(), &session, "2025-01");

        assert_eq!(client.shop(), "pistachio.myshopify.com");
        assert_eq!(
            client.endpoint(),
            "https://pistachio.myshopify.com/admin/api/2025-01/graphql.json"
        );
    }

    #[tokio::test]
    async fn test_invalid_spec_fails_before_request() {
        let session = ShopSession::new("pistachio.myshopify.com", SecretString::from("shpat_1"));
        // Unroutable endpoint: the call must fail on validation, not transport.
        let client = AdminClient::with_endpoint(reqwest::Client::new(), &session, "http://0.0.0.0:9");
        let spec = MetafieldSpec {
            namespace: "",
            ..preferences_core::CUSTOMER_PREFERENCE
        };

        let err = client.fetch_definition(&spec).await.unwrap_err();
        assert!(matches!(err, AdminShopifyError::InvalidSpec(_)));
    }
}
