//! Domain types returned by the Admin API client.

use preferences_core::{OwnerType, UserError};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// An authenticated shop session: who to call and with which token.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct ShopSession {
    /// Shop domain (e.g., pistachio.myshopify.com)
    pub shop: String,
    /// Offline Admin API access token
    pub access_token: SecretString,
    /// Granted scopes
    pub scopes: Vec<String>,
}

impl ShopSession {
    /// Create a session for `shop`.
    #[must_use]
    pub fn new(shop: impl Into<String>, access_token: SecretString) -> Self {
        Self {
            shop: shop.into(),
            access_token,
            scopes: Vec::new(),
        }
    }

    /// Attach granted scopes, given as Shopify's comma-separated string.
    #[must_use]
    pub fn with_scope(mut self, scope: &str) -> Self {
        self.scopes = scope
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        self
    }
}

impl std::fmt::Debug for ShopSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopSession")
            .field("shop", &self.shop)
            .field("access_token", &"[REDACTED]")
            .field("scopes", &self.scopes)
            .finish()
    }
}

/// A metafield definition as it exists on the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetafieldDefinition {
    pub id: String,
    pub name: String,
    pub namespace: String,
    pub owner_type: OwnerType,
}

/// Identity of a freshly created definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedDefinition {
    pub key: String,
    pub namespace: String,
}

/// Result of a definition create that reached Shopify.
///
/// A rejection is data, not an error: the caller decides what it means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateDefinitionOutcome {
    /// The definition now exists.
    Created(CreatedDefinition),
    /// Shopify refused the create (e.g., the key is already taken).
    Rejected(Vec<UserError>),
}

/// A webhook subscription Shopify acknowledged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookSubscription {
    pub id: String,
    pub topic: String,
}

/// Result of a webhook subscription create that reached Shopify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookSubscriptionOutcome {
    Created(WebhookSubscription),
    Rejected(Vec<UserError>),
}
