//! Shopify Admin API client.
//!
//! # Architecture
//!
//! - One [`AdminClient`] per authenticated shop session
//! - Operations are typed `graphql_client::GraphQLQuery` implementations
//! - Direct API calls to Shopify, no local state and no retries
//!
//! # Example
//!
//! ```rust,ignore
//! use preferences_app::shopify::{AdminClient, ShopSession};
//! use preferences_core::CUSTOMER_PREFERENCE;
//!
//! let client = AdminClient::new(http, &session, "2025-01");
//!
//! if client.fetch_definition(&CUSTOMER_PREFERENCE).await?.is_none() {
//!     client.create_definition(&CUSTOMER_PREFERENCE).await?;
//! }
//! ```

mod admin;
pub mod types;

pub use admin::AdminClient;
pub use admin::queries;
pub use types::*;

use preferences_core::SpecError;
use thiserror::Error;

/// Errors that can occur when interacting with the Shopify Admin API.
///
/// Every variant is a remote query failure from the caller's point of view;
/// none of them are retried.
#[derive(Debug, Error)]
pub enum AdminShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status other than 401/403/429.
    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Authentication/authorization failed.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The spec is missing a field the operation needs.
    #[error("Invalid metafield spec: {0}")]
    InvalidSpec(#[from] SpecError),
}

impl AdminShopifyError {
    /// Single-message GraphQL error, for malformed-but-successful responses.
    pub(crate) fn graphql(message: impl Into<String>) -> Self {
        Self::GraphQL(vec![GraphQLError {
            message: message.into(),
            path: vec![],
        }])
    }
}

/// A GraphQL error returned by the Shopify Admin API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Path to the failing field in the response, e.g. `["metafieldDefinitions", "nodes", 0]`.
    pub path: Vec<serde_json::Value>,
}

impl std::fmt::Display for GraphQLError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)?;
        if !self.path.is_empty() {
            let path = self
                .path
                .iter()
                .map(|segment| {
                    segment
                        .as_str()
                        .map_or_else(|| segment.to_string(), ToString::to_string)
                })
                .collect::<Vec<_>>()
                .join(".");
            write!(f, " (at {path})")?;
        }
        Ok(())
    }
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
