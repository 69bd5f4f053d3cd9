//! GraphQL endpoint the extensions talk to.
//!
//! Inside the extension sandbox requests are authenticated by the host, so no
//! token header is sent. The customer-account endpoint serves the nickname
//! flow; the shop's storefront URL serves the thank-you survey.

use graphql_client::{GraphQLQuery, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ExtensionError;

/// Customer Account API version the profile extension is built against.
pub const CUSTOMER_ACCOUNT_API_VERSION: &str = "2024-10";

/// API version the survey write is sent with.
pub const STOREFRONT_API_VERSION: &str = "2025-01";

/// A GraphQL endpoint plus the HTTP client used to reach it.
#[derive(Debug, Clone)]
pub struct GraphQLEndpoint {
    client: reqwest::Client,
    url: String,
}

impl GraphQLEndpoint {
    /// Endpoint at an explicit URL.
    #[must_use]
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Customer Account API endpoint under `base`.
    ///
    /// Uses [`CUSTOMER_ACCOUNT_API_VERSION`] when `api_version` is `None`.
    #[must_use]
    pub fn customer_account(client: reqwest::Client, base: &str, api_version: Option<&str>) -> Self {
        Self::versioned(
            client,
            base,
            api_version.unwrap_or(CUSTOMER_ACCOUNT_API_VERSION),
        )
    }

    /// GraphQL endpoint under the shop's storefront URL.
    ///
    /// Uses [`STOREFRONT_API_VERSION`] when `api_version` is `None`.
    #[must_use]
    pub fn storefront(
        client: reqwest::Client,
        storefront_url: &str,
        api_version: Option<&str>,
    ) -> Self {
        Self::versioned(
            client,
            storefront_url,
            api_version.unwrap_or(STOREFRONT_API_VERSION),
        )
    }

    fn versioned(client: reqwest::Client, base: &str, api_version: &str) -> Self {
        let url = format!(
            "{}/api/{api_version}/graphql.json",
            base.trim_end_matches('/')
        );
        Self::new(client, url)
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Execute a GraphQL operation.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, an
    /// `errors` array in the response, or a response without data.
    pub async fn execute<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, ExtensionError>
    where
        Q::ResponseData: DeserializeOwned,
    {
        let body = Q::build_query(variables);

        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ExtensionError::Status {
                status: status.as_u16(),
                body: text.chars().take(200).collect(),
            });
        }

        let response: Response<Q::ResponseData> = serde_json::from_str(&text)?;

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            debug!(errors = ?errors, operation = body.operation_name, "GraphQL errors in response");
            return Err(ExtensionError::GraphQL(
                errors.into_iter().map(|e| e.message).collect(),
            ));
        }

        response
            .data
            .ok_or_else(|| ExtensionError::GraphQL(vec!["No data in response".to_string()]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_account_default_version() {
        let endpoint = GraphQLEndpoint::customer_account(
            reqwest::Client::new(),
            "https://shopify.com/12345/account/customer/",
            None,
        );
        assert_eq!(
            endpoint.url(),
            "https://shopify.com/12345/account/customer/api/2024-10/graphql.json"
        );
    }

    #[test]
    fn test_storefront_default_version() {
        let endpoint = GraphQLEndpoint::storefront(
            reqwest::Client::new(),
            "https://pistachio.myshopify.com",
            None,
        );
        assert_eq!(
            endpoint.url(),
            "https://pistachio.myshopify.com/api/2025-01/graphql.json"
        );
    }

    #[test]
    fn test_explicit_version_wins() {
        let endpoint = GraphQLEndpoint::storefront(
            reqwest::Client::new(),
            "https://pistachio.myshopify.com",
            Some("2024-10"),
        );
        assert!(endpoint.url().ends_with("/api/2024-10/graphql.json"));
    }
}
