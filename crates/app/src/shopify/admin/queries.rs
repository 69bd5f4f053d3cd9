//! GraphQL operation definitions for the Shopify Admin API.
//!
//! Each operation implements `graphql_client::GraphQLQuery` by hand with the
//! same layout the derive generates (a module holding `QUERY`,
//! `OPERATION_NAME`, `Variables` and `ResponseData`). The app only ever sends
//! these three documents, so carrying the full Admin schema for codegen is not
//! worth it.

use graphql_client::{GraphQLQuery, QueryBody};

// =============================================================================
// Metafield definitions
// =============================================================================

/// Look up a definition by key, namespace and owner type.
pub struct GetMetafieldDefinition;

pub mod get_metafield_definition {
    use preferences_core::OwnerType;
    use serde::{Deserialize, Serialize};

    use crate::shopify::MetafieldDefinition;

    pub const OPERATION_NAME: &str = "getMetafieldDefinition";
    pub const QUERY: &str = r"query getMetafieldDefinition($key: String!, $namespace: String!, $ownerType: MetafieldOwnerType!) {
  metafieldDefinitions(first: 1, key: $key, namespace: $namespace, ownerType: $ownerType) {
    nodes {
      id
      name
      namespace
      ownerType
    }
  }
}";

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub key: String,
        pub namespace: String,
        pub owner_type: OwnerType,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub metafield_definitions: MetafieldDefinitions,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct MetafieldDefinitions {
        #[serde(default, deserialize_with = "preferences_core::null_as_empty")]
        pub nodes: Vec<MetafieldDefinition>,
    }
}

impl GraphQLQuery for GetMetafieldDefinition {
    type Variables = get_metafield_definition::Variables;
    type ResponseData = get_metafield_definition::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: get_metafield_definition::QUERY,
            operation_name: get_metafield_definition::OPERATION_NAME,
        }
    }
}

/// Create a definition with the app's access policy.
pub struct MetafieldDefinitionCreate;

pub mod metafield_definition_create {
    use preferences_core::{MetafieldAccess, MetafieldType, OwnerType, UserError};
    use serde::{Deserialize, Serialize};

    use crate::shopify::CreatedDefinition;

    pub const OPERATION_NAME: &str = "metafieldDefinitionCreate";
    pub const QUERY: &str = r"mutation metafieldDefinitionCreate($definition: MetafieldDefinitionInput!) {
  metafieldDefinitionCreate(definition: $definition) {
    createdDefinition {
      key
      namespace
    }
    userErrors {
      field
      message
    }
  }
}";

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub definition: MetafieldDefinitionInput,
    }

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MetafieldDefinitionInput {
        pub access: MetafieldAccess,
        pub key: String,
        pub name: String,
        pub namespace: String,
        pub owner_type: OwnerType,
        #[serde(rename = "type")]
        pub value_type: MetafieldType,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub metafield_definition_create: Option<Payload>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Payload {
        pub created_definition: Option<CreatedDefinition>,
        #[serde(default, deserialize_with = "preferences_core::null_as_empty")]
        pub user_errors: Vec<UserError>,
    }
}

impl GraphQLQuery for MetafieldDefinitionCreate {
    type Variables = metafield_definition_create::Variables;
    type ResponseData = metafield_definition_create::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: metafield_definition_create::QUERY,
            operation_name: metafield_definition_create::OPERATION_NAME,
        }
    }
}

// =============================================================================
// Webhooks
// =============================================================================

/// Subscribe the app to a webhook topic.
pub struct WebhookSubscriptionCreate;

pub mod webhook_subscription_create {
    use preferences_core::UserError;
    use serde::{Deserialize, Serialize};

    use crate::shopify::WebhookSubscription;

    pub const OPERATION_NAME: &str = "webhookSubscriptionCreate";
    pub const QUERY: &str = r"mutation webhookSubscriptionCreate($topic: WebhookSubscriptionTopic!, $webhookSubscription: WebhookSubscriptionInput!) {
  webhookSubscriptionCreate(topic: $topic, webhookSubscription: $webhookSubscription) {
    webhookSubscription {
      id
      topic
    }
    userErrors {
      field
      message
    }
  }
}";

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub topic: String,
        pub webhook_subscription: WebhookSubscriptionInput,
    }

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct WebhookSubscriptionInput {
        pub callback_url: String,
        pub format: &'static str,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub webhook_subscription_create: Option<Payload>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Payload {
        pub webhook_subscription: Option<WebhookSubscription>,
        #[serde(default, deserialize_with = "preferences_core::null_as_empty")]
        pub user_errors: Vec<UserError>,
    }
}

impl GraphQLQuery for WebhookSubscriptionCreate {
    type Variables = webhook_subscription_create::Variables;
    type ResponseData = webhook_subscription_create::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: webhook_subscription_create::QUERY,
            operation_name: webhook_subscription_create::OPERATION_NAME,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use preferences_core::{CUSTOMER_PREFERENCE, MetafieldAccess, OwnerType};

    #[test]
    fn test_lookup_body_shape() {
        let body = GetMetafieldDefinition::build_query(get_metafield_definition::Variables {
            key: "preference".to_string(),
            namespace: "$app:preferences".to_string(),
            owner_type: OwnerType::Customer,
        });
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["operationName"], "getMetafieldDefinition");
        assert_eq!(json["variables"]["ownerType"], "CUSTOMER");
        assert!(
            json["query"]
                .as_str()
                .unwrap()
                .contains("metafieldDefinitions(first: 1")
        );
    }

    #[test]
    fn test_create_body_carries_access_policy() {
        let spec = CUSTOMER_PREFERENCE;
        let body = MetafieldDefinitionCreate::build_query(metafield_definition_create::Variables {
            definition: metafield_definition_create::MetafieldDefinitionInput {
                access: MetafieldAccess::PREFERENCES,
                key: spec.key.to_string(),
                name: spec.name.to_string(),
                namespace: spec.namespace.to_string(),
                owner_type: spec.owner_type,
                value_type: spec.value_type,
            },
        });
        let json = serde_json::to_value(&body).unwrap();
        let definition = &json["variables"]["definition"];

        assert_eq!(definition["access"]["customerAccount"], "READ_WRITE");
        assert_eq!(definition["access"]["admin"], "MERCHANT_READ_WRITE");
        assert_eq!(definition["type"], "single_line_text_field");
        assert_eq!(definition["name"], "Customer Preferences");
    }

    #[test]
    fn test_lookup_response_parses_empty_nodes() {
        let data: get_metafield_definition::ResponseData =
            serde_json::from_str(r#"{"metafieldDefinitions":{"nodes":[]}}"#).unwrap();
        assert!(data.metafield_definitions.nodes.is_empty());
    }

    #[test]
    fn test_null_lists_parse_as_empty() {
        let data: get_metafield_definition::ResponseData =
            serde_json::from_str(r#"{"metafieldDefinitions":{"nodes":null}}"#).unwrap();
        assert!(data.metafield_definitions.nodes.is_empty());

        let data: webhook_subscription_create::ResponseData = serde_json::from_str(
            r#"{"webhookSubscriptionCreate":{"webhookSubscription":{"id":"gid://shopify/WebhookSubscription/1","topic":"APP_UNINSTALLED"},"userErrors":null}}"#,
        )
        .unwrap();
        assert!(data.webhook_subscription_create.unwrap().user_errors.is_empty());
    }

    #[test]
    fn test_create_response_parses_user_errors() {
        let data: metafield_definition_create::ResponseData = serde_json::from_str(
            r#"{"metafieldDefinitionCreate":{"createdDefinition":null,"userErrors":[{"field":["definition","key"],"message":"Key is in use for Customer metafields on the 'preferences' namespace."}]}}"#,
        )
        .unwrap();
        let payload = data.metafield_definition_create.unwrap();
        assert!(payload.created_definition.is_none());
        assert_eq!(payload.user_errors.len(), 1);
    }
}
