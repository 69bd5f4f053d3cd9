//! GraphQL operations sent by the extensions.
//!
//! Hand-written `GraphQLQuery` implementations in the layout the derive
//! produces.

use graphql_client::{GraphQLQuery, QueryBody};
use preferences_core::{APP_NAMESPACE, MetafieldType};
use serde::Serialize;

/// One entry of a `metafieldsSet` mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetafieldsSetInput {
    pub key: &'static str,
    pub namespace: &'static str,
    pub owner_id: String,
    #[serde(rename = "type")]
    pub value_type: MetafieldType,
    pub value: String,
}

impl MetafieldsSetInput {
    /// A single-line text value under the app namespace.
    #[must_use]
    pub fn text(key: &'static str, owner_id: String, value: String) -> Self {
        Self {
            key,
            namespace: APP_NAMESPACE,
            owner_id,
            value_type: MetafieldType::SingleLineTextField,
            value,
        }
    }
}

/// `{ value }` selection on a metafield.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct MetafieldValue {
    pub value: String,
}

macro_rules! impl_query {
    ($operation:ident, $module:ident) => {
        impl GraphQLQuery for $operation {
            type Variables = $module::Variables;
            type ResponseData = $module::ResponseData;

            fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
                QueryBody {
                    variables,
                    query: $module::QUERY,
                    operation_name: $module::OPERATION_NAME,
                }
            }
        }
    };
}

// =============================================================================
// Customer nickname
// =============================================================================

/// Read the signed-in customer's id and nickname.
pub struct GetCustomerPreferences;

pub mod get_customer_preferences {
    use serde::{Deserialize, Serialize};

    use super::MetafieldValue;

    pub const OPERATION_NAME: &str = "GetCustomerPreferences";
    pub const QUERY: &str = r"query GetCustomerPreferences($key: String!, $namespace: String!) {
  customer {
    id
    metafield(namespace: $namespace, key: $key) {
      value
    }
  }
}";

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub key: &'static str,
        pub namespace: &'static str,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub customer: Option<Customer>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Customer {
        pub id: String,
        pub metafield: Option<MetafieldValue>,
    }
}

impl_query!(GetCustomerPreferences, get_customer_preferences);

/// Save the customer's nickname.
pub struct SetPreferences;

pub mod set_preferences {
    use preferences_core::UserError;
    use serde::{Deserialize, Serialize};

    use super::MetafieldsSetInput;

    pub const OPERATION_NAME: &str = "setPreferences";
    pub const QUERY: &str = r"mutation setPreferences($metafields: [MetafieldsSetInput!]!) {
  metafieldsSet(metafields: $metafields) {
    userErrors {
      field
      message
    }
    metafields {
      id
      value
    }
  }
}";

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub metafields: Vec<MetafieldsSetInput>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub metafields_set: Option<Payload>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Payload {
        #[serde(default, deserialize_with = "preferences_core::null_as_empty")]
        pub user_errors: Vec<UserError>,
        #[serde(default, deserialize_with = "preferences_core::null_as_empty")]
        pub metafields: Vec<crate::nickname::SavedMetafield>,
    }
}

impl_query!(SetPreferences, set_preferences);

// =============================================================================
// Order survey
// =============================================================================

/// Read the survey answer stored on an order.
pub struct GetOrderSurvey;

pub mod get_order_survey {
    use serde::{Deserialize, Serialize};

    use super::MetafieldValue;

    pub const OPERATION_NAME: &str = "GetOrderSurvey";
    pub const QUERY: &str = r"query GetOrderSurvey($orderId: ID!, $key: String!, $namespace: String!) {
  order(id: $orderId) {
    id
    metafield(namespace: $namespace, key: $key) {
      value
    }
  }
}";

    #[derive(Debug, Clone, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Variables {
        pub order_id: String,
        pub key: &'static str,
        pub namespace: &'static str,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub order: Option<Order>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct Order {
        pub id: String,
        pub metafield: Option<MetafieldValue>,
    }
}

impl_query!(GetOrderSurvey, get_order_survey);

/// Store the survey answer on an order.
pub struct SetOrderSurvey;

pub mod set_order_survey {
    use preferences_core::UserError;
    use serde::{Deserialize, Serialize};

    use super::MetafieldsSetInput;

    pub const OPERATION_NAME: &str = "MetafieldsSet";
    pub const QUERY: &str = r"mutation MetafieldsSet($metafields: [MetafieldsSetInput!]!) {
  metafieldsSet(metafields: $metafields) {
    metafields {
      key
      namespace
      value
      createdAt
      updatedAt
    }
    userErrors {
      field
      message
      code
    }
  }
}";

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub metafields: Vec<MetafieldsSetInput>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub metafields_set: Option<Payload>,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Payload {
        #[serde(default, deserialize_with = "preferences_core::null_as_empty")]
        pub metafields: Vec<crate::survey::SurveyMetafield>,
        #[serde(default, deserialize_with = "preferences_core::null_as_empty")]
        pub user_errors: Vec<UserError>,
    }
}

impl_query!(SetOrderSurvey, set_order_survey);
