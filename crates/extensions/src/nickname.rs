//! Customer nickname, shown and edited on the customer-account profile page.

use preferences_core::{APP_NAMESPACE, Gid, PREFERENCE_KEY};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::error::ExtensionError;
use crate::graphql::GraphQLEndpoint;
use crate::queries::{
    GetCustomerPreferences, MetafieldsSetInput, SetPreferences, get_customer_preferences,
    set_preferences,
};

/// The signed-in customer and their nickname.
///
/// The default value (both fields empty) means "nothing saved yet".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPreference {
    pub customer_id: String,
    pub nick_name: String,
}

impl CustomerPreference {
    /// Whether this is the empty sentinel returned for failed reads.
    #[must_use]
    pub fn is_unset(&self) -> bool {
        self.customer_id.is_empty()
    }
}

/// Metafield as returned by a successful write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedMetafield {
    pub id: String,
    pub value: String,
}

/// Reads and writes the nickname through the Customer Account API.
#[derive(Debug, Clone)]
pub struct NicknameClient {
    endpoint: GraphQLEndpoint,
}

impl NicknameClient {
    #[must_use]
    pub const fn new(endpoint: GraphQLEndpoint) -> Self {
        Self { endpoint }
    }

    /// Load the customer's nickname.
    ///
    /// Never fails: any error is logged and the empty sentinel returned.
    pub async fn read(&self) -> CustomerPreference {
        match self.try_read().await {
            Ok(preference) => preference,
            Err(e) => {
                warn!(error = %e, "Failed to read customer preferences");
                CustomerPreference::default()
            }
        }
    }

    /// Load the customer's nickname, reporting why a read failed.
    ///
    /// A customer without the metafield has an empty nickname.
    ///
    /// # Errors
    ///
    /// Returns an error on transport or GraphQL failure, or when the response
    /// has no customer.
    #[instrument(skip(self), fields(endpoint = %self.endpoint.url()))]
    pub async fn try_read(&self) -> Result<CustomerPreference, ExtensionError> {
        let data = self
            .endpoint
            .execute::<GetCustomerPreferences>(get_customer_preferences::Variables {
                key: PREFERENCE_KEY,
                namespace: APP_NAMESPACE,
            })
            .await?;

        let customer = data
            .customer
            .ok_or(ExtensionError::MissingOwner("customer"))?;

        Ok(CustomerPreference {
            customer_id: customer.id,
            nick_name: customer.metafield.map(|m| m.value).unwrap_or_default(),
        })
    }

    /// Save `nick_name` for `customer_id`; `None` clears it.
    ///
    /// Returns the saved metafield, if Shopify echoed one back.
    ///
    /// # Errors
    ///
    /// Returns [`ExtensionError::InvalidOwner`] before any request when
    /// `customer_id` is not a global id (including the empty sentinel), and
    /// [`ExtensionError::PreferenceWriteFailed`] when the mutation reports
    /// user errors.
    #[instrument(skip(self, nick_name))]
    pub async fn write(
        &self,
        customer_id: &str,
        nick_name: Option<&str>,
    ) -> Result<Option<SavedMetafield>, ExtensionError> {
        let owner = Gid::parse(customer_id)?;

        let data = self
            .endpoint
            .execute::<SetPreferences>(set_preferences::Variables {
                metafields: vec![MetafieldsSetInput::text(
                    PREFERENCE_KEY,
                    owner.to_string(),
                    nick_name.unwrap_or_default().to_string(),
                )],
            })
            .await?;

        let Some(payload) = data.metafields_set else {
            return Ok(None);
        };

        if !payload.user_errors.is_empty() {
            return Err(ExtensionError::PreferenceWriteFailed(payload.user_errors));
        }

        Ok(payload.metafields.into_iter().next())
    }
}
