//! Post-purchase attribution survey on the thank-you page.
//!
//! The answer is stored on the order, so the survey only works where checkout
//! exposes an order: the order-confirmation target.

use core::fmt;
use std::str::FromStr;

use preferences_core::{APP_NAMESPACE, CheckoutContext, Gid, SURVEY_KEY, normalize_order_id};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::ExtensionError;
use crate::graphql::GraphQLEndpoint;
use crate::queries::{
    GetOrderSurvey, MetafieldsSetInput, SetOrderSurvey, get_order_survey, set_order_survey,
};

/// Question shown above the choices.
pub const SURVEY_QUESTION: &str = "How did you hear about us ?";

/// Where the customer heard about the shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurveyAnswer {
    Tv,
    Podcast,
    Family,
    Tiktok,
}

impl SurveyAnswer {
    /// Choices in display order.
    pub const ALL: [Self; 4] = [Self::Tv, Self::Podcast, Self::Family, Self::Tiktok];

    /// Stored value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tv => "tv",
            Self::Podcast => "podcast",
            Self::Family => "family",
            Self::Tiktok => "tiktok",
        }
    }

    /// Label shown to the shopper.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Tv => "TV",
            Self::Podcast => "Podcast",
            Self::Family => "From a friend or family member",
            Self::Tiktok => "Tiktok",
        }
    }
}

impl fmt::Display for SurveyAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SurveyAnswer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|answer| answer.as_str() == s)
            .ok_or_else(|| format!("unknown survey answer: {s}"))
    }
}

/// An order and its stored survey answer.
///
/// The default value (both fields empty) means "not answered or not readable".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSurvey {
    pub order_id: String,
    pub answer: String,
}

impl OrderSurvey {
    /// Parsed answer, when it is one of the known choices.
    #[must_use]
    pub fn choice(&self) -> Option<SurveyAnswer> {
        self.answer.parse().ok()
    }
}

/// Metafield as returned by a successful survey write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyMetafield {
    pub key: String,
    pub namespace: String,
    pub value: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Reads and writes the survey answer on an order.
#[derive(Debug, Clone)]
pub struct SurveyClient {
    endpoint: GraphQLEndpoint,
}

impl SurveyClient {
    #[must_use]
    pub const fn new(endpoint: GraphQLEndpoint) -> Self {
        Self { endpoint }
    }

    /// Load the stored answer for `order_id`.
    ///
    /// `OrderIdentity` ids are accepted and rewritten. Never fails: any error
    /// is logged and the empty sentinel returned.
    pub async fn read(&self, order_id: &str) -> OrderSurvey {
        let order_id = normalize_order_id(order_id);
        match self.try_read(&order_id).await {
            Ok(survey) => survey,
            Err(e) => {
                warn!(error = %e, order_id = %order_id, "Failed to read order survey");
                OrderSurvey::default()
            }
        }
    }

    #[instrument(skip(self), fields(endpoint = %self.endpoint.url()))]
    async fn try_read(&self, order_id: &str) -> Result<OrderSurvey, ExtensionError> {
        let owner = Gid::parse(order_id)?;

        let data = self
            .endpoint
            .execute::<GetOrderSurvey>(get_order_survey::Variables {
                order_id: owner.to_string(),
                key: SURVEY_KEY,
                namespace: APP_NAMESPACE,
            })
            .await?;

        let order = data.order.ok_or(ExtensionError::MissingOwner("order"))?;

        Ok(OrderSurvey {
            order_id: order.id,
            answer: order.metafield.map(|m| m.value).unwrap_or_default(),
        })
    }

    /// Submit `answer` for the order in `context`.
    ///
    /// Returns whether the answer was saved. Outside the order-confirmation
    /// target there is no order, so nothing is sent and the result is `false`.
    pub async fn submit(&self, context: &CheckoutContext, answer: &str) -> bool {
        let Some(order_id) = context.order_id() else {
            debug!("No order confirmation in checkout context, survey not sent");
            return false;
        };

        match self.write(order_id, answer).await {
            Ok(_) => {
                info!(order_id = %order_id, "Survey answer saved");
                true
            }
            Err(e) => {
                warn!(error = %e, order_id = %order_id, "Failed to save survey answer");
                false
            }
        }
    }

    /// Store `answer` on `order_id`.
    ///
    /// # Errors
    ///
    /// Returns an error when the order id is not a global id, the request
    /// fails, or the mutation reports user errors.
    #[instrument(skip(self, answer), fields(endpoint = %self.endpoint.url()))]
    pub async fn write(
        &self,
        order_id: &str,
        answer: &str,
    ) -> Result<Option<SurveyMetafield>, ExtensionError> {
        let owner = Gid::parse(&normalize_order_id(order_id))?;

        let data = self
            .endpoint
            .execute::<SetOrderSurvey>(set_order_survey::Variables {
                metafields: vec![MetafieldsSetInput::text(
                    SURVEY_KEY,
                    owner.to_string(),
                    answer.to_string(),
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
