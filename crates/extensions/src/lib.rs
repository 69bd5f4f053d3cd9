//! Network side of the customer preferences extensions.
//!
//! Two read-then-optionally-write flows against a metafield under the app
//! namespace:
//!
//! - [`NicknameClient`]: the customer's nickname, on the profile page
//! - [`SurveyClient`]: the attribution survey answer, on the thank-you page
//!
//! Reads never fail; they return an empty sentinel the UI shows as "nothing
//! saved yet". A failed nickname write is an error for the caller to display;
//! a failed survey submit is `false`.
//!
//! # Example
//!
//! ```rust,ignore
//! use preferences_core::CheckoutContext;
//! use preferences_extensions::{GraphQLEndpoint, SurveyAnswer, SurveyClient};
//!
//! let endpoint = GraphQLEndpoint::storefront(http, &shop.storefront_url, None);
//! let survey = SurveyClient::new(endpoint);
//!
//! let context = CheckoutContext::resolve(order_confirmation_id.as_deref());
//! let saved = survey.submit(&context, SurveyAnswer::Podcast.as_str()).await;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod error;
pub mod graphql;
pub mod nickname;
pub mod queries;
pub mod survey;

pub use error::ExtensionError;
pub use graphql::{CUSTOMER_ACCOUNT_API_VERSION, GraphQLEndpoint, STOREFRONT_API_VERSION};
pub use nickname::{CustomerPreference, NicknameClient, SavedMetafield};
pub use survey::{OrderSurvey, SURVEY_QUESTION, SurveyAnswer, SurveyClient, SurveyMetafield};
