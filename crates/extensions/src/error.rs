//! Extension client errors.

use preferences_core::{GidError, UserError, format_user_errors};
use thiserror::Error;

/// Errors from an extension's metafield read or write.
///
/// Reads never surface these to the shopper; they collapse to an empty
/// sentinel. Writes return them so the caller can show a generic failure.
#[derive(Debug, Error)]
pub enum ExtensionError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response carried a GraphQL `errors` array.
    #[error("GraphQL errors: {}", .0.join("; "))]
    GraphQL(Vec<String>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The query found no customer or order.
    #[error("No {0} in response")]
    MissingOwner(&'static str),

    /// The owner id is not a Shopify global id.
    #[error("Invalid owner id: {0}")]
    InvalidOwner(#[from] GidError),

    /// `metafieldsSet` answered with user errors.
    #[error("Preference write failed: {}", format_user_errors(.0))]
    PreferenceWriteFailed(Vec<UserError>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_failed_message_lists_user_errors() {
        let err = ExtensionError::PreferenceWriteFailed(vec![UserError {
            field: Some(vec!["metafields".into(), "0".into(), "value".into()]),
            message: "Value is too long".into(),
            code: Some("TOO_LONG".into()),
        }]);
        assert_eq!(
            err.to_string(),
            "Preference write failed: metafields.0.value: Value is too long"
        );
    }

    #[test]
    fn test_graphql_message_joins_errors() {
        let err = ExtensionError::GraphQL(vec!["Throttled".into(), "Access denied".into()]);
        assert_eq!(err.to_string(), "GraphQL errors: Throttled; Access denied");
    }
}
