//! Mutation user errors.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Application-level validation failure returned in a mutation's
/// `userErrors` array, independent of transport success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserError {
    /// Path to the offending input field.
    #[serde(default)]
    pub field: Option<Vec<String>>,
    pub message: String,
    /// Machine-readable code, when the mutation exposes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl fmt::Display for UserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.field.as_deref() {
            Some(path) if !path.is_empty() => write!(f, "{}: {}", path.join("."), self.message),
            _ => f.write_str(&self.message),
        }
    }
}

/// Join user errors into one log-friendly line.
#[must_use]
pub fn format_user_errors(errors: &[UserError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Deserialize a nullable GraphQL list, treating `null` as empty.
///
/// Use with `#[serde(default, deserialize_with = "...")]` so a missing key is
/// empty too.
///
/// # Errors
///
/// Returns an error if the value is neither `null` nor a list of `T`.
pub fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let list: Option<Vec<T>> = Option::deserialize(deserializer)?;
    Ok(list.unwrap_or_default())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_without_code() {
        let err: UserError =
            serde_json::from_str(r#"{"field":["definition","key"],"message":"Key is in use"}"#)
                .unwrap();
        assert_eq!(err.code, None);
        assert_eq!(err.to_string(), "definition.key: Key is in use");
    }

    #[test]
    fn test_null_field() {
        let err: UserError =
            serde_json::from_str(r#"{"field":null,"message":"Throttled","code":"THROTTLED"}"#)
                .unwrap();
        assert_eq!(err.to_string(), "Throttled");
        assert_eq!(err.code.as_deref(), Some("THROTTLED"));
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Payload {
        #[serde(default, deserialize_with = "null_as_empty")]
        metafields: Vec<String>,
        #[serde(default, deserialize_with = "null_as_empty")]
        user_errors: Vec<UserError>,
    }

    #[test]
    fn test_null_list_is_empty() {
        let payload: Payload = serde_json::from_str(
            r#"{"metafields":null,"userErrors":[{"field":["metafields","0","value"],"message":"Value is too long","code":"TOO_LONG"}]}"#,
        )
        .unwrap();
        assert!(payload.metafields.is_empty());
        assert_eq!(payload.user_errors.len(), 1);
        assert_eq!(payload.user_errors[0].code.as_deref(), Some("TOO_LONG"));
    }

    #[test]
    fn test_missing_list_is_empty() {
        let payload: Payload = serde_json::from_str(r#"{"userErrors":null}"#).unwrap();
        assert!(payload.metafields.is_empty());
        assert!(payload.user_errors.is_empty());
    }

    #[test]
    fn test_non_list_is_rejected() {
        assert!(serde_json::from_str::<Payload>(r#"{"metafields":"oops"}"#).is_err());
    }

    #[test]
    fn test_format_user_errors() {
        let errors = vec![
            UserError {
                field: Some(vec!["metafields".into(), "0".into(), "value".into()]),
                message: "is too long".into(),
                code: None,
            },
            UserError {
                field: None,
                message: "Access denied".into(),
                code: None,
            },
        ];
        assert_eq!(
            format_user_errors(&errors),
            "metafields.0.value: is too long; Access denied"
        );
    }
}
