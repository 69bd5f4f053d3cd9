//! Metafield definition specs.
//!
//! A [`MetafieldSpec`] describes a metafield definition the app needs on every
//! store it is installed on. The specs are compiled in; the provisioner makes
//! sure each one exists remotely exactly once.
//!
//! The triple (`namespace`, `key`, `owner_type`) identifies a definition on the
//! remote store and is what lookups filter on.

use core::fmt;

use serde::{Deserialize, Serialize};

/// App-reserved namespace shared by every preference metafield.
pub const APP_NAMESPACE: &str = "$app:preferences";

/// Metafield key holding the customer's nickname.
pub const PREFERENCE_KEY: &str = "preference";

/// Metafield key holding the post-purchase attribution survey answer.
pub const SURVEY_KEY: &str = "survey";

/// Customer-scoped nickname preference.
pub const CUSTOMER_PREFERENCE: MetafieldSpec = MetafieldSpec {
    name: "Customer Preferences",
    key: PREFERENCE_KEY,
    namespace: APP_NAMESPACE,
    owner_type: OwnerType::Customer,
    value_type: MetafieldType::SingleLineTextField,
};

/// Order-scoped attribution survey answer.
pub const ORDER_SURVEY: MetafieldSpec = MetafieldSpec {
    name: "Survey metafield custom",
    key: SURVEY_KEY,
    namespace: APP_NAMESPACE,
    owner_type: OwnerType::Order,
    value_type: MetafieldType::SingleLineTextField,
};

/// Specs provisioned on authentication, in provisioning order.
pub const DEFAULT_SPECS: &[MetafieldSpec] = &[CUSTOMER_PREFERENCE, ORDER_SURVEY];

/// Entity kind a metafield value attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OwnerType {
    Customer,
    Order,
}

impl OwnerType {
    /// GraphQL enum value (`MetafieldOwnerType`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "CUSTOMER",
            Self::Order => "ORDER",
        }
    }
}

impl fmt::Display for OwnerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OwnerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CUSTOMER" => Ok(Self::Customer),
            "ORDER" => Ok(Self::Order),
            _ => Err(format!("invalid owner type: {s}")),
        }
    }
}

/// Value type of a metafield. This app only stores single-line text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MetafieldType {
    #[default]
    SingleLineTextField,
}

impl MetafieldType {
    /// Shopify type name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SingleLineTextField => "single_line_text_field",
        }
    }
}

impl fmt::Display for MetafieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Customer account API access level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerAccountAccess {
    None,
    Read,
    ReadWrite,
}

/// Admin API access level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdminAccess {
    MerchantRead,
    MerchantReadWrite,
}

/// Access policy attached to a metafield definition on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetafieldAccess {
    pub customer_account: CustomerAccountAccess,
    pub admin: AdminAccess,
}

impl MetafieldAccess {
    /// Customers edit their own preferences; merchants can read and edit them.
    pub const PREFERENCES: Self = Self {
        customer_account: CustomerAccountAccess::ReadWrite,
        admin: AdminAccess::MerchantReadWrite,
    };
}

/// Errors raised when a spec cannot be sent to the remote store.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    /// A required field is empty.
    #[error("metafield spec field `{0}` cannot be empty")]
    EmptyField(&'static str),
}

/// Static description of a metafield definition to provision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetafieldSpec {
    /// Human label shown in the Shopify admin.
    pub name: &'static str,
    /// Key, unique within namespace and owner type.
    pub key: &'static str,
    /// App-scoped namespace.
    pub namespace: &'static str,
    pub owner_type: OwnerType,
    #[serde(rename = "type")]
    pub value_type: MetafieldType,
}

impl MetafieldSpec {
    /// Check the fields a definition lookup filters on.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::EmptyField`] if `key` or `namespace` is empty.
    pub const fn validate_for_lookup(&self) -> Result<(), SpecError> {
        if self.key.is_empty() {
            return Err(SpecError::EmptyField("key"));
        }
        if self.namespace.is_empty() {
            return Err(SpecError::EmptyField("namespace"));
        }
        Ok(())
    }

    /// Check the fields a definition create sends.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::EmptyField`] if `key`, `namespace` or `name` is empty.
    pub fn validate_for_create(&self) -> Result<(), SpecError> {
        self.validate_for_lookup()?;
        if self.name.is_empty() {
            return Err(SpecError::EmptyField("name"));
        }
        Ok(())
    }
}

impl fmt::Display for MetafieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} ({})", self.namespace, self.key, self.owner_type)
    }
}
