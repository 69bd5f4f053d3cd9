//! Shopify global IDs.
//!
//! Shopify identifies resources with URIs of the form
//! `gid://shopify/<Resource>/<id>`. Checkout hands extensions an
//! `OrderIdentity` id on the thank-you page, but metafield writes need an
//! `Order` owner, so that id is rewritten before use.

use core::fmt;

use serde::{Deserialize, Serialize};

const GID_SCHEME: &str = "gid://shopify/";

/// Prefix of the order ids checkout exposes on the order-confirmation target.
pub const ORDER_IDENTITY_PREFIX: &str = "gid://shopify/OrderIdentity/";

/// Errors that can occur when parsing a [`Gid`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GidError {
    /// The input does not start with `gid://shopify/`.
    #[error("global id must start with gid://shopify/")]
    MissingScheme,
    /// The resource segment is empty.
    #[error("global id has no resource type")]
    EmptyResource,
    /// The id segment is empty.
    #[error("global id has no resource id")]
    EmptyId,
}

/// A parsed Shopify global id.
///
/// ```
/// use preferences_core::Gid;
///
/// let gid = Gid::parse("gid://shopify/Customer/42").unwrap();
/// assert_eq!(gid.resource(), "Customer");
/// assert_eq!(gid.id(), "42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Gid {
    resource: String,
    id: String,
}

impl Gid {
    /// Build a global id from its parts.
    #[must_use]
    pub fn new(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Parse a `gid://shopify/<Resource>/<id>` string.
    ///
    /// Query strings some resources carry (e.g. `?key=...`) stay part of the id.
    ///
    /// # Errors
    ///
    /// Returns an error if the scheme is missing or a segment is empty.
    pub fn parse(s: &str) -> Result<Self, GidError> {
        let rest = s.strip_prefix(GID_SCHEME).ok_or(GidError::MissingScheme)?;
        let (resource, id) = rest.split_once('/').ok_or(GidError::EmptyId)?;

        if resource.is_empty() {
            return Err(GidError::EmptyResource);
        }
        if id.is_empty() {
            return Err(GidError::EmptyId);
        }

        Ok(Self::new(resource, id))
    }

    /// Resource type, e.g. `Order`.
    #[must_use]
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Resource id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Gid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{GID_SCHEME}{}/{}", self.resource, self.id)
    }
}

impl TryFrom<String> for Gid {
    type Error = GidError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Gid> for String {
    fn from(gid: Gid) -> Self {
        gid.to_string()
    }
}

/// Rewrite an `OrderIdentity` id into the `Order` id metafield writes expect.
///
/// Anything that does not start with [`ORDER_IDENTITY_PREFIX`] is returned
/// unchanged.
///
/// ```
/// use preferences_core::normalize_order_id;
///
/// assert_eq!(
///     normalize_order_id("gid://shopify/OrderIdentity/123"),
///     "gid://shopify/Order/123"
/// );
/// assert_eq!(normalize_order_id("gid://shopify/Order/9"), "gid://shopify/Order/9");
/// ```
#[must_use]
pub fn normalize_order_id(raw: &str) -> String {
    if raw.starts_with(ORDER_IDENTITY_PREFIX) {
        raw.replacen("OrderIdentity", "Order", 1)
    } else {
        raw.to_string()
    }
}
