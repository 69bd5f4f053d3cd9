//! Checkout context kind.
//!
//! Checkout UI extensions run on several targets. Only the order-confirmation
//! (thank-you) target exposes an order id, so the context is resolved once at
//! entry instead of probing the host API at every call site.

use super::gid::normalize_order_id;

/// Where a checkout extension is rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutContext {
    /// Thank-you page with a confirmed order.
    OrderConfirmation {
        /// Order id, already rewritten to an `Order` gid.
        order_id: String,
    },
    /// Any other checkout target; no order is available.
    Other,
}

impl CheckoutContext {
    /// Resolve the context from the order-confirmation id the host exposes.
    ///
    /// An absent or empty id resolves to [`CheckoutContext::Other`].
    #[must_use]
    pub fn resolve(order_confirmation_id: Option<&str>) -> Self {
        match order_confirmation_id {
            Some(raw) if !raw.is_empty() => Self::OrderConfirmation {
                order_id: normalize_order_id(raw),
            },
            _ => Self::Other,
        }
    }

    /// Order id usable as a metafield owner, if any.
    #[must_use]
    pub fn order_id(&self) -> Option<&str> {
        match self {
            Self::OrderConfirmation { order_id } => Some(order_id),
            Self::Other => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_normalizes_order_identity() {
        let ctx = CheckoutContext::resolve(Some("gid://shopify/OrderIdentity/55"));
        assert_eq!(ctx.order_id(), Some("gid://shopify/Order/55"));
    }

    #[test]
    fn test_resolve_without_order() {
        assert_eq!(CheckoutContext::resolve(None), CheckoutContext::Other);
        assert_eq!(CheckoutContext::resolve(Some("")), CheckoutContext::Other);
        assert_eq!(CheckoutContext::Other.order_id(), None);
    }
}
