//! Core types for the customer preferences app.
//!
//! This module provides type-safe wrappers for the metafield domain.

pub mod checkout;
pub mod gid;
pub mod metafield;
pub mod user_error;

pub use checkout::CheckoutContext;
pub use gid::{Gid, GidError, ORDER_IDENTITY_PREFIX, normalize_order_id};
pub use metafield::*;
pub use user_error::{UserError, format_user_errors, null_as_empty};
