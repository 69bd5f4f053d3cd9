//! Customer Preferences Core - Shared types library.
//!
//! This crate provides the types shared by every component of the app:
//! - `app` - Backend that provisions metafield definitions and serves the proxy
//! - `extensions` - Checkout and customer-account extension clients
//! - `cli` - Operator tooling
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O and no
//! HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Metafield specs, Shopify global IDs, checkout context, user errors

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
