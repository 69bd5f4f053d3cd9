//! CLI command implementations.

pub mod provision;
pub mod specs;
