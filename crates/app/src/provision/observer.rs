//! Progress notifications for provisioning runs.

use preferences_core::{MetafieldSpec, UserError, format_user_errors};
use tracing::{error, info, warn};

use crate::shopify::{AdminShopifyError, CreatedDefinition, MetafieldDefinition};

/// Receives one notification per provisioning step.
///
/// Every method defaults to doing nothing.
pub trait ProvisionObserver: Send + Sync {
    /// About to look up `spec`.
    fn checking(&self, spec: &MetafieldSpec) {
        let _ = spec;
    }

    /// A definition for `spec` already exists.
    fn found(&self, spec: &MetafieldSpec, definition: &MetafieldDefinition) {
        let _ = (spec, definition);
    }

    /// This run created the definition for `spec`.
    fn created(&self, spec: &MetafieldSpec, created: &CreatedDefinition) {
        let _ = (spec, created);
    }

    /// Shopify refused to create the definition for `spec`.
    fn rejected(&self, spec: &MetafieldSpec, errors: &[UserError]) {
        let _ = (spec, errors);
    }

    /// The lookup or create for `spec` failed; the run stops here.
    fn failed(&self, spec: &MetafieldSpec, error: &AdminShopifyError) {
        let _ = (spec, error);
    }
}

/// Logs each step with `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ProvisionObserver for TracingObserver {
    fn checking(&self, spec: &MetafieldSpec) {
        info!(
            key = spec.key,
            namespace = spec.namespace,
            owner_type = %spec.owner_type,
            "Checking metafield definition"
        );
    }

    fn found(&self, spec: &MetafieldSpec, definition: &MetafieldDefinition) {
        info!(
            key = spec.key,
            namespace = spec.namespace,
            owner_type = %spec.owner_type,
            definition_id = %definition.id,
            "Metafield definition already exists"
        );
    }

    fn created(&self, spec: &MetafieldSpec, created: &CreatedDefinition) {
        info!(
            key = %created.key,
            namespace = %created.namespace,
            owner_type = %spec.owner_type,
            "Created metafield definition"
        );
    }

    fn rejected(&self, spec: &MetafieldSpec, errors: &[UserError]) {
        warn!(
            key = spec.key,
            namespace = spec.namespace,
            owner_type = %spec.owner_type,
            user_errors = %format_user_errors(errors),
            "Metafield definition create rejected"
        );
    }

    fn failed(&self, spec: &MetafieldSpec, error: &AdminShopifyError) {
        error!(
            key = spec.key,
            namespace = spec.namespace,
            owner_type = %spec.owner_type,
            error = %error,
            "Metafield definition query failed"
        );
    }
}
