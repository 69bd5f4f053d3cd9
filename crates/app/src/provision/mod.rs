//! Metafield definition provisioning.
//!
//! Makes sure every compiled-in [`MetafieldSpec`] has a definition on the
//! store. Runs after every authentication, not only the first install, so it
//! must be safe to repeat: each spec is looked up first and created only when
//! missing.
//!
//! Specs are handled strictly one after another, in input order. A transport
//! or authorization failure aborts the run; the whole run is retried on the
//! next authentication. A create that Shopify rejects is recorded in the
//! report and the run moves on to the next spec.

mod observer;

pub use observer::{ProvisionObserver, TracingObserver};

use std::future::Future;

use chrono::{DateTime, Utc};
use preferences_core::{MetafieldSpec, UserError};
use serde::Serialize;
use thiserror::Error;

use crate::shopify::{
    AdminClient, AdminShopifyError, CreateDefinitionOutcome, CreatedDefinition,
    MetafieldDefinition,
};

/// Remote store holding metafield definitions.
pub trait DefinitionStore {
    /// Find the definition for the spec's (namespace, key, owner type).
    fn fetch_definition(
        &self,
        spec: &MetafieldSpec,
    ) -> impl Future<Output = Result<Option<MetafieldDefinition>, AdminShopifyError>> + Send;

    /// Create the spec's definition.
    fn create_definition(
        &self,
        spec: &MetafieldSpec,
    ) -> impl Future<Output = Result<CreateDefinitionOutcome, AdminShopifyError>> + Send;
}

impl DefinitionStore for AdminClient {
    fn fetch_definition(
        &self,
        spec: &MetafieldSpec,
    ) -> impl Future<Output = Result<Option<MetafieldDefinition>, AdminShopifyError>> + Send {
        Self::fetch_definition(self, spec)
    }

    fn create_definition(
        &self,
        spec: &MetafieldSpec,
    ) -> impl Future<Output = Result<CreateDefinitionOutcome, AdminShopifyError>> + Send {
        Self::create_definition(self, spec)
    }
}

/// Provisioning aborted before every spec was handled.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// A lookup or create could not reach Shopify or was not authorized.
    #[error("remote query failed for {spec}: {source}")]
    RemoteQuery {
        spec: MetafieldSpec,
        #[source]
        source: AdminShopifyError,
    },
}

/// What happened to one spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SpecOutcome {
    /// A definition already existed; nothing was sent.
    AlreadyProvisioned { definition_id: String },
    /// The definition was created by this run.
    Created(CreatedDefinition),
    /// Shopify refused the create.
    Rejected { errors: Vec<UserError> },
}

/// Outcome for one spec, in provisioning order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecReport {
    pub spec: MetafieldSpec,
    pub outcome: SpecOutcome,
}

/// Result of a provisioning run that reached every spec.
#[derive(Debug, Clone, Serialize)]
pub struct ProvisionReport {
    pub outcomes: Vec<SpecReport>,
    pub completed_at: DateTime<Utc>,
}

impl ProvisionReport {
    /// Number of definitions this run created.
    #[must_use]
    pub fn created_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|r| matches!(r.outcome, SpecOutcome::Created(_)))
            .count()
    }

    /// Specs whose create Shopify refused.
    pub fn rejected(&self) -> impl Iterator<Item = (&MetafieldSpec, &[UserError])> {
        self.outcomes.iter().filter_map(|r| match &r.outcome {
            SpecOutcome::Rejected { errors } => Some((&r.spec, errors.as_slice())),
            _ => None,
        })
    }

    /// Whether every spec now has a definition.
    #[must_use]
    pub fn is_fully_provisioned(&self) -> bool {
        self.rejected().next().is_none()
    }
}

/// Ensure every spec has a definition on the store behind `store`.
///
/// Specs are processed sequentially in the given order: lookup, then create
/// only when the lookup found nothing.
///
/// # Errors
///
/// Returns [`ProvisionError::RemoteQuery`] on the first lookup or create that
/// fails; remaining specs are not attempted.
pub async fn provision_metafields<S, O>(
    store: &S,
    specs: &[MetafieldSpec],
    observer: &O,
) -> Result<ProvisionReport, ProvisionError>
where
    S: DefinitionStore + ?Sized,
    O: ProvisionObserver + ?Sized,
{
    let mut outcomes = Vec::with_capacity(specs.len());

    for spec in specs {
        observer.checking(spec);

        let existing = match store.fetch_definition(spec).await {
            Ok(existing) => existing,
            Err(source) => return Err(abort(observer, spec, source)),
        };

        let outcome = if let Some(definition) = existing {
            observer.found(spec, &definition);
            SpecOutcome::AlreadyProvisioned {
                definition_id: definition.id,
            }
        } else {
            match store.create_definition(spec).await {
                Ok(CreateDefinitionOutcome::Created(created)) => {
                    observer.created(spec, &created);
                    SpecOutcome::Created(created)
                }
                Ok(CreateDefinitionOutcome::Rejected(errors)) => {
                    observer.rejected(spec, &errors);
                    SpecOutcome::Rejected { errors }
                }
                Err(source) => return Err(abort(observer, spec, source)),
            }
        };

        outcomes.push(SpecReport {
            spec: *spec,
            outcome,
        });
    }

    Ok(ProvisionReport {
        outcomes,
        completed_at: Utc::now(),
    })
}

fn abort<O: ProvisionObserver + ?Sized>(
    observer: &O,
    spec: &MetafieldSpec,
    source: AdminShopifyError,
) -> ProvisionError {
    observer.failed(spec, &source);
    ProvisionError::RemoteQuery {
        spec: *spec,
        source,
    }
}
