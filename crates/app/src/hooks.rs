//! Work done after a shop finishes authenticating with the app.
//!
//! Webhooks are registered first, then metafield definitions are provisioned.
//! A registration failure returns before provisioning starts; the next
//! authentication runs both steps again.

use preferences_core::DEFAULT_SPECS;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::provision::{ProvisionError, ProvisionObserver, ProvisionReport, provision_metafields};
use crate::shopify::ShopSession;
use crate::state::AppState;
use crate::webhooks::{RegisteredWebhook, WebhookError, WebhookRegistrar};

/// The after-auth hook did not finish.
#[derive(Debug, Error)]
pub enum HookError {
    #[error("webhook registration failed: {0}")]
    Webhooks(#[from] WebhookError),

    #[error("metafield provisioning failed: {0}")]
    Provision(#[from] ProvisionError),
}

/// Everything the hook did for one authentication.
#[derive(Debug, Clone, Serialize)]
pub struct AfterAuthReport {
    pub shop: String,
    pub webhooks: Vec<RegisteredWebhook>,
    pub provision: ProvisionReport,
}

/// Register webhooks, then provision the app's metafield definitions.
///
/// Runs on every authentication. Both steps tolerate existing state, so a
/// repeat run only performs lookups.
///
/// # Errors
///
/// Returns the first failure from either step. The failure has already been
/// logged and reported to Sentry.
#[instrument(skip_all, fields(shop = %session.shop))]
pub async fn after_auth<O>(
    session: &ShopSession,
    state: &AppState,
    observer: &O,
) -> Result<AfterAuthReport, HookError>
where
    O: ProvisionObserver + ?Sized,
{
    info!("After-auth hook triggered");

    let client = state.admin_client(session);

    let webhooks = state
        .registrar()
        .register(&client)
        .await
        .map_err(|e| report_failure(e.into()))?;

    let provision = provision_metafields(&client, DEFAULT_SPECS, observer)
        .await
        .map_err(|e| report_failure(e.into()))?;

    info!(
        webhooks = webhooks.len(),
        created = provision.created_count(),
        fully_provisioned = provision.is_fully_provisioned(),
        "After-auth hook finished"
    );

    Ok(AfterAuthReport {
        shop: session.shop.clone(),
        webhooks,
        provision,
    })
}

fn report_failure(err: HookError) -> HookError {
    let event_id = sentry::capture_error(&err);
    error!(error = ?err, sentry_event_id = %event_id, "After-auth hook failed");
    err
}
