//! Provision the app's metafield definitions on one shop.
//!
//! Runs the same lookup-then-create sequence as the after-auth hook, without
//! registering webhooks. Safe to repeat.
//!
//! # Usage
//!
//! ```bash
//! prefs-cli provision --shop pistachio.myshopify.com
//! ```
//!
//! # Environment Variables
//!
//! - `SHOPIFY_ADMIN_ACCESS_TOKEN` - Offline Admin API access token for the shop
//! - `SHOPIFY_API_VERSION` - Admin API version (default: 2025-01)

use std::time::Duration;

use preferences_app::provision::{
    ProvisionError, ProvisionReport, SpecOutcome, TracingObserver, provision_metafields,
};
use preferences_app::shopify::{AdminClient, ShopSession};
use preferences_core::{DEFAULT_SPECS, format_user_errors};
use secrecy::SecretString;
use thiserror::Error;

/// Errors that can occur during provisioning from the CLI.
#[derive(Debug, Error)]
pub enum ProvisionCommandError {
    /// Shop must be a bare domain.
    #[error("Invalid shop domain: {0}")]
    InvalidShop(String),

    /// HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// A lookup or create did not complete.
    #[error(transparent)]
    Provision(#[from] ProvisionError),

    /// Report could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Shopify refused one or more creates.
    #[error("{0} metafield definition(s) rejected")]
    Rejected(usize),
}

/// Arguments for [`run`].
pub struct ProvisionArgs {
    pub shop: String,
    pub access_token: SecretString,
    pub api_version: String,
    pub endpoint: Option<String>,
    pub json: bool,
}

/// Provision every default spec on the shop and print the report.
///
/// # Errors
///
/// Returns an error if the run aborts or any create is rejected.
pub async fn run(args: ProvisionArgs) -> Result<ProvisionReport, ProvisionCommandError> {
    let shop = normalize_shop(&args.shop)?;
    let session = ShopSession::new(shop, args.access_token);

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;
    let client = match args.endpoint {
        Some(endpoint) => AdminClient::with_endpoint(http, &session, endpoint),
        None => AdminClient::new(http, &session, &args.api_version),
    };

    tracing::info!("Provisioning metafield definitions on {}", client.shop());

    let report = provision_metafields(&client, DEFAULT_SPECS, &TracingObserver).await?;

    print_report(&report, args.json)?;

    let rejected = report.rejected().count();
    if rejected > 0 {
        return Err(ProvisionCommandError::Rejected(rejected));
    }

    Ok(report)
}

/// Lowercase a bare shop domain, rejecting URLs and paths.
fn normalize_shop(shop: &str) -> Result<String, ProvisionCommandError> {
    let shop = shop.trim().to_ascii_lowercase();
    if shop.is_empty() || shop.contains("://") || shop.contains('/') || !shop.contains('.') {
        return Err(ProvisionCommandError::InvalidShop(shop));
    }
    Ok(shop)
}

#[allow(clippy::print_stdout)]
fn print_report(report: &ProvisionReport, json: bool) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    for entry in &report.outcomes {
        let status = match &entry.outcome {
            SpecOutcome::AlreadyProvisioned { definition_id } => {
                format!("exists   {definition_id}")
            }
            SpecOutcome::Created(_) => "created".to_string(),
            SpecOutcome::Rejected { errors } => {
                format!("rejected {}", format_user_errors(errors))
            }
        };
        println!("{:<40} {status}", entry.spec.to_string());
    }
    println!(
        "{} created, {} rejected, completed at {}",
        report.created_count(),
        report.rejected().count(),
        report.completed_at.to_rfc3339()
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_shop() {
        assert_eq!(
            normalize_shop(" Pistachio.MyShopify.com ").unwrap(),
            "pistachio.myshopify.com"
        );
    }

    #[test]
    fn test_normalize_shop_rejects_urls() {
        assert!(matches!(
            normalize_shop("https://pistachio.myshopify.com"),
            Err(ProvisionCommandError::InvalidShop(_))
        ));
        assert!(normalize_shop("pistachio").is_err());
        assert!(normalize_shop("").is_err());
    }
}
