//! Inbound "authentication completed" event.
//!
//! Signed the way Shopify signs webhooks: `X-Shopify-Hmac-Sha256` carries the
//! base64 HMAC-SHA256 of the raw body, keyed by the app's client secret.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::Sha256;
use tracing::{info, warn};

use crate::error::AppError;
use crate::hooks;
use crate::provision::TracingObserver;
use crate::shopify::ShopSession;
use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

pub const HMAC_HEADER: &str = "x-shopify-hmac-sha256";
pub const SHOP_DOMAIN_HEADER: &str = "x-shopify-shop-domain";

/// Body of the after-auth event.
///
/// No `Debug`: it carries the offline access token.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AfterAuthEvent {
    pub shop: String,
    pub access_token: String,
    #[serde(default)]
    pub scope: String,
}

/// Verify a base64 HMAC-SHA256 signature of `body`.
///
/// Comparison is constant time.
#[must_use]
pub fn verify_hmac(body: &[u8], signature: &str, secret: &str) -> bool {
    let Ok(provided) = BASE64.decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&provided).is_ok()
}

/// Accept a signed after-auth event and run the hook in the background.
///
/// Responds before the hook runs; hook failures are logged, never returned.
pub async fn after_auth_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let signature = header_str(&headers, HMAC_HEADER)
        .ok_or_else(|| AppError::Unauthorized("missing signature".to_string()))?;

    if !verify_hmac(&body, signature, state.shopify().api_secret.expose_secret()) {
        return Err(AppError::Unauthorized("invalid signature".to_string()));
    }

    let header_shop = header_str(&headers, SHOP_DOMAIN_HEADER)
        .ok_or_else(|| AppError::BadRequest("missing shop domain".to_string()))?;

    if !state.shopify().is_valid_shop_domain(header_shop) {
        return Err(AppError::BadRequest(format!(
            "invalid shop domain: {header_shop}"
        )));
    }

    let event: AfterAuthEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("malformed event: {e}")))?;

    if !event.shop.eq_ignore_ascii_case(header_shop) {
        return Err(AppError::BadRequest("shop domain mismatch".to_string()));
    }

    if event.access_token.is_empty() {
        return Err(AppError::BadRequest("missing access token".to_string()));
    }

    let session = ShopSession::new(
        event.shop.to_ascii_lowercase(),
        SecretString::from(event.access_token),
    )
    .with_scope(&event.scope);

    info!(shop = %session.shop, "Accepted after-auth event");

    tokio::spawn(async move {
        if hooks::after_auth(&session, &state, &TracingObserver)
            .await
            .is_err()
        {
            warn!(shop = %session.shop, "After-auth hook will run again on next authentication");
        }
    });

    Ok(StatusCode::ACCEPTED)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
