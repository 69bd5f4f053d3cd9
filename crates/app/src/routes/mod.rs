//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//!
//! # App proxy (CORS)
//! ANY  /api/proxy              - Preflight answer or static loader payload
//!
//! # Lifecycle
//! POST /hooks/after-auth       - Signed "authentication completed" event
//! ```

pub mod hooks;
pub mod proxy;

use axum::{
    Router,
    http::{HeaderValue, header::ACCESS_CONTROL_ALLOW_ORIGIN},
    routing::{any, get, post},
};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::state::AppState;

/// Create all routes for the app.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/proxy",
            any(proxy::proxy).layer(SetResponseHeaderLayer::overriding(
                ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            )),
        )
        .route("/hooks/after-auth", post(hooks::after_auth_event))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}
