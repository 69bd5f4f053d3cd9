//! App proxy endpoint.
//!
//! Extensions call this through Shopify's app proxy. It carries no data of its
//! own; it only has to satisfy the browser's CORS checks. The wildcard
//! `Access-Control-Allow-Origin` is added to every response by the route
//! layer in [`super::routes`].

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::{
        HeaderValue, Method, StatusCode,
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_MAX_AGE,
            CONTENT_SECURITY_POLICY,
        },
    },
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

pub const ALLOWED_HEADERS: &str = "Authorization, Content-Type";
pub const ALLOWED_METHODS: &str = "GET, OPTIONS";
pub const PREFLIGHT_MAX_AGE_SECS: &str = "7200";

#[derive(Debug, Deserialize)]
pub struct ProxyParams {
    pub shop: Option<String>,
}

#[derive(Debug, Serialize)]
struct PreflightBody {
    status: u16,
}

#[derive(Debug, Serialize)]
struct LoaderBody {
    ok: bool,
    message: &'static str,
    data: &'static str,
}

/// Answer a preflight or a plain proxy request.
///
/// An unparseable query string only skips the CSP header.
pub async fn proxy(
    State(state): State<AppState>,
    method: Method,
    params: Result<Query<ProxyParams>, QueryRejection>,
) -> Response {
    let shop = params.ok().and_then(|Query(params)| params.shop);

    let mut response = if method == Method::OPTIONS {
        preflight()
    } else {
        loader()
    };

    if let Some(shop) = shop
        .as_deref()
        .filter(|shop| state.shopify().is_valid_shop_domain(shop))
        && let Ok(value) = HeaderValue::from_str(&frame_ancestors(shop))
    {
        response.headers_mut().insert(CONTENT_SECURITY_POLICY, value);
    }

    response
}

fn preflight() -> Response {
    (
        StatusCode::OK,
        [
            (ACCESS_CONTROL_ALLOW_HEADERS, ALLOWED_HEADERS),
            (ACCESS_CONTROL_ALLOW_METHODS, ALLOWED_METHODS),
            (ACCESS_CONTROL_MAX_AGE, PREFLIGHT_MAX_AGE_SECS),
        ],
        Json(PreflightBody { status: 200 }),
    )
        .into_response()
}

fn loader() -> Response {
    Json(LoaderBody {
        ok: true,
        message: "Success",
        data: "proxy loader response",
    })
    .into_response()
}

/// Allow the shop's own admin and the unified admin to frame the response.
fn frame_ancestors(shop: &str) -> String {
    format!("frame-ancestors https://{shop} https://admin.shopify.com")
}
