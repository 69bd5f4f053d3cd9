//! App proxy endpoint through the full middleware stack.

#![allow(clippy::unwrap_used)]

use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use preferences_app::middleware::REQUEST_ID_HEADER;
use preferences_app::state::AppState;
use preferences_integration_tests::{TEST_SHOP, test_config};
use serde_json::{Value, json};
use tower::ServiceExt;

fn app() -> axum::Router {
    preferences_app::app(AppState::new(test_config(&[])).unwrap())
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_preflight() {
    let response = app()
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/proxy")
                .header(header::ORIGIN, "https://extensions.shopifycdn.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
        "Authorization, Content-Type"
    );
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "GET, OPTIONS");
    assert_eq!(headers[header::ACCESS_CONTROL_MAX_AGE], "7200");
    assert!(headers.contains_key(REQUEST_ID_HEADER));

    assert_eq!(body_json(response).await, json!({ "status": 200 }));
}

#[tokio::test]
async fn test_get_from_shop_sets_frame_ancestors() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri(format!("/api/proxy?shop={TEST_SHOP}"))
                .header(REQUEST_ID_HEADER, "edge-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(headers[REQUEST_ID_HEADER], "edge-42");
    assert_eq!(
        headers[header::CONTENT_SECURITY_POLICY],
        "frame-ancestors https://pistachio.myshopify.com https://admin.shopify.com"
    );

    assert_eq!(
        body_json(response).await,
        json!({ "ok": true, "message": "Success", "data": "proxy loader response" })
    );
}

#[tokio::test]
async fn test_foreign_shop_gets_no_frame_ancestors() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/api/proxy?shop=evil.example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        !response
            .headers()
            .contains_key(header::CONTENT_SECURITY_POLICY)
    );
}

#[tokio::test]
async fn test_health_has_no_cors_header() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        !response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
    );
}
