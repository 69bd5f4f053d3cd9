//! After-auth hook, directly and through the signed HTTP event.

#![allow(clippy::unwrap_used)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use preferences_app::hooks::{HookError, after_auth};
use preferences_app::provision::TracingObserver;
use preferences_app::routes::hooks::{HMAC_HEADER, SHOP_DOMAIN_HEADER};
use preferences_app::shopify::ShopSession;
use preferences_app::state::AppState;
use preferences_core::CUSTOMER_PREFERENCE;
use preferences_integration_tests::{MockShopify, TEST_API_SECRET, TEST_SHOP, sign, test_config};
use secrecy::SecretString;
use tower::ServiceExt;

fn session() -> ShopSession {
    ShopSession::new(TEST_SHOP, SecretString::from("shpat_test")).with_scope("write_customers")
}

fn state(mock: &MockShopify, topics: &[&str]) -> AppState {
    AppState::with_admin_endpoint(test_config(topics), mock.admin_endpoint()).unwrap()
}

#[tokio::test]
async fn test_registers_webhooks_before_provisioning() {
    let mock = MockShopify::start().await;

    let report = after_auth(&session(), &state(&mock, &["APP_UNINSTALLED"]), &TracingObserver)
        .await
        .unwrap();

    assert_eq!(report.shop, TEST_SHOP);
    assert_eq!(report.webhooks.len(), 1);
    assert_eq!(report.provision.created_count(), 2);
    assert_eq!(mock.operations()[0], "webhookSubscriptionCreate");
    assert_eq!(
        mock.subscription_callback("APP_UNINSTALLED").as_deref(),
        Some("https://prefs.test/webhooks")
    );
}

#[tokio::test]
async fn test_repeat_authentication_only_looks_up() {
    let mock = MockShopify::start().await;
    let state = state(&mock, &["APP_UNINSTALLED"]);

    after_auth(&session(), &state, &TracingObserver).await.unwrap();
    mock.clear_requests();
    let report = after_auth(&session(), &state, &TracingObserver).await.unwrap();

    assert_eq!(report.provision.created_count(), 0);
    assert_eq!(mock.count("metafieldDefinitionCreate"), 0);
}

#[tokio::test]
async fn test_provisioning_failure_is_returned() {
    let mock = MockShopify::start().await;
    mock.fail_with_status(401);

    let err = after_auth(&session(), &state(&mock, &[]), &TracingObserver)
        .await
        .unwrap_err();

    assert!(matches!(err, HookError::Provision(_)));
}

#[tokio::test]
async fn test_webhook_failure_skips_provisioning() {
    let mock = MockShopify::start().await;
    mock.fail_with_status(500);

    let err = after_auth(&session(), &state(&mock, &["APP_UNINSTALLED"]), &TracingObserver)
        .await
        .unwrap_err();

    assert!(matches!(err, HookError::Webhooks(_)));
    assert_eq!(mock.operations(), vec!["webhookSubscriptionCreate"]);
}

#[tokio::test]
async fn test_signed_event_provisions_in_background() {
    let mock = MockShopify::start().await;
    let app = preferences_app::app(state(&mock, &[]));

    let body = format!(r#"{{"shop":"{TEST_SHOP}","accessToken":"shpat_test","scope":"write_customers"}}"#);
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/hooks/after-auth")
                .header(HMAC_HEADER, sign(body.as_bytes(), TEST_API_SECRET))
                .header(SHOP_DOMAIN_HEADER, TEST_SHOP)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert!(mock.wait_for(|m| m.definition_count() == 2).await);
    assert!(mock.definition_input(&CUSTOMER_PREFERENCE).is_some());
}

#[tokio::test]
async fn test_unsigned_event_never_reaches_shopify() {
    let mock = MockShopify::start().await;
    let app = preferences_app::app(state(&mock, &[]));

    let body = format!(r#"{{"shop":"{TEST_SHOP}","accessToken":"shpat_test"}}"#);
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/hooks/after-auth")
                .header(HMAC_HEADER, sign(body.as_bytes(), "not-the-app-secret"))
                .header(SHOP_DOMAIN_HEADER, TEST_SHOP)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(mock.requests().is_empty());
}
