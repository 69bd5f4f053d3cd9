//! Extension read/write flows against the in-process Shopify mock.

#![allow(clippy::unwrap_used)]

use preferences_core::{APP_NAMESPACE, CheckoutContext, PREFERENCE_KEY, SURVEY_KEY};
use preferences_extensions::{
    CustomerPreference, ExtensionError, GraphQLEndpoint, NicknameClient, OrderSurvey, SurveyAnswer,
    SurveyClient,
};
use preferences_integration_tests::MockShopify;

const CUSTOMER_ID: &str = "gid://shopify/Customer/7001";
const ORDER_ID: &str = "gid://shopify/Order/5501";

fn nickname_client(mock: &MockShopify) -> NicknameClient {
    NicknameClient::new(GraphQLEndpoint::customer_account(
        reqwest::Client::new(),
        &mock.base_url(),
        None,
    ))
}

fn survey_client(mock: &MockShopify) -> SurveyClient {
    SurveyClient::new(GraphQLEndpoint::storefront(
        reqwest::Client::new(),
        &mock.base_url(),
        None,
    ))
}

// =============================================================================
// Nickname
// =============================================================================

#[tokio::test]
async fn test_nickname_read_returns_saved_value() {
    let mock = MockShopify::start().await;
    mock.set_customer(CUSTOMER_ID);
    mock.set_metafield(CUSTOMER_ID, PREFERENCE_KEY, "Pip");

    let preference = nickname_client(&mock).read().await;

    assert_eq!(
        preference,
        CustomerPreference {
            customer_id: CUSTOMER_ID.to_string(),
            nick_name: "Pip".to_string(),
        }
    );

    let request = &mock.requests()[0];
    assert_eq!(request.path, "/api/2024-10/graphql.json");
    assert_eq!(request.variables["key"], PREFERENCE_KEY);
    assert_eq!(request.variables["namespace"], APP_NAMESPACE);
}

#[tokio::test]
async fn test_nickname_read_without_metafield_is_empty() {
    let mock = MockShopify::start().await;
    mock.set_customer(CUSTOMER_ID);

    let preference = nickname_client(&mock).read().await;

    assert_eq!(preference.customer_id, CUSTOMER_ID);
    assert_eq!(preference.nick_name, "");
}

#[tokio::test]
async fn test_nickname_read_failures_yield_sentinel() {
    let mock = MockShopify::start().await;

    // No signed-in customer
    assert!(nickname_client(&mock).read().await.is_unset());

    mock.set_customer(CUSTOMER_ID);
    mock.fail_with_graphql_error("Access denied");
    assert!(nickname_client(&mock).read().await.is_unset());

    mock.fail_with_status(500);
    assert!(nickname_client(&mock).read().await.is_unset());
}

#[tokio::test]
async fn test_nickname_try_read_surfaces_errors() {
    let mock = MockShopify::start().await;
    mock.fail_with_graphql_error("Access denied");

    let err = nickname_client(&mock).try_read().await.unwrap_err();

    assert!(matches!(err, ExtensionError::GraphQL(ref messages) if messages == &["Access denied"]));
}

#[tokio::test]
async fn test_nickname_write_saves_value() {
    let mock = MockShopify::start().await;

    let saved = nickname_client(&mock)
        .write(CUSTOMER_ID, Some("Pip"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(saved.value, "Pip");
    assert_eq!(mock.metafield(CUSTOMER_ID, PREFERENCE_KEY).as_deref(), Some("Pip"));

    let input = &mock.requests()[0].variables["metafields"][0];
    assert_eq!(input["namespace"], APP_NAMESPACE);
    assert_eq!(input["type"], "single_line_text_field");
    assert_eq!(input["ownerId"], CUSTOMER_ID);
}

#[tokio::test]
async fn test_nickname_write_none_clears_value() {
    let mock = MockShopify::start().await;
    mock.set_metafield(CUSTOMER_ID, PREFERENCE_KEY, "Pip");

    nickname_client(&mock).write(CUSTOMER_ID, None).await.unwrap();

    assert_eq!(mock.metafield(CUSTOMER_ID, PREFERENCE_KEY).as_deref(), Some(""));
}

#[tokio::test]
async fn test_nickname_write_user_errors_fail() {
    let mock = MockShopify::start().await;
    mock.reject_writes("Value is too long");

    let err = nickname_client(&mock)
        .write(CUSTOMER_ID, Some("Pip"))
        .await
        .unwrap_err();

    let ExtensionError::PreferenceWriteFailed(errors) = err else {
        panic!("expected PreferenceWriteFailed, got {err:?}");
    };
    assert_eq!(errors[0].message, "Value is too long");
    assert_eq!(errors[0].code.as_deref(), Some("INVALID_VALUE"));
}

#[tokio::test]
async fn test_nickname_write_graphql_errors_fail() {
    let mock = MockShopify::start().await;
    mock.fail_with_graphql_error("Access denied for metafieldsSet field");

    let err = nickname_client(&mock)
        .write(CUSTOMER_ID, Some("Pip"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ExtensionError::GraphQL(ref messages) if messages == &["Access denied for metafieldsSet field"]
    ));
    assert_eq!(mock.metafield(CUSTOMER_ID, PREFERENCE_KEY), None);
}

#[tokio::test]
async fn test_nickname_write_user_errors_with_null_metafields_fail() {
    let mock = MockShopify::start().await;
    mock.reject_writes("Value is too long");

    let err = nickname_client(&mock)
        .write(CUSTOMER_ID, Some("Pip"))
        .await
        .unwrap_err();

    assert!(matches!(err, ExtensionError::PreferenceWriteFailed(ref errors) if errors.len() == 1));
}

#[tokio::test]
async fn test_nickname_write_with_sentinel_id_sends_nothing() {
    let mock = MockShopify::start().await;

    let err = nickname_client(&mock).write("", Some("Pip")).await.unwrap_err();

    assert!(matches!(err, ExtensionError::InvalidOwner(_)));
    assert!(mock.requests().is_empty());
}

// =============================================================================
// Survey
// =============================================================================

#[tokio::test]
async fn test_survey_submit_stores_answer_on_order() {
    let mock = MockShopify::start().await;
    let context = CheckoutContext::resolve(Some("gid://shopify/OrderIdentity/5501"));

    let saved = survey_client(&mock)
        .submit(&context, SurveyAnswer::Podcast.as_str())
        .await;

    assert!(saved);
    assert_eq!(mock.metafield(ORDER_ID, SURVEY_KEY).as_deref(), Some("podcast"));
    assert_eq!(mock.operations(), vec!["MetafieldsSet"]);
    assert_eq!(mock.requests()[0].path, "/api/2025-01/graphql.json");
}

#[tokio::test]
async fn test_survey_submit_user_errors_return_false() {
    let mock = MockShopify::start().await;
    mock.reject_writes("Owner does not exist");
    let context = CheckoutContext::resolve(Some(ORDER_ID));

    assert!(!survey_client(&mock).submit(&context, "tv").await);
    assert_eq!(mock.metafield(ORDER_ID, SURVEY_KEY), None);
}

#[tokio::test]
async fn test_survey_submit_graphql_errors_return_false() {
    let mock = MockShopify::start().await;
    mock.fail_with_graphql_error("boom");
    let context = CheckoutContext::resolve(Some(ORDER_ID));

    assert!(!survey_client(&mock).submit(&context, "tv").await);
    assert_eq!(mock.operations(), vec!["MetafieldsSet"]);
    assert_eq!(mock.metafield(ORDER_ID, SURVEY_KEY), None);
}

#[tokio::test]
async fn test_survey_submit_outside_order_confirmation_sends_nothing() {
    let mock = MockShopify::start().await;

    let saved = survey_client(&mock)
        .submit(&CheckoutContext::resolve(None), "tv")
        .await;

    assert!(!saved);
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_survey_write_returns_metafield() {
    let mock = MockShopify::start().await;

    let metafield = survey_client(&mock)
        .write(ORDER_ID, "family")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(metafield.key, SURVEY_KEY);
    assert_eq!(metafield.namespace, APP_NAMESPACE);
    assert_eq!(metafield.value, "family");
    assert!(metafield.updated_at.is_some());
}

#[tokio::test]
async fn test_survey_read_normalizes_order_identity() {
    let mock = MockShopify::start().await;
    mock.add_order(ORDER_ID);
    mock.set_metafield(ORDER_ID, SURVEY_KEY, "tiktok");

    let survey = survey_client(&mock)
        .read("gid://shopify/OrderIdentity/5501")
        .await;

    assert_eq!(survey.order_id, ORDER_ID);
    assert_eq!(survey.choice(), Some(SurveyAnswer::Tiktok));
    assert_eq!(mock.requests()[0].variables["orderId"], ORDER_ID);
}

#[tokio::test]
async fn test_survey_read_graphql_errors_yield_sentinel() {
    let mock = MockShopify::start().await;
    mock.add_order(ORDER_ID);
    mock.set_metafield(ORDER_ID, SURVEY_KEY, "tv");
    mock.fail_with_graphql_error("Throttled");

    let survey = survey_client(&mock).read(ORDER_ID).await;

    assert_eq!(survey, OrderSurvey::default());
    assert_eq!(mock.count("GetOrderSurvey"), 1);
}

#[tokio::test]
async fn test_survey_read_unknown_order_yields_sentinel() {
    let mock = MockShopify::start().await;

    let survey = survey_client(&mock).read(ORDER_ID).await;

    assert_eq!(survey, OrderSurvey::default());
}
