//! Integration tests for the customer preferences app.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p preferences-integration-tests
//! ```
//!
//! No network access or credentials are needed: [`MockShopify`] serves the
//! Admin, Customer Account and storefront GraphQL operations the app and the
//! extensions send, on a random local port.
//!
//! # Test Categories
//!
//! - `provisioning` - Metafield definition lookup/create against the mock
//! - `webhooks` - Webhook subscription registration
//! - `after_auth` - Signed after-auth event through the full router
//! - `extensions` - Nickname and survey read/write clients
//! - `proxy` - CORS contract through the full middleware stack

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use hmac::{Hmac, Mac};
use preferences_app::config::{AppConfig, DEFAULT_API_VERSION, ShopifyAppConfig};
use preferences_core::MetafieldSpec;
use secrecy::SecretString;
use serde_json::{Value, json};
use sha2::Sha256;

/// Client secret used by [`test_config`].
pub const TEST_API_SECRET: &str = "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6";

/// Shop every test acts for.
pub const TEST_SHOP: &str = "pistachio.myshopify.com";

/// App config pointing at nothing external.
#[must_use]
pub fn test_config(webhook_topics: &[&str]) -> AppConfig {
    AppConfig {
        host: [127, 0, 0, 1].into(),
        port: 0,
        shopify: ShopifyAppConfig {
            api_key: "test-api-key".to_string(),
            api_secret: SecretString::from(TEST_API_SECRET),
            scopes: vec!["write_customers".to_string(), "write_orders".to_string()],
            app_url: url::Url::parse("https://prefs.test").expect("valid url"),
            api_version: DEFAULT_API_VERSION.to_string(),
            custom_shop_domain: None,
            webhook_topics: webhook_topics.iter().map(ToString::to_string).collect(),
        },
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// Base64 HMAC-SHA256 of `body`, as Shopify signs webhooks.
#[must_use]
pub fn sign(body: &[u8], secret: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("any key length");
    mac.update(body);
    BASE64.encode(mac.finalize().into_bytes())
}

/// One GraphQL request the mock received.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub operation_name: String,
    pub variables: Value,
}

/// How the mock misbehaves.
#[derive(Debug, Clone, Default)]
enum Failure {
    #[default]
    None,
    Status(u16),
    GraphQL(String),
}

#[derive(Debug, Clone)]
struct StoredDefinition {
    id: String,
    name: String,
    /// Definition input it was created from; null when seeded.
    input: Value,
}

#[derive(Debug, Default)]
struct MockState {
    requests: Vec<RecordedRequest>,
    failure: Failure,
    reject_creates: bool,
    write_error: Option<String>,
    /// (namespace, key, owner type) -> definition
    definitions: HashMap<(String, String, String), StoredDefinition>,
    /// topic -> callback URL
    subscriptions: HashMap<String, String>,
    customer_id: Option<String>,
    orders: Vec<String>,
    /// (owner id, key) -> value
    metafields: HashMap<(String, String), String>,
    next_id: u64,
}

impl MockState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-process stand-in for Shopify's GraphQL APIs.
///
/// Every path accepts GraphQL; requests are dispatched on `operationName`.
#[derive(Clone)]
pub struct MockShopify {
    addr: SocketAddr,
    state: Arc<Mutex<MockState>>,
}

impl MockShopify {
    /// Start the mock on a random local port.
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(MockState::default()));
        let app = Router::new()
            .fallback(graphql)
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock listener");
        let addr = listener.local_addr().expect("mock local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock server");
        });

        Self { addr, state }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().expect("mock state poisoned")
    }

    /// `http://127.0.0.1:<port>`
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Admin API endpoint for the default API version.
    #[must_use]
    pub fn admin_endpoint(&self) -> String {
        format!(
            "{}/admin/api/{DEFAULT_API_VERSION}/graphql.json",
            self.base_url()
        )
    }

    // -------------------------------------------------------------------------
    // Seeding and failure modes
    // -------------------------------------------------------------------------

    /// Pretend a definition for `spec` already exists.
    pub fn seed_definition(&self, spec: &MetafieldSpec) {
        let mut state = self.lock();
        let id = state.next_id();
        state.definitions.insert(
            (
                spec.namespace.to_string(),
                spec.key.to_string(),
                spec.owner_type.as_str().to_string(),
            ),
            StoredDefinition {
                id: format!("gid://shopify/MetafieldDefinition/{id}"),
                name: spec.name.to_string(),
                input: Value::Null,
            },
        );
    }

    /// Signed-in customer for Customer Account reads.
    pub fn set_customer(&self, customer_id: &str) {
        self.lock().customer_id = Some(customer_id.to_string());
    }

    /// Make `order_id` readable through the order query.
    pub fn add_order(&self, order_id: &str) {
        self.lock().orders.push(order_id.to_string());
    }

    /// Store a metafield value directly.
    pub fn set_metafield(&self, owner_id: &str, key: &str, value: &str) {
        self.lock()
            .metafields
            .insert((owner_id.to_string(), key.to_string()), value.to_string());
    }

    /// Answer every request with `status`.
    pub fn fail_with_status(&self, status: u16) {
        self.lock().failure = Failure::Status(status);
    }

    /// Answer every request with a GraphQL `errors` array.
    pub fn fail_with_graphql_error(&self, message: &str) {
        self.lock().failure = Failure::GraphQL(message.to_string());
    }

    /// Answer every definition create with user errors.
    pub fn reject_creates(&self) {
        self.lock().reject_creates = true;
    }

    /// Answer every `metafieldsSet` with a user error carrying `message`.
    pub fn reject_writes(&self, message: &str) {
        self.lock().write_error = Some(message.to_string());
    }

    // -------------------------------------------------------------------------
    // Inspection
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// Operation names in the order they arrived.
    #[must_use]
    pub fn operations(&self) -> Vec<String> {
        self.lock()
            .requests
            .iter()
            .map(|r| r.operation_name.clone())
            .collect()
    }

    /// Number of requests for `operation`.
    #[must_use]
    pub fn count(&self, operation: &str) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.operation_name == operation)
            .count()
    }

    pub fn clear_requests(&self) {
        self.lock().requests.clear();
    }

    #[must_use]
    pub fn definition_count(&self) -> usize {
        self.lock().definitions.len()
    }

    /// Input the definition for `spec` was created with.
    #[must_use]
    pub fn definition_input(&self, spec: &MetafieldSpec) -> Option<Value> {
        self.lock()
            .definitions
            .get(&(
                spec.namespace.to_string(),
                spec.key.to_string(),
                spec.owner_type.as_str().to_string(),
            ))
            .map(|d| d.input.clone())
    }

    #[must_use]
    pub fn subscription_callback(&self, topic: &str) -> Option<String> {
        self.lock().subscriptions.get(topic).cloned()
    }

    #[must_use]
    pub fn metafield(&self, owner_id: &str, key: &str) -> Option<String> {
        self.lock()
            .metafields
            .get(&(owner_id.to_string(), key.to_string()))
            .cloned()
    }

    /// Poll until `check` holds or two seconds pass.
    pub async fn wait_for(&self, check: impl Fn(&Self) -> bool) -> bool {
        for _ in 0..200 {
            if check(self) {
                return true;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        check(self)
    }
}

async fn graphql(
    State(state): State<Arc<Mutex<MockState>>>,
    uri: axum::http::Uri,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().expect("mock state poisoned");

    let operation = body["operationName"].as_str().unwrap_or_default().to_string();
    let variables = body["variables"].clone();
    state.requests.push(RecordedRequest {
        path: uri.path().to_string(),
        operation_name: operation.clone(),
        variables: variables.clone(),
    });

    match &state.failure {
        Failure::None => {}
        Failure::Status(status) => {
            let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            return (status, [("Retry-After", "3.0")], "mock failure").into_response();
        }
        Failure::GraphQL(message) => {
            return Json(json!({ "errors": [{ "message": message }] })).into_response();
        }
    }

    let data = match operation.as_str() {
        "getMetafieldDefinition" => get_definition(&state, &variables),
        "metafieldDefinitionCreate" => create_definition(&mut state, &variables),
        "webhookSubscriptionCreate" => create_subscription(&mut state, &variables),
        "GetCustomerPreferences" => get_customer(&state, &variables),
        "GetOrderSurvey" => get_order(&state, &variables),
        "setPreferences" | "MetafieldsSet" => set_metafields(&mut state, &variables),
        other => {
            return Json(json!({
                "errors": [{ "message": format!("unknown operation {other}") }]
            }))
            .into_response();
        }
    };

    Json(json!({ "data": data })).into_response()
}

fn str_var<'a>(variables: &'a Value, pointer: &str) -> &'a str {
    variables
        .pointer(pointer)
        .and_then(Value::as_str)
        .unwrap_or_default()
}

fn get_definition(state: &MockState, variables: &Value) -> Value {
    let namespace = str_var(variables, "/namespace");
    let owner_type = str_var(variables, "/ownerType");
    let nodes: Vec<Value> = state
        .definitions
        .get(&(
            namespace.to_string(),
            str_var(variables, "/key").to_string(),
            owner_type.to_string(),
        ))
        .map(|d| {
            json!({
                "id": d.id,
                "name": d.name,
                "namespace": namespace,
                "ownerType": owner_type,
            })
        })
        .into_iter()
        .collect();

    json!({ "metafieldDefinitions": { "nodes": nodes } })
}

fn create_definition(state: &mut MockState, variables: &Value) -> Value {
    let definition = &variables["definition"];
    let lookup = (
        str_var(definition, "/namespace").to_string(),
        str_var(definition, "/key").to_string(),
        str_var(definition, "/ownerType").to_string(),
    );

    if state.reject_creates || state.definitions.contains_key(&lookup) {
        return json!({
            "metafieldDefinitionCreate": {
                "createdDefinition": null,
                "userErrors": [{
                    "field": ["definition", "key"],
                    "message": "Key is in use for metafields on this namespace."
                }]
            }
        });
    }

    let id = state.next_id();
    let created = json!({ "key": lookup.1, "namespace": lookup.0 });
    state.definitions.insert(
        lookup,
        StoredDefinition {
            id: format!("gid://shopify/MetafieldDefinition/{id}"),
            name: str_var(definition, "/name").to_string(),
            input: definition.clone(),
        },
    );

    json!({
        "metafieldDefinitionCreate": {
            "createdDefinition": created,
            "userErrors": []
        }
    })
}

fn create_subscription(state: &mut MockState, variables: &Value) -> Value {
    let topic = str_var(variables, "/topic").to_string();
    let callback = str_var(variables, "/webhookSubscription/callbackUrl").to_string();

    if state.subscriptions.contains_key(&topic) {
        return json!({
            "webhookSubscriptionCreate": {
                "webhookSubscription": null,
                "userErrors": [{
                    "field": ["webhookSubscription", "callbackUrl"],
                    "message": "Address for this topic has already been taken"
                }]
            }
        });
    }

    let id = state.next_id();
    state.subscriptions.insert(topic.clone(), callback);
    json!({
        "webhookSubscriptionCreate": {
            "webhookSubscription": {
                "id": format!("gid://shopify/WebhookSubscription/{id}"),
                "topic": topic
            },
            "userErrors": []
        }
    })
}

fn metafield_json(state: &MockState, owner_id: &str, key: &str) -> Value {
    state
        .metafields
        .get(&(owner_id.to_string(), key.to_string()))
        .map_or(Value::Null, |value| json!({ "value": value }))
}

fn get_customer(state: &MockState, variables: &Value) -> Value {
    let customer = state.customer_id.as_deref().map_or(Value::Null, |id| {
        json!({
            "id": id,
            "metafield": metafield_json(state, id, str_var(variables, "/key")),
        })
    });
    json!({ "customer": customer })
}

fn get_order(state: &MockState, variables: &Value) -> Value {
    let order_id = str_var(variables, "/orderId");
    let order = if state.orders.iter().any(|o| o == order_id) {
        json!({
            "id": order_id,
            "metafield": metafield_json(state, order_id, str_var(variables, "/key")),
        })
    } else {
        Value::Null
    };
    json!({ "order": order })
}

fn set_metafields(state: &mut MockState, variables: &Value) -> Value {
    if let Some(message) = &state.write_error {
        return json!({
            "metafieldsSet": {
                "metafields": null,
                "userErrors": [{
                    "field": ["metafields", "0", "value"],
                    "message": message,
                    "code": "INVALID_VALUE"
                }]
            }
        });
    }

    let inputs = variables["metafields"].as_array().cloned().unwrap_or_default();
    let mut saved = Vec::with_capacity(inputs.len());
    for input in &inputs {
        let owner_id = str_var(input, "/ownerId").to_string();
        let key = str_var(input, "/key").to_string();
        let value = str_var(input, "/value").to_string();
        let id = state.next_id();
        saved.push(json!({
            "id": format!("gid://shopify/Metafield/{id}"),
            "key": key,
            "namespace": str_var(input, "/namespace"),
            "value": value,
            "createdAt": "2025-01-15T12:00:00Z",
            "updatedAt": "2025-01-15T12:00:00Z",
        }));
        state.metafields.insert((owner_id, key), value);
    }

    json!({ "metafieldsSet": { "metafields": saved, "userErrors": [] } })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_is_base64_sha256() {
        let signature = sign(b"{}", TEST_API_SECRET);
        assert_eq!(BASE64.decode(signature).expect("base64").len(), 32);
    }

    #[test]
    fn test_config_is_valid_for_test_shop() {
        assert!(test_config(&[]).shopify.is_valid_shop_domain(TEST_SHOP));
    }
}
