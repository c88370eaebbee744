//! HTTP integration tests for the storefront API.
//!
//! Builds the real router over the in-memory store and a signature-checking
//! mock gateway, then drives it with `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use reelstore::adapters::http::{api_router, AppState};
use reelstore::adapters::memory::InMemoryStore;
use reelstore::adapters::stripe::{checkout_event_json, signature_header, MockPaymentGateway};
use reelstore::application::handlers::CheckoutSettings;
use reelstore::domain::foundation::{ItemId, OrderId, UserId};

const WEBHOOK_SECRET: &str = "whsec_http_test";

// =============================================================================
// Test Infrastructure
// =============================================================================

struct TestApp {
    router: Router,
    store: Arc<InMemoryStore>,
}

impl TestApp {
    fn new() -> Self {
        Self::with_gateway(MockPaymentGateway::with_webhook_secret(WEBHOOK_SECRET))
    }

    fn with_gateway(gateway: MockPaymentGateway) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let state = AppState {
            catalog: store.clone(),
            cart: store.clone(),
            orders: store.clone(),
            payments: store.clone(),
            ownership: store.clone(),
            gateway: Arc::new(gateway),
            checkout: CheckoutSettings {
                currency: "usd".to_string(),
                success_url: "https://shop.test/success".to_string(),
                cancel_url: "https://shop.test/cancel".to_string(),
            },
        };
        Self {
            router: api_router(state),
            store,
        }
    }

    fn item(&self, title: &str, cents: i64) -> ItemId {
        self.store.add_catalog_item(title, cents).unwrap()
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn as_user(&self, user: &str, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("X-User-Id", user);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    async fn add_to_cart(&self, user: &str, item_id: ItemId) -> StatusCode {
        self.as_user(
            user,
            Method::POST,
            "/api/cart/items",
            Some(json!({ "item_id": item_id.to_string() })),
        )
        .await
        .0
    }

    async fn checkout(&self, user: &str) -> (StatusCode, Value) {
        self.as_user(user, Method::POST, "/api/orders/checkout", None).await
    }

    async fn post_webhook(&self, payload: Vec<u8>, signature: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/payments/webhook")
            .header(header::CONTENT_TYPE, "application/json")
            .header("Stripe-Signature", signature)
            .body(Body::from(payload))
            .unwrap();
        self.send(request).await
    }
}

fn completed_payload(order_id: &OrderId, payment_ref: &str, amount: i64) -> Vec<u8> {
    checkout_event_json(
        "evt_http",
        "checkout.session.completed",
        order_id,
        Some(payment_ref),
        amount,
    )
    .to_string()
    .into_bytes()
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

fn order_id_of(checkout: &Value) -> OrderId {
    checkout["order"]["id"].as_str().unwrap().parse().unwrap()
}

// =============================================================================
// Identity
// =============================================================================

#[tokio::test]
async fn missing_user_header_is_unauthorized() {
    let app = TestApp::new();

    let request = Request::builder()
        .uri("/api/cart")
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.send(request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["code"].is_string());
}

// =============================================================================
// Cart and Checkout
// =============================================================================

#[tokio::test]
async fn cart_lists_items_with_total() {
    let app = TestApp::new();
    let a = app.item("A", 1000);
    let b = app.item("B", 500);
    assert_eq!(app.add_to_cart("alice", a).await, StatusCode::CREATED);
    assert_eq!(app.add_to_cart("alice", b).await, StatusCode::CREATED);

    let (status, cart) = app.as_user("alice", Method::GET, "/api/cart", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["item_count"], 2);
    assert_eq!(cart["total_cents"], 1500);
    assert_eq!(cart["pending_order_id"], Value::Null);
}

#[tokio::test]
async fn adding_same_item_twice_conflicts() {
    let app = TestApp::new();
    let a = app.item("A", 1000);
    app.add_to_cart("alice", a).await;

    assert_eq!(app.add_to_cart("alice", a).await, StatusCode::CONFLICT);
}

#[tokio::test]
async fn malformed_item_id_is_bad_request() {
    let app = TestApp::new();

    let (status, body) = app
        .as_user(
            "alice",
            Method::POST,
            "/api/cart/items",
            Some(json!({ "item_id": "not-a-uuid" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn checkout_returns_pending_order_and_session_url() {
    let app = TestApp::new();
    let a = app.item("A", 1000);
    let b = app.item("B", 500);
    app.add_to_cart("alice", a).await;
    app.add_to_cart("alice", b).await;

    let (status, body) = app.checkout("alice").await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["order"]["status"], "pending");
    assert_eq!(body["order"]["total_cents"], 1500);
    assert_eq!(body["order"]["line_items"].as_array().unwrap().len(), 2);
    assert!(body["checkout_url"].as_str().unwrap().starts_with("https://"));
}

#[tokio::test]
async fn second_checkout_with_pending_order_conflicts() {
    let app = TestApp::new();
    let a = app.item("A", 1000);
    let b = app.item("B", 500);
    app.add_to_cart("alice", a).await;
    let (_, first) = app.checkout("alice").await;
    app.add_to_cart("alice", b).await;

    let (status, body) = app.checkout("alice").await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "ACTIVE_ORDER_EXISTS");
    let (_, cart) = app.as_user("alice", Method::GET, "/api/cart", None).await;
    assert_eq!(cart["pending_order_id"], first["order"]["id"]);
}

#[tokio::test]
async fn empty_cart_checkout_is_unprocessable() {
    let app = TestApp::new();

    let (status, body) = app.checkout("alice").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "EMPTY_CART");
}

#[tokio::test]
async fn gateway_outage_is_bad_gateway_with_restored_cart() {
    let app = TestApp::with_gateway(MockPaymentGateway::failing_checkout());
    let a = app.item("A", 1000);
    app.add_to_cart("alice", a).await;

    let (status, body) = app.checkout("alice").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["details"]["cart_restored"], true);
    let (_, cart) = app.as_user("alice", Method::GET, "/api/cart", None).await;
    assert_eq!(cart["item_count"], 1);
    assert_eq!(cart["pending_order_id"], Value::Null);
}

#[tokio::test]
async fn gateway_outage_with_stuck_order_reports_it_pending() {
    let app = TestApp::with_gateway(MockPaymentGateway::failing_checkout());
    let a = app.item("A", 1000);
    app.add_to_cart("alice", a).await;
    app.store.fail_status_transitions(true);

    let (status, body) = app.checkout("alice").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["details"]["order_pending"], true);
    let stuck = body["details"]["order_id"].clone();

    app.store.fail_status_transitions(false);
    let (retry, retry_body) = app.checkout("alice").await;
    assert_eq!(retry, StatusCode::CONFLICT);
    assert_eq!(retry_body["details"]["order_id"], stuck);
}

#[tokio::test]
async fn orders_are_private_to_their_owner() {
    let app = TestApp::new();
    let a = app.item("A", 1000);
    app.add_to_cart("alice", a).await;
    let (_, checkout) = app.checkout("alice").await;
    let uri = format!("/api/orders/{}", order_id_of(&checkout));

    let (own, _) = app.as_user("alice", Method::GET, &uri, None).await;
    let (other, _) = app.as_user("mallory", Method::GET, &uri, None).await;

    assert_eq!(own, StatusCode::OK);
    assert_eq!(other, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn canceling_pending_order_frees_checkout() {
    let app = TestApp::new();
    let a = app.item("A", 1000);
    app.add_to_cart("alice", a).await;
    let (_, checkout) = app.checkout("alice").await;
    let uri = format!("/api/orders/{}/cancel", order_id_of(&checkout));

    let (status, order) = app.as_user("alice", Method::POST, &uri, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["status"], "canceled");
    assert_eq!(
        app.store.pending_order_count(&UserId::new("alice").unwrap()).unwrap(),
        0
    );
}

// =============================================================================
// Webhook
// =============================================================================

#[tokio::test]
async fn webhook_with_bad_signature_is_unauthorized() {
    let app = TestApp::new();
    let payload = completed_payload(&OrderId::new(), "pay_1", 1500);
    let signature = signature_header("whsec_wrong", now(), &payload);

    let (status, body) = app.post_webhook(payload, &signature).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_SIGNATURE");
    assert_eq!(app.store.payment_count().unwrap(), 0);
}

#[tokio::test]
async fn webhook_without_signature_is_unauthorized() {
    let app = TestApp::new();
    let payload = completed_payload(&OrderId::new(), "pay_1", 1500);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/payments/webhook")
        .body(Body::from(payload))
        .unwrap();
    let (status, body) = app.send(request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "MISSING_SIGNATURE");
}

#[tokio::test]
async fn signed_webhook_pays_order_and_replay_is_acknowledged() {
    let app = TestApp::new();
    let a = app.item("A", 1000);
    let b = app.item("B", 500);
    app.add_to_cart("alice", a).await;
    app.add_to_cart("alice", b).await;
    let (_, checkout) = app.checkout("alice").await;
    let order_id = order_id_of(&checkout);
    let payload = completed_payload(&order_id, "pay_1", 1500);

    let (first, first_body) = app
        .post_webhook(payload.clone(), &signature_header(WEBHOOK_SECRET, now(), &payload))
        .await;
    let (replay, replay_body) = app
        .post_webhook(payload.clone(), &signature_header(WEBHOOK_SECRET, now(), &payload))
        .await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(first_body["result"], "reconciled");
    assert_eq!(first_body["outcome"]["outcome"], "applied");
    assert_eq!(replay, StatusCode::OK);
    assert_eq!(replay_body["outcome"]["outcome"], "already_applied");

    let (_, order) = app
        .as_user("alice", Method::GET, &format!("/api/orders/{}", order_id), None)
        .await;
    assert_eq!(order["status"], "paid");
    assert_eq!(order["payment"]["amount_cents"], 1500);

    let (_, library) = app.as_user("alice", Method::GET, "/api/library", None).await;
    assert_eq!(library["items"].as_array().unwrap().len(), 2);

    let (_, payments) = app.as_user("alice", Method::GET, "/api/payments", None).await;
    assert_eq!(payments["payments"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unhandled_event_type_is_acknowledged() {
    let app = TestApp::new();
    let payload = json!({
        "id": "evt_other",
        "type": "customer.created",
        "created": now(),
        "data": { "object": {} }
    })
    .to_string()
    .into_bytes();

    let (status, body) = app
        .post_webhook(payload.clone(), &signature_header(WEBHOOK_SECRET, now(), &payload))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "ignored");
}
