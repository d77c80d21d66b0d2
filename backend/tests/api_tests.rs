//! HTTP API tests
//!
//! Drive the router with `tower::ServiceExt::oneshot` against the in-memory
//! store: status codes, wire field names, error bodies and request IDs.

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use shared::CartTotals;
use tower::ServiceExt;
use uuid::Uuid;
use wms_backend::create_app;

use common::TestContext;

fn app(ctx: &TestContext) -> Router {
    create_app(ctx.state.clone())
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    app.clone().oneshot(request).await.unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create a warehouse and product over HTTP and stock 10 units at 100.0
async fn seed(app: &Router) -> (String, String) {
    let response = send(
        app,
        "POST",
        "/api/warehouses",
        Some(json!({ "address": "88 Wharf Street" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let warehouse_id = json_body(response).await["id"].as_str().unwrap().to_string();

    let response = send(
        app,
        "POST",
        "/api/products",
        Some(json!({
            "name": "Pallet wrap",
            "weight": 2.4,
            "desc": "500mm stretch film",
            "params": { "colour": "clear" },
            "barcode": "pallet-wrap.png"
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let product_id = json_body(response).await["id"].as_str().unwrap().to_string();

    let response = send(
        app,
        "POST",
        "/api/inventory",
        Some(json!({
            "warehouse_id": warehouse_id,
            "product_id": product_id,
            "product_count": 10,
            "product_price": 100.0
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    (warehouse_id, product_id)
}

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::new();
    let response = send(&app(&ctx), "GET", "/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_check_cart_then_buy() {
    let ctx = TestContext::new();
    let app = app(&ctx);
    let (warehouse_id, product_id) = seed(&app).await;

    let response = send(
        &app,
        "POST",
        "/api/inventory/add_discount",
        Some(json!({
            "warehouse_id": warehouse_id,
            "discounts": [{ "product_id": product_id, "discount": 20 }]
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let cart = json!({
        "warehouse_id": warehouse_id,
        "products": [{ "product_id": product_id, "product_count": 3 }]
    });

    let response = send(&app, "POST", "/api/inventory/check_cart", Some(cart.clone())).await;
    assert_eq!(response.status(), StatusCode::OK);
    let preview: CartTotals = serde_json::from_value(json_body(response).await).unwrap();
    assert_eq!(preview.total_price, dec!(300));
    assert_eq!(preview.total_price_with_discount, dec!(240));

    let response = send(&app, "POST", "/api/inventory/buy", Some(cart)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(body["products"][0].get("product_price_with_discount").is_some());
    let bought: CartTotals = serde_json::from_value(body).unwrap();
    assert_eq!(bought, preview);

    let response = send(
        &app,
        "GET",
        &format!("/api/warehouses/{}/products/{}", warehouse_id, product_id),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let detail = json_body(response).await;
    assert_eq!(detail["product_count"], 7);
    assert_eq!(detail["product_name"], "Pallet wrap");
}

#[tokio::test]
async fn test_change_count_and_listing() {
    let ctx = TestContext::new();
    let app = app(&ctx);
    let (warehouse_id, product_id) = seed(&app).await;

    let response = send(
        &app,
        "POST",
        "/api/inventory/change_count",
        Some(json!({
            "warehouse_id": warehouse_id,
            "product_id": product_id,
            "product_count": 5
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(
        &app,
        "GET",
        &format!("/api/warehouses/{}/products?page=1&limit=5", warehouse_id),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = json_body(response).await;
    assert_eq!(page["limit"], 5);
    assert_eq!(page["products"].as_array().unwrap().len(), 1);

    let warehouse = Uuid::parse_str(&warehouse_id).unwrap();
    let product = Uuid::parse_str(&product_id).unwrap();
    assert_eq!(ctx.quantity(warehouse, product).await, 15);
}

#[tokio::test]
async fn test_error_bodies() {
    let ctx = TestContext::new();
    let app = app(&ctx);
    let (warehouse_id, product_id) = seed(&app).await;

    // Not enough stock
    let response = send(
        &app,
        "POST",
        "/api/inventory/buy",
        Some(json!({
            "warehouse_id": warehouse_id,
            "products": [{ "product_id": product_id, "product_count": 11 }]
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await["error"]["code"],
        "NOT_ENOUGH_PRODUCT_COUNT"
    );

    // Discount for a product the warehouse does not stock
    let response = send(
        &app,
        "POST",
        "/api/inventory/add_discount",
        Some(json!({
            "warehouse_id": warehouse_id,
            "discounts": [{ "product_id": Uuid::new_v4(), "discount": 10 }]
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"]["code"], "INVENTORY_NOT_FOUND");

    // Duplicate stock entry
    let response = send(
        &app,
        "POST",
        "/api/inventory",
        Some(json!({
            "warehouse_id": warehouse_id,
            "product_id": product_id,
            "product_count": 1,
            "product_price": 1
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Empty cart
    let response = send(
        &app,
        "POST",
        "/api/inventory/check_cart",
        Some(json!({ "warehouse_id": warehouse_id, "products": [] })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["field"], "products");

    // Unknown product detail
    let response = send(
        &app,
        "GET",
        &format!("/api/warehouses/{}/products/{}", warehouse_id, Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_catalog_endpoints() {
    let ctx = TestContext::new();
    let app = app(&ctx);
    let (_, product_id) = seed(&app).await;

    let response = send(
        &app,
        "POST",
        "/api/warehouses",
        Some(json!({ "address": "88 Wharf Street" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = send(
        &app,
        "PUT",
        &format!("/api/products/{}", product_id),
        Some(json!({ "name": "Stretch wrap" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(
        &app,
        "PUT",
        &format!("/api/products/{}", Uuid::new_v4()),
        Some(json!({ "name": "Ghost" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, "GET", "/api/products", None).await;
    let body = json_body(response).await;
    assert_eq!(body["products"][0]["name"], "Stretch wrap");
    assert_eq!(body["products"][0]["desc"], "500mm stretch film");

    let response = send(&app, "GET", "/api/warehouses", None).await;
    assert_eq!(json_body(response).await["warehouses"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_analytics_endpoints() {
    let ctx = TestContext::new();
    let app = app(&ctx);
    let (warehouse_id, _) = seed(&app).await;

    let response = send(
        &app,
        "GET",
        &format!("/api/analytics/warehouses/{}", warehouse_id),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let report = json_body(response).await;
    assert_eq!(report["products"].as_array().unwrap().len(), 0);

    let response = send(&app, "GET", "/api/analytics/top_warehouses?limit=3", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let ranking = json_body(response).await;
    assert_eq!(ranking[0]["warehouse_address"], "88 Wharf Street");

    let response = send(&app, "GET", "/api/analytics/top_warehouses?limit=0", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_request_id_is_echoed_or_generated() {
    let ctx = TestContext::new();
    let app = app(&ctx);

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "trace-abc-123")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "trace-abc-123");

    let response = send(&app, "GET", "/health", None).await;
    let generated = response.headers()["x-request-id"].to_str().unwrap();
    assert!(Uuid::parse_str(generated).is_ok());
}

#[tokio::test]
async fn test_error_responses_carry_request_id() {
    let ctx = TestContext::new();
    let app = app(&ctx);

    let request = Request::builder()
        .method("POST")
        .uri("/api/inventory/check_cart")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-request-id", "trace-err-7")
        .body(Body::from(
            json!({ "warehouse_id": Uuid::new_v4(), "products": [] }).to_string(),
        ))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()["x-request-id"], "trace-err-7");
}
