// tests/api.rs

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use stockroom::{
    config::{AppState, Settings, Stores},
    routes::build_router,
    services::inventory_service::OverRemovalPolicy,
};

fn app_with(settings: Settings) -> Router {
    build_router(AppState::with_stores(settings, Stores::in_memory()))
}

fn app() -> Router {
    app_with(Settings::default())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
    (status, value)
}

async fn seed_product(app: &Router, sku: &str, quantity: i64, reorder_point: i64) -> i64 {
    let (status, category) = send(app, Method::POST, "/api/categories", Some(json!({ "name": format!("Cat {sku}") }))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, product) = send(
        app,
        Method::POST,
        "/api/products",
        Some(json!({
            "name": format!("Produto {sku}"),
            "sku": sku,
            "quantity": quantity,
            "reorderPoint": reorder_point,
            "unitPrice": 2.5,
            "categoryId": category["id"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    product["id"].as_i64().unwrap()
}

fn adjustment(direction: &str, quantity: Value, reason: &str) -> Value {
    json!({ "direction": direction, "quantity": quantity, "reason": reason })
}

#[tokio::test]
async fn health_check_answers_ok() {
    let app = app();
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn restock_then_oversized_removal_clamps_to_zero() {
    let app = app();
    let id = seed_product(&app, "RST-1", 5, 10).await;

    let (status, outcome) = send(
        &app,
        Method::POST,
        &format!("/api/products/{id}/adjustments"),
        Some(adjustment("add", json!(10), "Restock")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(outcome["product"]["quantity"], 15);
    assert_eq!(outcome["product"]["status"], "in-stock");
    assert_eq!(outcome["previousStatus"], "low-stock");
    assert_eq!(outcome["movement"]["type"], "IN");
    assert_eq!(outcome["movement"]["quantity"], 10);

    // O formulário manda a quantidade como texto.
    let (status, outcome) = send(
        &app,
        Method::POST,
        &format!("/api/products/{id}/adjustments"),
        Some(adjustment("remove", json!("25"), "Sale")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(outcome["product"]["quantity"], 0);
    assert_eq!(outcome["product"]["status"], "out-of-stock");
    assert_eq!(outcome["clamped"], true);
    assert_eq!(outcome["movement"]["quantity"], 25);

    let (status, history) = send(&app, Method::GET, &format!("/api/products/{id}/movements"), None).await;
    assert_eq!(status, StatusCode::OK);
    let types: Vec<&str> = history.as_array().unwrap().iter().map(|m| m["type"].as_str().unwrap()).collect();
    assert_eq!(types, vec!["OUT", "IN"]);
    assert_eq!(history[0]["productSku"], "RST-1");
}

#[tokio::test]
async fn invalid_adjustment_returns_field_errors_and_writes_nothing() {
    let app = app();
    let id = seed_product(&app, "VAL-1", 7, 2).await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/products/{id}/adjustments"),
        Some(adjustment("add", json!("abc"), "")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["quantity"].is_array());
    assert!(body["details"]["reason"].is_array());

    let (_, history) = send(&app, Method::GET, &format!("/api/products/{id}/movements"), None).await;
    assert_eq!(history.as_array().unwrap().len(), 0);

    let (_, product) = send(&app, Method::GET, &format!("/api/products/{id}"), None).await;
    assert_eq!(product["quantity"], 7);
}

#[tokio::test]
async fn reject_policy_answers_conflict() {
    let app = app_with(Settings { over_removal: OverRemovalPolicy::Reject, ..Settings::default() });
    let id = seed_product(&app, "REJ-1", 20, 5).await;

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/products/{id}/adjustments"),
        Some(adjustment("remove", json!(25), "Damage")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, product) = send(&app, Method::GET, &format!("/api/products/{id}"), None).await;
    assert_eq!(product["quantity"], 20);
    let (_, history) = send(&app, Method::GET, "/api/stock-movements", None).await;
    assert_eq!(history.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn repeated_request_key_is_replayed() {
    let app = app();
    let id = seed_product(&app, "KEY-1", 1, 0).await;
    let mut payload = adjustment("add", json!(4), "Purchase");
    payload["requestKey"] = json!("form-123");

    let (first_status, first) =
        send(&app, Method::POST, &format!("/api/products/{id}/adjustments"), Some(payload.clone())).await;
    let (second_status, second) =
        send(&app, Method::POST, &format!("/api/products/{id}/adjustments"), Some(payload)).await;

    assert_eq!(first_status, StatusCode::CREATED);
    assert_eq!(second_status, StatusCode::OK);
    assert_eq!(second["replayed"], true);
    assert_eq!(second["movement"]["id"], first["movement"]["id"]);

    let (_, product) = send(&app, Method::GET, &format!("/api/products/{id}"), None).await;
    assert_eq!(product["quantity"], 5);
}

#[tokio::test]
async fn missing_records_are_not_found() {
    let app = app();

    let (status, _) = send(&app, Method::GET, "/api/products/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/products/999/adjustments",
        Some(adjustment("add", json!(1), "Restock")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::GET, "/api/stock-movements/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, "/api/categories/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn catalogue_rules_are_enforced() {
    let app = app();
    let id = seed_product(&app, "CAT-1", 3, 1).await;

    // Saldo não se edita pelo cadastro.
    let (status, body) = send(&app, Method::PATCH, &format!("/api/products/{id}"), Some(json!({ "quantity": 50 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["quantity"].is_array());

    let (status, updated) =
        send(&app, Method::PATCH, &format!("/api/products/{id}"), Some(json!({ "reorderPoint": 3 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "low-stock");

    let (_, product) = send(&app, Method::GET, &format!("/api/products/{id}"), None).await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/products",
        Some(json!({ "name": "Outro", "sku": "cat-1", "unitPrice": 1, "categoryId": product["categoryId"] })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/categories/{}", product["categoryId"]), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/products/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::DELETE, &format!("/api/categories/{}", product["categoryId"]), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn product_list_filters_by_status() {
    let app = app();
    seed_product(&app, "LST-1", 0, 2).await;
    seed_product(&app, "LST-2", 50, 2).await;

    let (status, out) = send(&app, Method::GET, "/api/products?status=out-of-stock", None).await;
    assert_eq!(status, StatusCode::OK);
    let skus: Vec<&str> = out.as_array().unwrap().iter().map(|p| p["sku"].as_str().unwrap()).collect();
    assert_eq!(skus, vec!["LST-1"]);

    let (_, found) = send(&app, Method::GET, "/api/products?search=lst-2", None).await;
    assert_eq!(found.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn summary_reflects_adjustments() {
    let app = app();
    let id = seed_product(&app, "SUM-1", 4, 5).await;
    seed_product(&app, "SUM-2", 0, 5).await;

    send(&app, Method::POST, &format!("/api/products/{id}/adjustments"), Some(adjustment("add", json!(6), "Restock")))
        .await;

    let (status, summary) = send(&app, Method::GET, "/api/reports/summary", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["totalProducts"], 2);
    assert_eq!(summary["lowStockCount"], 0);
    assert_eq!(summary["outOfStockCount"], 1);
    assert_eq!(summary["recentMovements"].as_array().unwrap().len(), 1);

    let (status, report) = send(&app, Method::GET, "/api/reports/inventory", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["stockInLast7Days"], 6);
    assert_eq!(report["stockOutLast7Days"], 0);
    assert_eq!(report["topProducts"][0]["sku"], "SUM-1");
}

#[tokio::test]
async fn non_numeric_json_quantity_is_a_field_error() {
    let app = app();
    let id = seed_product(&app, "JSN-1", 4, 1).await;

    for quantity in [json!(true), json!([]), json!({})] {
        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/api/products/{id}/adjustments"),
            Some(adjustment("add", quantity, "Restock")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["details"]["quantity"].is_array());
    }

    let (_, history) = send(&app, Method::GET, &format!("/api/products/{id}/movements"), None).await;
    assert_eq!(history.as_array().unwrap().len(), 0);
    let (_, product) = send(&app, Method::GET, &format!("/api/products/{id}"), None).await;
    assert_eq!(product["quantity"], 4);
}

#[tokio::test]
async fn huge_quantities_and_prices_are_refused_and_reports_stay_up() {
    let app = app();
    let id = seed_product(&app, "BIG-1", 10, 1).await;
    let (_, product) = send(&app, Method::GET, &format!("/api/products/{id}"), None).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/products",
        Some(json!({ "name": "Enorme", "sku": "BIG-2", "quantity": 9_000_000_000_000_000_i64, "unitPrice": 1, "categoryId": product["categoryId"] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["quantity"].is_array());

    let (status, body) =
        send(&app, Method::PATCH, &format!("/api/products/{id}"), Some(json!({ "unitPrice": 1e15 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["unitPrice"].is_array());

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/products/{id}/adjustments"),
        Some(adjustment("add", json!(9_000_000_000_000_000_i64), "Restock")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["quantity"].is_array());

    let (status, _) = send(&app, Method::GET, "/api/reports/summary", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::GET, "/api/reports/inventory", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn description_is_cleared_with_null_or_empty_text() {
    let app = app();
    let id = seed_product(&app, "DSC-1", 1, 0).await;
    let uri = format!("/api/products/{id}");

    let (_, updated) = send(&app, Method::PATCH, &uri, Some(json!({ "description": "Azul, ponta fina" }))).await;
    assert_eq!(updated["description"], "Azul, ponta fina");

    // Campo ausente não mexe na descrição.
    let (_, updated) = send(&app, Method::PATCH, &uri, Some(json!({ "name": "Caneta" }))).await;
    assert_eq!(updated["description"], "Azul, ponta fina");

    let (status, updated) = send(&app, Method::PATCH, &uri, Some(json!({ "description": null }))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(updated["description"].is_null());

    send(&app, Method::PATCH, &uri, Some(json!({ "description": "Outra" }))).await;
    let (_, updated) = send(&app, Method::PATCH, &uri, Some(json!({ "description": "" }))).await;
    assert!(updated["description"].is_null());
}
