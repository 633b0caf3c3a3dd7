//! HTTP integration tests over the real router and an in-memory database.
//!
//! Fixtures are created through the API itself, so every test also
//! exercises the insert routes it depends on.

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use stockroom_db::{Database, DbConfig};
use stockroom_server::{build_router, AppState, ServerSettings};

// =============================================================================
// Harness
// =============================================================================

async fn make_server() -> TestServer {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let app = build_router(AppState::new(db), &ServerSettings::default());
    TestServer::new(app).unwrap()
}

async fn post_ok(server: &TestServer, path: &str, body: Value) -> Value {
    let response = server.post(path).json(&body).await;
    response.assert_status_ok();
    response.json()
}

/// Two brands, one model/quality, two categories, items A1 (brand X) and
/// B2 (brand Y).
async fn catalog_server() -> TestServer {
    let server = make_server().await;

    post_ok(&server, "/brand", json!({"name": "X"})).await;
    post_ok(&server, "/brand", json!({"name": "Y"})).await;
    post_ok(&server, "/model", json!({"name": "Galaxy S21"})).await;
    post_ok(&server, "/category", json!({"name": "Glass"})).await;
    post_ok(&server, "/category", json!({"name": "Glass + Frame"})).await;
    post_ok(&server, "/quality", json!({"name": "OEM"})).await;

    for (id, sku, brand, category) in [(1, "A1", 1, 1), (2, "B2", 2, 2)] {
        post_ok(
            &server,
            "/items",
            json!({
                "id": id,
                "SKU": sku,
                "brand": brand,
                "model": 1,
                "category": category,
                "quality": 1,
                "quantity": 5,
                "buyPrice": 1.0,
                "priceOne": 2.0
            }),
        )
        .await;
    }

    server
}

fn ids(rows: &Value) -> Vec<i64> {
    rows.as_array()
        .unwrap()
        .iter()
        .map(|row| row["id"].as_i64().unwrap())
        .collect()
}

// =============================================================================
// Item Search
// =============================================================================

#[tokio::test]
async fn test_items_filter_matches_sku_case_insensitively() {
    let server = catalog_server().await;

    let response = server
        .get("/itemsFilter")
        .add_query_param("search", "a1")
        .await;

    response.assert_status_ok();
    let rows: Value = response.json();
    assert_eq!(ids(&rows), vec![1]);
    assert_eq!(rows[0]["brand_name"], "X");
    assert_eq!(rows[0]["SKU"], "A1");
}

#[tokio::test]
async fn test_brand_sentinel_equals_no_brand_filter() {
    let server = catalog_server().await;

    let with_sentinel: Value = server
        .get("/itemsFilter")
        .add_query_param("search", "")
        .add_query_param("brandDivVal", "Select brand..")
        .await
        .json();
    let without: Value = server.get("/itemsFilter").await.json();

    assert_eq!(ids(&with_sentinel), vec![1, 2]);
    assert_eq!(with_sentinel, without);

    let only_y: Value = server
        .get("/itemsFilter")
        .add_query_param("brandDivVal", "Y")
        .await
        .json();
    assert_eq!(ids(&only_y), vec![2]);
}

#[tokio::test]
async fn test_category_plus_token_equals_literal_plus() {
    let server = catalog_server().await;

    let escaped: Value = server
        .get("/itemsFilter")
        .add_query_param("categoryDivVal", "Glass plus Frame")
        .await
        .json();
    let literal: Value = server
        .get("/itemsFilter")
        .add_query_param("categoryDivVal", "Glass + Frame")
        .await
        .json();

    assert_eq!(ids(&escaped), vec![2]);
    assert_eq!(escaped, literal);
}

#[tokio::test]
async fn test_limit_caps_results() {
    let server = catalog_server().await;

    let none: Value = server
        .get("/itemsFilter")
        .add_query_param("limit", "0")
        .await
        .json();
    assert!(none.as_array().unwrap().is_empty());

    let one: Value = server
        .get("/itemsFilter")
        .add_query_param("limit", "1")
        .await
        .json();
    assert_eq!(one.as_array().unwrap().len(), 1);

    // Unparseable limit falls back to the default instead of failing
    let response = server
        .get("/itemsFilter")
        .add_query_param("limit", "lots")
        .await;
    response.assert_status_ok();
    assert_eq!(ids(&response.json()), vec![1, 2]);
}

// =============================================================================
// Updates
// =============================================================================

#[tokio::test]
async fn test_put_changes_only_named_field() {
    let server = catalog_server().await;

    let response = server
        .put("/items/1")
        .json(&json!({"priceOne": 12.5}))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({"id": 1, "priceOne": 12.5}));

    let item: Value = server.get("/items/1").await.json();
    assert_eq!(item["priceOne"], 12.5);
    assert_eq!(item["buyPrice"], 1.0);
    assert_eq!(item["SKU"], "A1");
    assert_eq!(item["quantity"], 5);

    let other: Value = server.get("/items/2").await.json();
    assert_eq!(other["priceOne"], 2.0);
}

#[tokio::test]
async fn test_put_missing_row_is_not_found() {
    let server = catalog_server().await;

    let response = server
        .put("/items/999")
        .json(&json!({"priceOne": 1.0}))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_put_rejects_empty_and_unknown_fields() {
    let server = catalog_server().await;

    for path in ["/items/1", "/customers/1", "/brand/1"] {
        let response = server.put(path).json(&json!({})).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["code"], "EMPTY_UPDATE", "{path}");
    }

    let response = server
        .put("/items/1")
        .json(&json!({"priceOne": 3.0, "id = 0; --": 1}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "UNKNOWN_FIELD");

    // Rejected request changed nothing
    let item: Value = server.get("/items/1").await.json();
    assert_eq!(item["priceOne"], 2.0);
}

#[tokio::test]
async fn test_put_rejects_values_the_column_cannot_hold() {
    let server = catalog_server().await;

    for body in [json!({"quantity": "abc"}), json!({"SKU": null}), json!({"SKU": ["A1"]})] {
        let response = server.put("/items/1").json(&body).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["code"], "INVALID_FIELD_VALUE", "{body}");
    }

    // Search over the same rows still decodes
    let response = server.get("/itemsFilter").await;
    response.assert_status_ok();
    let rows: Value = response.json();
    assert_eq!(ids(&rows), vec![1, 2]);
    assert_eq!(rows[0]["quantity"], 5);
    assert_eq!(rows[0]["SKU"], "A1");
}

#[tokio::test]
async fn test_put_numeric_text_is_stored_as_number() {
    let server = catalog_server().await;

    server
        .put("/items/1")
        .json(&json!({"quantity": "9"}))
        .await
        .assert_status_ok();

    let rows: Value = server.get("/itemsFilter").add_query_param("search", "a1").await.json();
    assert_eq!(rows[0]["quantity"], 9);
}

#[tokio::test]
async fn test_delete_then_get_is_not_found() {
    let server = catalog_server().await;

    server.delete("/items/2").await.assert_status_ok();
    server.get("/items/2").await.assert_status(StatusCode::NOT_FOUND);
    server
        .delete("/items/2")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_order_is_all_or_nothing() {
    let server = catalog_server().await;

    let response = server
        .post("/update-order")
        .json(&json!({"orderedItems": [2, 1]}))
        .await;
    response.assert_status_ok();
    assert_eq!(ids(&server.get("/items").await.json()), vec![2, 1]);

    let response = server
        .post("/update-order")
        .json(&json!({"orderedItems": [1, 404, 2]}))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(ids(&server.get("/items").await.json()), vec![2, 1]);

    let response = server
        .post("/update-order")
        .json(&json!({"orderedItems": []}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "EMPTY_UPDATE");
}

// =============================================================================
// Invoices
// =============================================================================

async fn invoice_server() -> TestServer {
    let server = catalog_server().await;

    post_ok(&server, "/customers", json!({"name": "Walk-in"})).await;
    post_ok(&server, "/deliveries", json!({"name": "No Delivery"})).await;
    post_ok(&server, "/deliveries", json!({"name": "Sam Courier"})).await;

    for (delivery_id, status, item_ids) in [
        (1, "Paid", json!(["1"])),
        (2, "Paid", json!(["2"])),
        (2, "Canceled", json!(["1", "2"])),
    ] {
        post_ok(
            &server,
            "/posinvoices",
            json!({
                "newDate": "2024-03-01 10:00:00",
                "items": [],
                "customerId": 1,
                "deliveryId": delivery_id,
                "invStatus": status,
                "itemIds": item_ids
            }),
        )
        .await;
    }

    server
}

fn invoice_query(server: &TestServer) -> axum_test::TestRequest {
    server
        .get("/posinvoicesFilter")
        .add_query_param("startDate", "2024-03-01")
        .add_query_param("endDate", "2024-03-01")
        .add_query_param("checkIcon", "fa-solid fa-circle-check")
        .add_query_param("search", "")
}

#[tokio::test]
async fn test_invoice_filter_requires_date_range() {
    let server = invoice_server().await;

    let response = server
        .get("/posinvoicesFilter")
        .add_query_param("checkIcon", "fa-circle-check")
        .add_query_param("search", "")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "MISSING_PARAMETER");
}

#[tokio::test]
async fn test_invoice_filter_by_status_and_delivery() {
    let server = invoice_server().await;

    let paid: Value = invoice_query(&server).await.json();
    assert_eq!(ids(&paid), vec![2, 1]);

    let canceled: Value = server
        .get("/posinvoicesFilter")
        .add_query_param("startDate", "2024-03-01")
        .add_query_param("endDate", "2024-03-01")
        .add_query_param("checkIcon", "fa-solid fa-ban")
        .add_query_param("search", "")
        .await
        .json();
    assert_eq!(ids(&canceled), vec![3]);

    let delivered: Value = invoice_query(&server)
        .add_query_param("deliverySelectVal", "Delivery")
        .await
        .json();
    assert_eq!(ids(&delivered), vec![2]);
    assert_eq!(delivered[0]["delivery_name"], "Sam Courier");
}

#[tokio::test]
async fn test_invoice_filter_by_item_id() {
    let server = invoice_server().await;

    // The frontend sends the id list in `search` and the free text in
    // `searchVal`; either side of the OR group may match.
    let rows: Value = server
        .get("/posinvoicesFilter")
        .add_query_param("startDate", "2024-03-01")
        .add_query_param("endDate", "2024-03-01")
        .add_query_param("checkIcon", "fa-solid fa-circle-check")
        .add_query_param("search", "1")
        .add_query_param("searchVal", "zzz")
        .await
        .json();

    assert_eq!(ids(&rows), vec![1]);
}

// =============================================================================
// Loans, Contacts, Middleware
// =============================================================================

#[tokio::test]
async fn test_loans_by_customer_and_settlement() {
    let server = invoice_server().await;

    post_ok(&server, "/loans", json!({"amount": 10.0, "invoiceNum": 1, "customer_id": 1})).await;
    post_ok(&server, "/loans", json!({"amount": 4.0, "customer_id": 1})).await;

    let loans: Value = server.get("/loans/1").await.json();
    assert_eq!(loans.as_array().unwrap().len(), 2);

    let on_invoice: Value = server.get("/oneloan/1").await.json();
    assert_eq!(on_invoice[0]["amount"], 10.0);

    let cleared: Value = server.delete("/totalLoans/1").await.json();
    assert_eq!(cleared["affectedRows"], 2);

    let cleared_again = server.delete("/totalLoans/1").await;
    cleared_again.assert_status_ok();
    assert_eq!(cleared_again.json::<Value>()["affectedRows"], 0);
}

#[tokio::test]
async fn test_contact_lookup_and_validation() {
    let server = make_server().await;

    let created = post_ok(&server, "/workers", json!({"name": "Lina"})).await;
    assert_eq!(created["insertId"], 1);

    let worker: Value = server.get("/workers/1").await.json();
    assert_eq!(worker["name"], "Lina");

    server
        .get("/deliveries/1")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let response = server.post("/customers").json(&json!({"name": "  "})).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_item_with_unknown_brand_is_rejected() {
    let server = catalog_server().await;

    let response = server
        .post("/items")
        .json(&json!({"SKU": "Z9", "brand": 99, "model": 1, "category": 1, "quality": 1}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_duplicate_item_id_does_not_leak_column_names() {
    let server = catalog_server().await;

    let response = server
        .post("/items")
        .json(&json!({"id": 1, "SKU": "C3", "brand": 1, "model": 1, "category": 1, "quality": 1}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["message"], "Record already exists");
}

#[tokio::test]
async fn test_no_cache_headers_and_health() {
    let server = make_server().await;

    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "ok");
    assert_eq!(
        response.header("cache-control"),
        "no-store, no-cache, must-revalidate"
    );
    assert_eq!(response.header("pragma"), "no-cache");
    assert_eq!(response.header("expires"), "0");
}
