//! Order placement, status workflow and cancellation over HTTP.

#![allow(clippy::unwrap_used)]

use axum::Router;
use axum::http::{Method, StatusCode};
use serde_json::{Value, json};

use bazaar_integration_tests::{
    ALICE_ID, BOB_ID, CLOTHING_ID, MACBOOK_ID, TSHIRT_ID, call, error_code, login_alice, router,
    shipping_address,
};

async fn create_product(app: &Router, token: &str, name: &str, price: f64, stock: u32) -> String {
    let (status, body) = call(
        app,
        Method::POST,
        "/products",
        Some(token),
        Some(json!({
            "name": name,
            "description": "",
            "price": price,
            "stock": stock,
            "categoryId": CLOTHING_ID
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_owned()
}

async fn stock_of(app: &Router, product_id: &str) -> u64 {
    let (_, body) = call(app, Method::GET, &format!("/products/{product_id}"), None, None).await;
    body["stock"].as_u64().unwrap()
}

async fn place_order(app: &Router, token: &str, user_id: &str, items: Value) -> (StatusCode, Value) {
    call(
        app,
        Method::POST,
        &format!("/orders/users/{user_id}"),
        Some(token),
        Some(json!({ "items": items, "shippingAddress": shipping_address() })),
    )
    .await
}

async fn set_status(app: &Router, token: &str, order_id: &str, status: &str) -> (StatusCode, Value) {
    call(
        app,
        Method::PATCH,
        &format!("/orders/status/{order_id}"),
        Some(token),
        Some(json!({ "status": status })),
    )
    .await
}

#[tokio::test]
async fn test_place_order_snapshots_prices_and_takes_stock() {
    let app = router();
    let token = login_alice(&app).await;
    let mug = create_product(&app, &token, "Mug", 10.0, 5).await;
    let lamp = create_product(&app, &token, "Lamp", 25.0, 4).await;

    let (status, order) = place_order(
        &app,
        &token,
        ALICE_ID,
        json!([
            { "productId": mug, "quantity": 2 },
            { "productId": lamp, "quantity": 2 }
        ]),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["status"], "pending");
    assert_eq!(order["userId"], ALICE_ID);
    assert_eq!(order["totalAmount"].as_f64().unwrap(), 70.0);
    assert_eq!(order["items"][0]["productName"], "Mug");
    assert_eq!(order["items"][0]["price"].as_f64().unwrap(), 10.0);
    assert_eq!(stock_of(&app, &mug).await, 3);
    assert_eq!(stock_of(&app, &lamp).await, 2);

    // later price changes do not touch the placed order
    call(
        &app,
        Method::PATCH,
        &format!("/products/{mug}"),
        Some(&token),
        Some(json!({ "price": 99.0 })),
    )
    .await;
    let id = order["id"].as_str().unwrap();
    let (_, fetched) = call(&app, Method::GET, &format!("/orders/{id}"), Some(&token), None).await;
    assert_eq!(fetched["totalAmount"].as_f64().unwrap(), 70.0);
}

#[tokio::test]
async fn test_place_order_empties_cart() {
    let app = router();
    let token = login_alice(&app).await;

    call(
        &app,
        Method::POST,
        &format!("/carts/users/{ALICE_ID}/items"),
        Some(&token),
        Some(json!({ "productId": TSHIRT_ID, "quantity": 2 })),
    )
    .await;
    let (status, _) = place_order(
        &app,
        &token,
        ALICE_ID,
        json!([{ "productId": TSHIRT_ID, "quantity": 2 }]),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, cart) = call(&app, Method::GET, &format!("/carts/users/{ALICE_ID}"), Some(&token), None).await;
    assert_eq!(cart["items"], json!([]));
}

#[tokio::test]
async fn test_place_order_failures() {
    let app = router();
    let token = login_alice(&app).await;

    let (status, body) = place_order(
        &app,
        &token,
        ALICE_ID,
        json!([{ "productId": MACBOOK_ID, "quantity": 11 }]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "INSUFFICIENT_STOCK");
    assert_eq!(stock_of(&app, MACBOOK_ID).await, 10);

    let (status, body) = place_order(&app, &token, ALICE_ID, json!([])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "VALIDATION_ERROR");

    let (status, body) = place_order(
        &app,
        &token,
        "ghost",
        json!([{ "productId": TSHIRT_ID, "quantity": 1 }]),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "User not found");

    let (status, body) = place_order(
        &app,
        &token,
        ALICE_ID,
        json!([{ "productId": "missing", "quantity": 1 }]),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Product missing not found");
}

#[tokio::test]
async fn test_status_workflow() {
    let app = router();
    let token = login_alice(&app).await;
    let (_, order) = place_order(
        &app,
        &token,
        ALICE_ID,
        json!([{ "productId": TSHIRT_ID, "quantity": 1 }]),
    )
    .await;
    let id = order["id"].as_str().unwrap();

    let (status, body) = set_status(&app, &token, id, "shipped").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "INVALID_STATE_TRANSITION");
    assert_eq!(body["error"]["message"], "Cannot transition from pending to shipped");
    assert_eq!(body["error"]["details"]["allowed"], json!(["processing", "cancelled"]));

    for next in ["processing", "shipped", "delivered"] {
        let (status, body) = set_status(&app, &token, id, next).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], next);
    }
}

#[tokio::test]
async fn test_cancel_restores_stock() {
    let app = router();
    let token = login_alice(&app).await;
    let (_, order) = place_order(
        &app,
        &token,
        ALICE_ID,
        json!([{ "productId": TSHIRT_ID, "quantity": 4 }]),
    )
    .await;
    let id = order["id"].as_str().unwrap();
    assert_eq!(stock_of(&app, TSHIRT_ID).await, 96);

    let (status, body) = call(&app, Method::POST, &format!("/orders/cancel/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled");
    assert_eq!(stock_of(&app, TSHIRT_ID).await, 100);

    let (status, body) = call(&app, Method::POST, &format!("/orders/cancel/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Cannot cancel order with status cancelled");
    assert_eq!(stock_of(&app, TSHIRT_ID).await, 100);
}

#[tokio::test]
async fn test_cancel_via_status_change_restores_stock() {
    let app = router();
    let token = login_alice(&app).await;
    let (_, order) = place_order(
        &app,
        &token,
        ALICE_ID,
        json!([{ "productId": MACBOOK_ID, "quantity": 3 }]),
    )
    .await;
    let id = order["id"].as_str().unwrap();

    let (status, _) = set_status(&app, &token, id, "cancelled").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stock_of(&app, MACBOOK_ID).await, 10);
}

#[tokio::test]
async fn test_shipped_order_cannot_be_cancelled() {
    let app = router();
    let token = login_alice(&app).await;
    let (_, order) = place_order(
        &app,
        &token,
        ALICE_ID,
        json!([{ "productId": TSHIRT_ID, "quantity": 1 }]),
    )
    .await;
    let id = order["id"].as_str().unwrap();
    set_status(&app, &token, id, "processing").await;
    set_status(&app, &token, id, "shipped").await;

    let (status, body) = call(&app, Method::POST, &format!("/orders/cancel/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "INVALID_STATE_TRANSITION");
    assert_eq!(body["error"]["details"]["status"], "shipped");
    assert_eq!(stock_of(&app, TSHIRT_ID).await, 99);
}

#[tokio::test]
async fn test_list_orders_filters() {
    let app = router();
    let token = login_alice(&app).await;
    let one = json!([{ "productId": TSHIRT_ID, "quantity": 1 }]);

    place_order(&app, &token, ALICE_ID, one.clone()).await;
    place_order(&app, &token, ALICE_ID, one.clone()).await;
    place_order(&app, &token, BOB_ID, one).await;

    let (_, all) = call(&app, Method::GET, "/orders", Some(&token), None).await;
    assert_eq!(all["total"], 3);

    let uri = format!("/orders?userId={BOB_ID}");
    let (_, bobs) = call(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(bobs["total"], 1);

    let uri = format!("/orders/users/{ALICE_ID}?limit=1");
    let (_, alices) = call(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(alices["total"], 2);
    assert_eq!(alices["items"].as_array().unwrap().len(), 1);

    let (_, cancelled) = call(&app, Method::GET, "/orders?status=cancelled", Some(&token), None).await;
    assert_eq!(cancelled["total"], 0);
}

#[tokio::test]
async fn test_unknown_order() {
    let app = router();
    let token = login_alice(&app).await;

    let (status, body) = call(&app, Method::GET, "/orders/nope", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Order not found");
}
