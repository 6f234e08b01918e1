//! Shared helpers for the Bazaar end-to-end tests.
//!
//! Every test builds a fresh router over seeded demo data and drives it with
//! `tower::ServiceExt::oneshot`, so no socket is bound and tests do not share
//! state.

#![allow(clippy::expect_used)]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use bazaar_api::{ApiConfig, AppState};

pub use bazaar_api::store::seed::{
    ALICE_ID, BOB_ID, CLOTHING_ID, ELECTRONICS_ID, IPHONE_ID, LAPTOPS_ID, MACBOOK_ID,
    SMARTPHONES_ID, TSHIRT_ID,
};

pub const ALICE_EMAIL: &str = "alice@example.com";
pub const ALICE_PASSWORD: &str = "password123";

/// A router over freshly seeded state.
#[must_use]
pub fn router() -> Router {
    let state = AppState::new(ApiConfig::default()).expect("demo data should seed");
    bazaar_api::app(state)
}

/// Send one request and decode the JSON response body.
///
/// Empty bodies (204 responses) decode to [`Value::Null`].
pub async fn call(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build");

    send(router, request).await
}

/// Send a prebuilt request and decode the JSON response body.
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();

    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    };
    (status, value)
}

/// Log in and return the bearer token.
pub async fn login(router: &Router, email: &str, password: &str) -> String {
    let (status, body) = call(
        router,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["accessToken"]
        .as_str()
        .expect("accessToken should be a string")
        .to_owned()
}

/// Log in as the demo user Alice.
pub async fn login_alice(router: &Router) -> String {
    login(router, ALICE_EMAIL, ALICE_PASSWORD).await
}

/// The error code of an error response body.
#[must_use]
pub fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap_or_default()
}

/// A shipping address body accepted by the order endpoints.
#[must_use]
pub fn shipping_address() -> Value {
    json!({
        "street": "1 Market St",
        "city": "San Francisco",
        "state": "CA",
        "postalCode": "94105",
        "country": "US"
    })
}
