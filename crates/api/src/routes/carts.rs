//! Cart routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
};
use serde::Deserialize;

use bazaar_core::{ProductId, UserId};

use crate::error::Result;
use crate::extract::{JsonBody, PathParams};
use crate::models::Cart;
use crate::services::CartService;
use crate::state::AppState;

/// Create the cart routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/carts/users/{user_id}", get(show))
        .route("/carts/users/{user_id}/items", post(add_item).delete(clear))
        .route(
            "/carts/users/{user_id}/items/{product_id}",
            patch(update_item).delete(remove_item),
        )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCartItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartItemRequest {
    pub quantity: u32,
}

/// The user's cart; an empty one if nothing has been stored yet.
async fn show(State(state): State<AppState>, PathParams(user_id): PathParams<UserId>) -> Json<Cart> {
    Json(CartService::new(state.store()).get(&user_id))
}

async fn add_item(
    State(state): State<AppState>,
    PathParams(user_id): PathParams<UserId>,
    JsonBody(request): JsonBody<AddCartItemRequest>,
) -> Result<Json<Cart>> {
    let cart = CartService::new(state.store()).add_item(
        &user_id,
        &request.product_id,
        request.quantity,
    )?;
    Ok(Json(cart))
}

async fn update_item(
    State(state): State<AppState>,
    PathParams((user_id, product_id)): PathParams<(UserId, ProductId)>,
    JsonBody(request): JsonBody<UpdateCartItemRequest>,
) -> Result<Json<Cart>> {
    let cart = CartService::new(state.store()).update_item(&user_id, &product_id, request.quantity)?;
    Ok(Json(cart))
}

async fn remove_item(
    State(state): State<AppState>,
    PathParams((user_id, product_id)): PathParams<(UserId, ProductId)>,
) -> Result<StatusCode> {
    CartService::new(state.store()).remove_item(&user_id, &product_id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn clear(State(state): State<AppState>, PathParams(user_id): PathParams<UserId>) -> StatusCode {
    CartService::new(state.store()).clear(&user_id);
    StatusCode::NO_CONTENT
}
