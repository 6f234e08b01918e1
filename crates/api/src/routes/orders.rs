//! Order routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use bazaar_core::{Address, OrderId, OrderStatus, ProductId, UserId};

use super::paginate;
use crate::error::{AppError, Result};
use crate::extract::{JsonBody, PathParams, QueryParams};
use crate::models::{Order, Page};
use crate::services::{OrderLine, OrderService};
use crate::state::AppState;

const DEFAULT_LIMIT: usize = 20;

/// Create the order routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list))
        .route("/orders/{id}", get(show))
        .route("/orders/users/{user_id}", get(list_by_user).post(create))
        .route("/orders/status/{id}", patch(update_status))
        .route("/orders/cancel/{id}", post(cancel))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOrdersQuery {
    pub user_id: Option<UserId>,
    pub status: Option<OrderStatus>,
    /// Inclusive lower bound on `createdAt` (RFC 3339).
    pub start_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `createdAt` (RFC 3339).
    pub end_date: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl ListOrdersQuery {
    fn matches(&self, order: &Order) -> bool {
        self.user_id.as_ref().is_none_or(|id| &order.user_id == id)
            && self.status.is_none_or(|status| order.status == status)
            && self.start_date.is_none_or(|start| order.created_at >= start)
            && self.end_date.is_none_or(|end| order.created_at <= end)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub items: Vec<CreateOrderItemRequest>,
    pub shipping_address: Address,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

/// Newest first; ties broken by ID for a stable order.
fn newest_first(mut orders: Vec<Order>) -> Vec<Order> {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
    orders
}

async fn list(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListOrdersQuery>,
) -> Json<Page<Order>> {
    let orders: Vec<Order> = state
        .store()
        .orders()
        .into_iter()
        .filter(|o| query.matches(o))
        .collect();

    Json(paginate(
        newest_first(orders),
        query.limit,
        query.offset,
        DEFAULT_LIMIT,
    ))
}

async fn show(
    State(state): State<AppState>,
    PathParams(id): PathParams<OrderId>,
) -> Result<Json<Order>> {
    state
        .store()
        .order(&id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))
}

async fn list_by_user(
    State(state): State<AppState>,
    PathParams(user_id): PathParams<UserId>,
    QueryParams(query): QueryParams<PageQuery>,
) -> Json<Page<Order>> {
    Json(paginate(
        newest_first(state.store().orders_by_user(&user_id)),
        query.limit,
        query.offset,
        DEFAULT_LIMIT,
    ))
}

/// Place an order from an explicit item list.
async fn create(
    State(state): State<AppState>,
    PathParams(user_id): PathParams<UserId>,
    JsonBody(request): JsonBody<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let lines: Vec<OrderLine> = request
        .items
        .into_iter()
        .map(|item| OrderLine {
            product_id: item.product_id,
            quantity: item.quantity,
        })
        .collect();

    let order = OrderService::new(state.store()).create(&user_id, &lines, request.shipping_address)?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn update_status(
    State(state): State<AppState>,
    PathParams(id): PathParams<OrderId>,
    JsonBody(request): JsonBody<UpdateOrderStatusRequest>,
) -> Result<Json<Order>> {
    let order = OrderService::new(state.store()).update_status(&id, request.status)?;
    Ok(Json(order))
}

/// Cancel a pending or processing order and restore its stock.
async fn cancel(
    State(state): State<AppState>,
    PathParams(id): PathParams<OrderId>,
) -> Result<Json<Order>> {
    let order = OrderService::new(state.store()).cancel(&id)?;
    Ok(Json(order))
}
