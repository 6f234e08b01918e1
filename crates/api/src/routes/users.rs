//! User routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use chrono::Utc;
use serde::Deserialize;

use bazaar_core::{Address, Email, UserId};

use super::{paginate, require_non_blank};
use crate::error::{AppError, Result};
use crate::extract::{JsonBody, PathParams, QueryParams};
use crate::models::{Page, User};
use crate::state::AppState;

const DEFAULT_LIMIT: usize = 20;

/// Create the user routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list).post(create))
        .route("/users/{id}", get(show).patch(update).delete(delete))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: Email,
    pub name: String,
    pub address: Option<Address>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<Email>,
    pub name: Option<String>,
    pub address: Option<Address>,
}

fn not_found() -> AppError {
    AppError::NotFound("User not found".to_string())
}

async fn list(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListUsersQuery>,
) -> Json<Page<User>> {
    Json(paginate(
        state.store().users(),
        query.limit,
        query.offset,
        DEFAULT_LIMIT,
    ))
}

async fn show(
    State(state): State<AppState>,
    PathParams(id): PathParams<UserId>,
) -> Result<Json<User>> {
    state.store().user(&id).map(Json).ok_or_else(not_found)
}

/// Create a user together with an empty cart.
async fn create(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>)> {
    require_non_blank("name", &request.name)?;

    let now = Utc::now();
    let user = state.store().create_user(User {
        id: UserId::generate(),
        email: request.email,
        name: request.name,
        address: request.address,
        created_at: now,
        updated_at: now,
    });

    tracing::info!(user_id = %user.id, "User created");
    Ok((StatusCode::CREATED, Json(user)))
}

async fn update(
    State(state): State<AppState>,
    PathParams(id): PathParams<UserId>,
    JsonBody(request): JsonBody<UpdateUserRequest>,
) -> Result<Json<User>> {
    let mut user = state.store().user(&id).ok_or_else(not_found)?;

    if let Some(email) = request.email {
        user.email = email;
    }
    if let Some(name) = request.name {
        require_non_blank("name", &name)?;
        user.name = name;
    }
    if let Some(address) = request.address {
        user.address = Some(address);
    }
    user.updated_at = Utc::now();

    state.store().update_user(user).map(Json).ok_or_else(not_found)
}

/// Delete a user and their cart. Orders are kept.
async fn delete(
    State(state): State<AppState>,
    PathParams(id): PathParams<UserId>,
) -> Result<StatusCode> {
    state.store().delete_user(&id).ok_or_else(not_found)?;
    tracing::info!(user_id = %id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}
