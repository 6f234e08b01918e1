//! Login, logout and current-user routes.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{AppError, Result};
use crate::extract::JsonBody;
use crate::middleware::RequireAuth;
use crate::middleware::rate_limit::RateLimiterLayer;
use crate::models::AuthUser;
use crate::state::AppState;

/// Create the auth routes router.
pub fn routes(login_limiter: Option<RateLimiterLayer>) -> Router<AppState> {
    let login_route = Router::new().route("/auth/login", post(login));
    let login_route = match login_limiter {
        Some(limiter) => login_route.layer(limiter),
        None => login_route,
    };

    login_route
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u32,
    pub user: AuthUser,
}

/// Exchange email and password for a bearer token.
async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    if request.email.is_empty() || request.password.is_empty() {
        return Err(AppError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    let session = state.auth().login(&request.email, &request.password)?;

    Ok(Json(LoginResponse {
        access_token: session.token,
        token_type: "Bearer",
        expires_in: state.auth().session_ttl_secs(),
        user: session.user,
    }))
}

/// End the session that authenticated this request.
async fn logout(State(state): State<AppState>, RequireAuth(session): RequireAuth) -> Json<Value> {
    state.auth().logout(&session.token);
    tracing::info!(user_id = %session.user.id, "User logged out");
    Json(json!({ "message": "Logged out successfully" }))
}

/// The user snapshot attached to the current session.
async fn me(RequireAuth(session): RequireAuth) -> Json<AuthUser> {
    Json(session.user)
}
