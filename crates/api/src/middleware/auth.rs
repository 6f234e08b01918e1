//! Bearer-token authentication middleware and extractor.
//!
//! [`require_bearer`] runs on every request but only gates the protected
//! path prefixes. On success it stores the [`CurrentSession`] in the request
//! extensions, where handlers pick it up with [`RequireAuth`].

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::error::{AppError, set_sentry_user};
use crate::models::AuthUser;
use crate::state::AppState;

/// Path prefixes that require a valid bearer token.
pub const PROTECTED_PREFIXES: &[&str] = &["/carts", "/orders", "/users", "/auth/me", "/auth/logout"];

const MISSING_HEADER: &str = "Missing Authorization header";
const INVALID_FORMAT: &str = "Invalid Authorization header format";
const INVALID_TOKEN: &str = "Invalid or expired token";

/// The authenticated caller of a protected request.
#[derive(Debug, Clone)]
pub struct CurrentSession {
    /// User snapshot taken at login.
    pub user: AuthUser,
    /// The bearer token that authenticated the request.
    pub token: String,
}

/// Whether `path` falls under one of [`PROTECTED_PREFIXES`].
///
/// A prefix matches the exact path or the path followed by `/`, so
/// `/users` and `/users/42` are protected but `/usersettings` is not.
#[must_use]
pub fn is_protected(path: &str) -> bool {
    PROTECTED_PREFIXES.iter().any(|prefix| {
        path.strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    })
}

/// Middleware that validates `Authorization: Bearer <token>` on protected
/// paths.
///
/// # Errors
///
/// Returns `AppError::Unauthorized` if the header is missing, not exactly
/// `Bearer <token>`, or the token is unknown or expired.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !is_protected(request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let token = bearer_token(request.headers())?;
    let session = state
        .auth()
        .validate_token(&token)
        .map_err(|_| AppError::Unauthorized(INVALID_TOKEN.to_string()))?;

    set_sentry_user(&session.user.id, &session.user.email);
    tracing::debug!(user_id = %session.user.id, "Authenticated request");

    request.extensions_mut().insert(CurrentSession {
        user: session.user,
        token: session.token,
    });

    Ok(next.run(request).await)
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Result<String, AppError> {
    let value = headers
        .get(AUTHORIZATION)
        .map(|v| v.to_str().map_err(|_| AppError::Unauthorized(INVALID_FORMAT.to_string())))
        .transpose()?
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Unauthorized(MISSING_HEADER.to_string()))?;

    match value.split(' ').collect::<Vec<_>>().as_slice() {
        ["Bearer", token] => Ok((*token).to_string()),
        _ => Err(AppError::Unauthorized(INVALID_FORMAT.to_string())),
    }
}

/// Extractor for the session established by [`require_bearer`].
///
/// # Example
///
/// ```rust,ignore
/// async fn me(RequireAuth(session): RequireAuth) -> Json<AuthUser> {
///     Json(session.user)
/// }
/// ```
pub struct RequireAuth(pub CurrentSession);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentSession>()
            .cloned()
            .map(Self)
            .ok_or_else(|| AppError::Unauthorized(MISSING_HEADER.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        map
    }

    fn rejection(result: Result<String, AppError>) -> String {
        result.unwrap_err().message()
    }

    #[test]
    fn test_protected_prefixes() {
        for path in [
            "/carts/users/1",
            "/orders",
            "/orders/abc",
            "/users",
            "/users/1",
            "/auth/me",
            "/auth/logout",
        ] {
            assert!(is_protected(path), "{path} should be protected");
        }
        for path in ["/products", "/categories/tree", "/auth/login", "/health", "/usersettings"] {
            assert!(!is_protected(path), "{path} should be public");
        }
    }

    #[test]
    fn test_bearer_token_ok() {
        assert_eq!(bearer_token(&headers("Bearer abc-123")).unwrap(), "abc-123");
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(rejection(bearer_token(&HeaderMap::new())), MISSING_HEADER);
        assert_eq!(rejection(bearer_token(&headers(""))), MISSING_HEADER);
    }

    #[test]
    fn test_invalid_format() {
        for value in ["abc-123", "Basic abc", "Bearer", "Bearer a b", "bearer abc"] {
            assert_eq!(
                rejection(bearer_token(&headers(value))),
                INVALID_FORMAT,
                "{value}"
            );
        }
    }
}
