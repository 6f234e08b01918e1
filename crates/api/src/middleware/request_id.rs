//! Per-request correlation IDs.
//!
//! Every request gets an `x-request-id`: the caller's when it sent a
//! non-blank one, otherwise a fresh UUID. The ID is stored in the request
//! extensions as [`RequestId`], recorded on the `request` span and the Sentry
//! scope, and copied onto the response.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// Header carrying the correlation ID in both directions.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Correlation ID of the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map_or_else(
                || Self(Uuid::new_v4().to_string()),
                |id| Self(id.to_owned()),
            )
    }
}

/// Attach a [`RequestId`] to the request and echo it on the response.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let id = RequestId::from_headers(request.headers());

    tracing::Span::current().record("request_id", id.0.as_str());
    sentry::configure_scope(|scope| scope.set_tag("request_id", &id.0));
    request.extensions_mut().insert(id.clone());

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&id.0) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
