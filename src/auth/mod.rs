//! Token authentication for the content store.
//!
//! Accepts the credential as `Authorization: token <t>`, `Authorization:
//! Bearer <t>` or `x-api-key: <t>`, compared in constant time.

use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;

use crate::errors::AppError;

/// Header name for the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Token authentication layer function that takes the expected token as a parameter.
pub async fn token_auth_layer(
    expected_token: Option<String>,
    request: Request,
    next: Next,
) -> Response {
    // If no token is configured, allow all requests (dev mode)
    let Some(expected) = expected_token else {
        return next.run(request).await;
    };

    match provided_token(request.headers()) {
        Some(provided) if constant_time_compare(&provided, &expected) => next.run(request).await,
        Some(_) => AppError::Unauthorized("Bad credentials".to_string()).into_response(),
        None => AppError::Unauthorized("Requires authentication".to_string()).into_response(),
    }
}

/// Extract the credential from the request headers.
fn provided_token(headers: &HeaderMap) -> Option<String> {
    if let Some(key) = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()) {
        return Some(key.to_string());
    }

    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())?;

    authorization
        .strip_prefix("token ")
        .or_else(|| authorization.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
