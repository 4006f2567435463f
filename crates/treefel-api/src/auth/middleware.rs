use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use subtle::ConstantTimeEq;
use treefel_core::AppError;

/// Credentials the admin routes are checked against
#[derive(Clone)]
pub struct AuthState {
    pub admin_api_key: String,
}

fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

fn unauthorized(message: &str) -> Response {
    HttpAppError(AppError::Unauthorized(message.to_string())).into_response()
}

/// Require `Authorization: Bearer <ADMIN_API_KEY>`
pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    request: Request,
    next: Next,
) -> Response {
    let auth_header = match request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    {
        Some(h) => h,
        None => {
            tracing::warn!(path = %request.uri().path(), "Missing authorization header");
            return unauthorized("Missing authorization header");
        }
    };

    let Some(token) = auth_header.strip_prefix("Bearer ") else {
        tracing::warn!(path = %request.uri().path(), "Invalid authorization header format");
        return unauthorized("Invalid authorization header format");
    };

    if !secure_compare(token.trim(), &auth_state.admin_api_key) {
        tracing::warn!(path = %request.uri().path(), "Invalid API key");
        return unauthorized("Invalid API key");
    }

    next.run(request).await
}
