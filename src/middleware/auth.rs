//! Authentication middleware
//!
//! Write endpoints require `Authorization: Bearer <admin_token>`. Lookups stay
//! open. An empty configured token turns the check off.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::AppError;
use crate::state::AppState;

/// Routes that change directory data
fn is_write_path(path: &str) -> bool {
    const WRITE_SUFFIXES: &[&str] = &[
        "/department/add",
        "/department/update",
        "/department/del",
        "/department/sort",
        "/department/import",
        "/department/member/add",
        "/department/member/update",
        "/department/member/del",
        "/department/member/move",
        "/department/member/sort",
        "/ungrouped/add",
        "/set",
    ];
    path.starts_with("/organization/") && WRITE_SUFFIXES.iter().any(|s| path.ends_with(s))
}

fn bearer_token(request: &Request<Body>) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

/// Authentication middleware
pub async fn auth_layer(State(state): State<AppState>, request: Request<Body>, next: Next) -> Response {
    let expected = state.config.auth.admin_token.as_str();
    if expected.is_empty() || !is_write_path(request.uri().path()) {
        return next.run(request).await;
    }

    let (presented, authorized) = match bearer_token(&request) {
        Some(token) => (true, token == expected),
        None => (false, false),
    };
    if authorized {
        return next.run(request).await;
    }
    if presented {
        tracing::warn!("Rejected admin token for {}", request.uri().path());
    }
    AppError::Unauthorized.into_response()
}
