// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bearer token authentication middleware.

use crate::error::AppError;
use crate::services::InvalidReason;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Authenticated merchant extracted from the access token.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub open_id: String,
    pub scope: Vec<String>,
    /// Access token expiry (Unix timestamp)
    pub expires_at: u64,
}

/// Middleware that requires a valid access token.
///
/// Missing or invalid tokens are rejected with 401/1002, expired ones with
/// 403/1003.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let grant = {
        let token = bearer_token(request.headers()).ok_or(AppError::Unauthorized)?;
        state.tokens.validate_access(token).map_err(|reason| {
            tracing::debug!(reason = %reason, "Rejected access token");
            AppError::from(reason)
        })?
    };

    // Scope is only checked for presence.
    if grant.scope.is_empty() {
        return Err(AppError::InvalidToken(InvalidReason::Malformed));
    }

    request.extensions_mut().insert(AuthContext {
        open_id: grant.subject_id,
        scope: grant.scope,
        expires_at: grant.expires_at,
    });

    Ok(next.run(request).await)
}

/// Extract the token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
