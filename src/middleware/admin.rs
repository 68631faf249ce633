// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin key middleware for `/admin/*` routes.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;

pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// Require `X-Admin-Key` to match `ADMIN_API_KEY` when one is configured.
pub async fn require_admin_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(expected) = &state.config.admin_api_key {
        let presented = request
            .headers()
            .get(ADMIN_KEY_HEADER)
            .map(|h| h.as_bytes())
            .unwrap_or_default();

        if !bool::from(presented.ct_eq(expected.as_bytes())) {
            tracing::warn!(
                path = %request.uri().path(),
                "Blocked admin request with missing or invalid admin key"
            );
            return Err(AppError::AdminKeyRequired);
        }
    }

    Ok(next.run(request).await)
}
