// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.
//!
//! Every error leaves the service as `{ code, status, msg, trace_id }`.
//! Persistence and internal failures are routed through
//! [`classify`](crate::services::classifier::classify); this is the only
//! place that turns them into responses.

use crate::db::DatabaseError;
use crate::services::classifier::{classify, new_trace_id};
use crate::services::token::{InvalidReason, TokenError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Parameter validation failed.
pub const CODE_INVALID_PARAMS: u32 = 1001;
/// Authorization missing or invalid.
pub const CODE_UNAUTHORIZED: u32 = 1002;
/// Access token expired.
pub const CODE_TOKEN_EXPIRED: u32 = 1003;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid parameters: {0}")]
    BadRequest(String),

    #[error("Authorization required")]
    Unauthorized,

    #[error("Invalid token: {0}")]
    InvalidToken(InvalidReason),

    #[error("Access token expired")]
    TokenExpired,

    #[error("Invalid app credentials")]
    InvalidClient,

    #[error("Admin key required")]
    AdminKeyRequired,

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<InvalidReason> for AppError {
    fn from(reason: InvalidReason) -> Self {
        match reason {
            InvalidReason::Expired => AppError::TokenExpired,
            other => AppError::InvalidToken(other),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid(reason) => reason.into(),
            TokenError::Signing(e) => AppError::Internal(e.into()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::BadRequest(errors.to_string())
    }
}

/// JSON error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u32,
    pub status: u16,
    pub msg: String,
    pub trace_id: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, msg, trace_id) = match &self {
            AppError::Database(err) => {
                let classified = classify(err);
                tracing::error!(
                    trace_id = %classified.trace_id,
                    code = classified.code,
                    kind = %classified.kind,
                    error = %err,
                    "Database error"
                );
                (
                    classified.status,
                    classified.code,
                    classified.message.to_string(),
                    classified.trace_id,
                )
            }
            AppError::Internal(err) => {
                let source: &(dyn std::error::Error + 'static) = &**err;
                let classified = classify(source);
                tracing::error!(
                    trace_id = %classified.trace_id,
                    code = classified.code,
                    error = %err,
                    "Internal server error"
                );
                (
                    classified.status,
                    classified.code,
                    classified.message.to_string(),
                    classified.trace_id,
                )
            }
            other => {
                let (status, code) = match other {
                    AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, CODE_INVALID_PARAMS),
                    AppError::TokenExpired => (StatusCode::FORBIDDEN, CODE_TOKEN_EXPIRED),
                    _ => (StatusCode::UNAUTHORIZED, CODE_UNAUTHORIZED),
                };
                let trace_id = new_trace_id();
                tracing::info!(trace_id = %trace_id, code, error = %other, "Request rejected");
                (status, code, other.to_string(), trace_id)
            }
        };

        let body = ErrorResponse {
            code,
            status: status.as_u16(),
            msg,
            trace_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
