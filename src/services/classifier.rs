// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Maps persistence failures onto the platform's public error taxonomy.
//!
//! | kind        | code | HTTP | message                           |
//! |-------------|------|------|-----------------------------------|
//! | Connection  | 5001 | 503  | Database connection failed        |
//! | Query       | 5002 | 500  | Database query failed             |
//! | Timeout     | 5003 | 503  | Database operation timed out      |
//! | NotFound    | 1006 | 404  | Invoice not found                 |
//! | Unavailable | 5004 | 503  | Service temporarily unavailable   |
//!
//! An explicit [`DatabaseFailureKind`] tag anywhere in the error's source
//! chain wins. Otherwise the lower-cased messages of the whole chain are
//! searched for hints in the order connection, timeout, query, not-found.
//! Anything else is `Unavailable`.

use crate::db::{DatabaseError, DatabaseFailureKind};
use axum::http::StatusCode;
use std::error::Error as StdError;

const CONNECTION_HINTS: &[&str] = &["connection", "econnrefused", "could not connect"];
const TIMEOUT_HINTS: &[&str] = &["timeout", "timed out"];
const QUERY_HINTS: &[&str] = &["query", "syntax error", "relation", "column"];
const NOT_FOUND_HINTS: &[&str] = &["not found", "no rows"];

/// A failure mapped onto the public taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedError {
    pub kind: DatabaseFailureKind,
    pub code: u32,
    pub status: StatusCode,
    pub message: &'static str,
    pub trace_id: String,
}

impl ClassifiedError {
    /// Taxonomy entry for `kind` with a fresh trace id.
    pub fn from_kind(kind: DatabaseFailureKind) -> Self {
        let (code, status, message) = match kind {
            DatabaseFailureKind::Connection => (
                5001,
                StatusCode::SERVICE_UNAVAILABLE,
                "Database connection failed",
            ),
            DatabaseFailureKind::Query => (
                5002,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database query failed",
            ),
            DatabaseFailureKind::Timeout => (
                5003,
                StatusCode::SERVICE_UNAVAILABLE,
                "Database operation timed out",
            ),
            DatabaseFailureKind::NotFound => (1006, StatusCode::NOT_FOUND, "Invoice not found"),
            DatabaseFailureKind::Unavailable => (
                5004,
                StatusCode::SERVICE_UNAVAILABLE,
                "Service temporarily unavailable",
            ),
        };

        Self {
            kind,
            code,
            status,
            message,
            trace_id: new_trace_id(),
        }
    }
}

/// Classify any failure. Never panics, always yields a taxonomy entry.
pub fn classify(failure: &(dyn StdError + 'static)) -> ClassifiedError {
    let kind = tagged_kind(failure).unwrap_or_else(|| sniff_kind(&chain_message(failure)));
    ClassifiedError::from_kind(kind)
}

/// Messages of the whole source chain, outermost first.
fn chain_message(failure: &(dyn StdError + 'static)) -> String {
    let mut message = failure.to_string();
    let mut current = failure.source();
    while let Some(err) = current {
        message.push_str(": ");
        message.push_str(&err.to_string());
        current = err.source();
    }
    message
}

/// Fresh correlation id attached to an error response.
pub fn new_trace_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn tagged_kind(failure: &(dyn StdError + 'static)) -> Option<DatabaseFailureKind> {
    let mut current = Some(failure);
    while let Some(err) = current {
        if let Some(kind) = err.downcast_ref::<DatabaseError>().and_then(DatabaseError::kind) {
            return Some(kind);
        }
        current = err.source();
    }
    None
}

fn sniff_kind(message: &str) -> DatabaseFailureKind {
    let message = message.to_lowercase();
    let mentions = |hints: &[&str]| hints.iter().any(|hint| message.contains(hint));

    if mentions(CONNECTION_HINTS) {
        DatabaseFailureKind::Connection
    } else if mentions(TIMEOUT_HINTS) {
        DatabaseFailureKind::Timeout
    } else if mentions(QUERY_HINTS) {
        DatabaseFailureKind::Query
    } else if mentions(NOT_FOUND_HINTS) {
        DatabaseFailureKind::NotFound
    } else {
        DatabaseFailureKind::Unavailable
    }
}
