// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persistence failures, tagged by category where the store knows it.

use std::fmt;
use std::str::FromStr;

/// Category of a persistence failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseFailureKind {
    Connection,
    Query,
    Timeout,
    NotFound,
    Unavailable,
}

impl DatabaseFailureKind {
    pub const ALL: [Self; 5] = [
        Self::Connection,
        Self::Query,
        Self::Timeout,
        Self::NotFound,
        Self::Unavailable,
    ];

    /// Stable tag name, as used by the admin tooling and logs.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Connection => "DATABASE_CONNECTION_FAILED",
            Self::Query => "DATABASE_QUERY_FAILED",
            Self::Timeout => "DATABASE_TIMEOUT",
            Self::NotFound => "INVOICE_NOT_FOUND",
            Self::Unavailable => "SERVICE_UNAVAILABLE",
        }
    }
}

impl fmt::Display for DatabaseFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown failure kind: {0}")]
pub struct UnknownFailureKind(pub String);

impl FromStr for DatabaseFailureKind {
    type Err = UnknownFailureKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownFailureKind(s.to_string()))
    }
}

/// Error raised by an [`InvoiceDb`](crate::db::InvoiceDb) operation.
///
/// `kind` is `None` when the driver reported something we could not
/// categorise; the message is then the only signal left for classification.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct DatabaseError {
    kind: Option<DatabaseFailureKind>,
    message: String,
}

impl DatabaseError {
    pub fn tagged(kind: DatabaseFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind: Some(kind),
            message: message.into(),
        }
    }

    pub fn untagged(message: impl Into<String>) -> Self {
        Self {
            kind: None,
            message: message.into(),
        }
    }

    pub fn not_found(invoice_id: &str) -> Self {
        Self::tagged(
            DatabaseFailureKind::NotFound,
            format!("Invoice {} not found", invoice_id),
        )
    }

    pub fn offline() -> Self {
        Self::tagged(
            DatabaseFailureKind::Connection,
            "Database not connected (offline mode)",
        )
    }

    pub fn kind(&self) -> Option<DatabaseFailureKind> {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Postgres SQLSTATE for `query_canceled` (statement_timeout).
const QUERY_CANCELED: &str = "57014";

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        let kind = match &err {
            sqlx::Error::PoolTimedOut => Some(DatabaseFailureKind::Timeout),
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => Some(DatabaseFailureKind::Connection),
            sqlx::Error::RowNotFound => Some(DatabaseFailureKind::NotFound),
            sqlx::Error::Database(db) if db.code().as_deref() == Some(QUERY_CANCELED) => {
                Some(DatabaseFailureKind::Timeout)
            }
            sqlx::Error::Database(_)
            | sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnIndexOutOfBounds { .. }
            | sqlx::Error::TypeNotFound { .. }
            | sqlx::Error::Decode(_) => Some(DatabaseFailureKind::Query),
            _ => None,
        };

        Self {
            kind,
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_parse_back() {
        for kind in DatabaseFailureKind::ALL {
            assert_eq!(kind.name().parse::<DatabaseFailureKind>().unwrap(), kind);
        }
        assert_eq!(
            "database_timeout".parse::<DatabaseFailureKind>().unwrap(),
            DatabaseFailureKind::Timeout
        );
        assert!("DISK_FULL".parse::<DatabaseFailureKind>().is_err());
    }

    #[test]
    fn test_sqlx_errors_are_tagged() {
        assert_eq!(
            DatabaseError::from(sqlx::Error::PoolTimedOut).kind(),
            Some(DatabaseFailureKind::Timeout)
        );
        assert_eq!(
            DatabaseError::from(sqlx::Error::PoolClosed).kind(),
            Some(DatabaseFailureKind::Connection)
        );
        assert_eq!(
            DatabaseError::from(sqlx::Error::RowNotFound).kind(),
            Some(DatabaseFailureKind::NotFound)
        );
        assert_eq!(
            DatabaseError::from(sqlx::Error::ColumnNotFound("amount".to_string())).kind(),
            Some(DatabaseFailureKind::Query)
        );
        assert_eq!(
            DatabaseError::from(sqlx::Error::Protocol("unexpected message".to_string())).kind(),
            None
        );
    }
}
