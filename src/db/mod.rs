//! Database layer.
//!
//! [`InvoiceDb`] fronts one of three backends: managed Postgres (when
//! `DATABASE_URL` is configured), an in-process map for local development
//! and tests, or an offline stub whose every call fails with a connection
//! error. All operations report failures as [`DatabaseError`].

pub mod error;
pub mod memory;
pub mod postgres;

pub use error::{DatabaseError, DatabaseFailureKind};
pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use crate::config::DatabaseConfig;
use crate::models::{Invoice, InvoiceFilter, InvoicePage, InvoicePatch, PageRequest, ReviewDecision};

/// Table names as constants.
pub mod tables {
    pub const INVOICES: &str = "invoices";
}

#[derive(Clone)]
enum Backend {
    Postgres(PostgresStore),
    Memory(MemoryStore),
    Offline,
}

/// Invoice store used by the request handlers.
#[derive(Clone)]
pub struct InvoiceDb {
    backend: Backend,
}

impl InvoiceDb {
    /// Connect to Postgres and make sure the schema exists.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let store = PostgresStore::connect(config).await?;
        store.ensure_schema().await?;
        Ok(Self {
            backend: Backend::Postgres(store),
        })
    }

    /// In-process store; contents are lost on restart.
    pub fn new_memory() -> Self {
        Self {
            backend: Backend::Memory(MemoryStore::default()),
        }
    }

    /// Create a mock store for testing (offline mode).
    ///
    /// All database operations will return a connection error if called.
    pub fn new_mock() -> Self {
        Self {
            backend: Backend::Offline,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match &self.backend {
            Backend::Postgres(_) => "postgres",
            Backend::Memory(_) => "memory",
            Backend::Offline => "offline",
        }
    }

    /// List invoices, newest first.
    pub async fn list_invoices(
        &self,
        filter: &InvoiceFilter,
        page: PageRequest,
    ) -> Result<InvoicePage, DatabaseError> {
        match &self.backend {
            Backend::Postgres(store) => store.list_invoices(filter, page).await,
            Backend::Memory(store) => Ok(store.list_invoices(filter, page)),
            Backend::Offline => Err(DatabaseError::offline()),
        }
    }

    /// Apply a merchant review decision.
    pub async fn review_invoice(
        &self,
        id: &str,
        decision: &ReviewDecision,
    ) -> Result<Invoice, DatabaseError> {
        match &self.backend {
            Backend::Postgres(store) => store.review_invoice(id, decision).await,
            Backend::Memory(store) => store.review_invoice(id, decision),
            Backend::Offline => Err(DatabaseError::offline()),
        }
    }

    /// Insert a batch of invoices, all or nothing.
    pub async fn insert_invoices(
        &self,
        invoices: Vec<Invoice>,
    ) -> Result<Vec<Invoice>, DatabaseError> {
        match &self.backend {
            Backend::Postgres(store) => store.insert_invoices(invoices).await,
            Backend::Memory(store) => store.insert_invoices(invoices),
            Backend::Offline => Err(DatabaseError::offline()),
        }
    }

    /// Apply a partial update.
    pub async fn update_invoice(
        &self,
        id: &str,
        patch: &InvoicePatch,
    ) -> Result<Invoice, DatabaseError> {
        match &self.backend {
            Backend::Postgres(store) => store.update_invoice(id, patch).await,
            Backend::Memory(store) => store.update_invoice(id, patch),
            Backend::Offline => Err(DatabaseError::offline()),
        }
    }

    pub async fn delete_invoice(&self, id: &str) -> Result<(), DatabaseError> {
        match &self.backend {
            Backend::Postgres(store) => store.delete_invoice(id).await,
            Backend::Memory(store) => store.delete_invoice(id),
            Backend::Offline => Err(DatabaseError::offline()),
        }
    }
}
