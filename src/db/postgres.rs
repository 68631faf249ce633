// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Postgres invoice store (managed, Postgres-compatible).

use crate::config::DatabaseConfig;
use crate::db::{tables, DatabaseError, DatabaseFailureKind};
use crate::models::{
    Invoice, InvoiceFilter, InvoicePage, InvoicePatch, InvoiceStatus, PageRequest,
    ReviewDecision,
};
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

const INVOICE_COLUMNS: &str =
    "id, order_id, title, tax_number, amount, status, reject_reason, created_at, updated_at";

/// Row shape as stored; `status` is kept as text.
#[derive(sqlx::FromRow)]
struct InvoiceRow {
    id: String,
    order_id: String,
    title: String,
    tax_number: Option<String>,
    amount: i64,
    status: String,
    reject_reason: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<InvoiceRow> for Invoice {
    type Error = DatabaseError;

    fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
        let status: InvoiceStatus = row.status.parse().map_err(|e| {
            DatabaseError::tagged(DatabaseFailureKind::Query, format!("Bad invoice row: {}", e))
        })?;

        Ok(Invoice {
            id: row.id,
            order_id: row.order_id,
            title: row.title,
            tax_number: row.tax_number,
            amount: row.amount,
            status,
            reject_reason: row.reject_reason,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Postgres-backed invoice store.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.url)
            .await?;

        tracing::info!(
            max_connections = config.max_connections,
            "Connected to Postgres"
        );
        Ok(Self { pool })
    }

    /// Create the invoices table if it does not exist.
    pub async fn ensure_schema(&self) -> Result<(), DatabaseError> {
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id TEXT PRIMARY KEY,
                order_id TEXT NOT NULL,
                title TEXT NOT NULL,
                tax_number TEXT,
                amount BIGINT NOT NULL CHECK (amount > 0),
                status TEXT NOT NULL DEFAULT 'pending',
                reject_reason TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )",
            tables::INVOICES
        );
        sqlx::query(&ddl).execute(&self.pool).await?;
        Ok(())
    }

    pub async fn list_invoices(
        &self,
        filter: &InvoiceFilter,
        page: PageRequest,
    ) -> Result<InvoicePage, DatabaseError> {
        let status = filter.status.map(InvoiceStatus::as_str);
        let order_id = filter.order_id.as_deref();
        let condition = "($1::text IS NULL OR status = $1) AND ($2::text IS NULL OR order_id = $2)";

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM {} WHERE {}",
            tables::INVOICES,
            condition
        ))
        .bind(status)
        .bind(order_id)
        .fetch_one(&self.pool)
        .await?;

        let rows: Vec<InvoiceRow> = sqlx::query_as(&format!(
            "SELECT {} FROM {} WHERE {} ORDER BY created_at DESC, id LIMIT $3 OFFSET $4",
            INVOICE_COLUMNS,
            tables::INVOICES,
            condition
        ))
        .bind(status)
        .bind(order_id)
        .bind(i64::from(page.page_size))
        .bind(i64::try_from(page.offset()).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        Ok(InvoicePage {
            invoices: rows
                .into_iter()
                .map(Invoice::try_from)
                .collect::<Result<_, _>>()?,
            total: u64::try_from(total).unwrap_or(0),
            page: page.page,
            page_size: page.page_size,
        })
    }

    pub async fn review_invoice(
        &self,
        id: &str,
        decision: &ReviewDecision,
    ) -> Result<Invoice, DatabaseError> {
        let row: Option<InvoiceRow> = sqlx::query_as(&format!(
            "UPDATE {} SET status = $2, reject_reason = $3, updated_at = now()
             WHERE id = $1 RETURNING {}",
            tables::INVOICES,
            INVOICE_COLUMNS
        ))
        .bind(id)
        .bind(decision.status.as_str())
        .bind(decision.reject_reason.as_deref())
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| DatabaseError::not_found(id))?.try_into()
    }

    pub async fn insert_invoices(
        &self,
        invoices: Vec<Invoice>,
    ) -> Result<Vec<Invoice>, DatabaseError> {
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            tables::INVOICES,
            INVOICE_COLUMNS
        );

        let mut tx = self.pool.begin().await?;
        for invoice in &invoices {
            sqlx::query(&sql)
                .bind(&invoice.id)
                .bind(&invoice.order_id)
                .bind(&invoice.title)
                .bind(invoice.tax_number.as_deref())
                .bind(invoice.amount)
                .bind(invoice.status.as_str())
                .bind(invoice.reject_reason.as_deref())
                .bind(invoice.created_at)
                .bind(invoice.updated_at)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        tracing::debug!(count = invoices.len(), "Inserted invoices");
        Ok(invoices)
    }

    pub async fn update_invoice(
        &self,
        id: &str,
        patch: &InvoicePatch,
    ) -> Result<Invoice, DatabaseError> {
        let row: Option<InvoiceRow> = sqlx::query_as(&format!(
            "UPDATE {} SET
                order_id = COALESCE($2, order_id),
                title = COALESCE($3, title),
                tax_number = COALESCE($4, tax_number),
                amount = COALESCE($5, amount),
                status = COALESCE($6, status),
                reject_reason = CASE
                    WHEN COALESCE($6, status) = 'rejected' THEN COALESCE($7, reject_reason)
                    ELSE NULL
                END,
                updated_at = now()
             WHERE id = $1 RETURNING {}",
            tables::INVOICES,
            INVOICE_COLUMNS
        ))
        .bind(id)
        .bind(patch.order_id.as_deref())
        .bind(patch.title.as_deref())
        .bind(patch.tax_number.as_deref())
        .bind(patch.amount)
        .bind(patch.status.map(InvoiceStatus::as_str))
        .bind(patch.reject_reason.as_deref())
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| DatabaseError::not_found(id))?.try_into()
    }

    pub async fn delete_invoice(&self, id: &str) -> Result<(), DatabaseError> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", tables::INVOICES))
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found(id));
        }
        Ok(())
    }
}
