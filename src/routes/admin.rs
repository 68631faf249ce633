// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin routes backing the invoice management UI.

use crate::error::{AppError, Result};
use crate::models::{Invoice, InvoicePage, InvoicePatch, NewInvoice};
use crate::routes::api::ListQuery;
use crate::routes::extract::{ValidJson, ValidQuery};
use crate::routes::{success, ApiResponse};
use crate::services::mock_data::generate_invoices;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/invoices", get(list_invoices))
        .route("/admin/invoices/bulk", post(bulk_add_invoices))
        .route("/admin/invoices/generate", post(generate_mock_invoices))
        .route(
            "/admin/invoices/{id}",
            put(update_invoice).delete(delete_invoice),
        )
}

#[derive(Debug, Deserialize, Validate)]
pub struct BulkAddRequest {
    #[validate(length(min = 1, max = 100), nested)]
    pub invoices: Vec<NewInvoice>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct GenerateRequest {
    #[validate(range(min = 1, max = 100))]
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub inserted: usize,
    pub invoices: Vec<Invoice>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub id: String,
    pub deleted: bool,
}

/// List all invoice records.
async fn list_invoices(
    State(state): State<Arc<AppState>>,
    ValidQuery(query): ValidQuery<ListQuery>,
) -> Result<Json<ApiResponse<InvoicePage>>> {
    let (filter, page) = query.into_parts();
    let invoices = state.db.list_invoices(&filter, page).await?;
    Ok(success(invoices))
}

/// Insert hand-written invoice records.
async fn bulk_add_invoices(
    State(state): State<Arc<AppState>>,
    ValidJson(request): ValidJson<BulkAddRequest>,
) -> Result<Json<ApiResponse<BatchResponse>>> {
    let now = chrono::Utc::now();
    let invoices: Vec<Invoice> = request
        .invoices
        .into_iter()
        .map(|invoice| invoice.into_invoice(now))
        .collect();

    insert_batch(&state, invoices).await
}

/// Insert randomly generated invoice records.
async fn generate_mock_invoices(
    State(state): State<Arc<AppState>>,
    ValidJson(request): ValidJson<GenerateRequest>,
) -> Result<Json<ApiResponse<BatchResponse>>> {
    let invoices = generate_invoices(request.count, &mut rand::thread_rng());
    insert_batch(&state, invoices).await
}

async fn insert_batch(
    state: &AppState,
    invoices: Vec<Invoice>,
) -> Result<Json<ApiResponse<BatchResponse>>> {
    let invoices = state.db.insert_invoices(invoices).await?;
    tracing::info!(count = invoices.len(), "Added invoice records");

    Ok(success(BatchResponse {
        inserted: invoices.len(),
        invoices,
    }))
}

/// Partially update an invoice record.
async fn update_invoice(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ValidJson(patch): ValidJson<InvoicePatch>,
) -> Result<Json<ApiResponse<Invoice>>> {
    if patch.is_empty() {
        return Err(AppError::BadRequest("no fields to update".to_string()));
    }

    let invoice = state.db.update_invoice(&id, &patch).await?;
    tracing::info!(invoice_id = %id, "Updated invoice record");
    Ok(success(invoice))
}

async fn delete_invoice(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DeleteResponse>>> {
    state.db.delete_invoice(&id).await?;
    tracing::info!(invoice_id = %id, "Deleted invoice record");
    Ok(success(DeleteResponse { id, deleted: true }))
}
