// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Merchant API routes (require an access token).

use crate::error::{AppError, Result};
use crate::middleware::AuthContext;
use crate::models::{
    Invoice, InvoiceFilter, InvoicePage, InvoiceStatus, MerchantInfo, PageRequest, ReviewDecision,
};
use crate::routes::extract::{ValidJson, ValidQuery};
use crate::routes::{success, ApiResponse};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

/// API routes (require authentication via access token).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/merchant/info", get(get_merchant_info))
        .route("/api/invoices", get(list_invoices))
        .route("/api/invoices/{id}/review", post(review_invoice))
}

// ─── Merchant ────────────────────────────────────────────────

/// Get the authenticated merchant's profile.
async fn get_merchant_info(
    Extension(auth): Extension<AuthContext>,
) -> Json<ApiResponse<MerchantInfo>> {
    success(MerchantInfo::derive(
        &auth.open_id,
        &auth.scope,
        auth.expires_at,
    ))
}

// ─── Invoices ────────────────────────────────────────────────

/// Invoice listing query, shared with the admin listing.
#[derive(Debug, Deserialize, Validate)]
pub struct ListQuery {
    pub status: Option<InvoiceStatus>,
    #[validate(length(min = 1, max = 64))]
    pub order_id: Option<String>,
    /// Pagination: page number (1-indexed)
    #[serde(default = "default_page")]
    #[validate(range(min = 1))]
    pub page: u32,
    /// Pagination: items per page
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 100))]
    pub page_size: u32,
}

fn default_page() -> u32 {
    1
}
fn default_page_size() -> u32 {
    20
}

impl ListQuery {
    pub fn into_parts(self) -> (InvoiceFilter, PageRequest) {
        (
            InvoiceFilter {
                status: self.status,
                order_id: self.order_id,
            },
            PageRequest {
                page: self.page,
                page_size: self.page_size,
            },
        )
    }
}

/// List invoice requests.
async fn list_invoices(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    ValidQuery(query): ValidQuery<ListQuery>,
) -> Result<Json<ApiResponse<InvoicePage>>> {
    tracing::debug!(
        open_id = %auth.open_id,
        status = ?query.status,
        page = query.page,
        "Listing invoices"
    );

    let (filter, page) = query.into_parts();
    let invoices = state.db.list_invoices(&filter, page).await?;
    Ok(success(invoices))
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    Approve,
    Reject,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReviewRequest {
    pub action: ReviewAction,
    #[validate(length(min = 1, max = 500))]
    pub reason: Option<String>,
}

impl ReviewRequest {
    fn into_decision(self) -> Result<ReviewDecision> {
        match (self.action, self.reason) {
            (ReviewAction::Approve, _) => Ok(ReviewDecision::approve()),
            (ReviewAction::Reject, Some(reason)) => Ok(ReviewDecision::reject(reason)),
            (ReviewAction::Reject, None) => Err(AppError::BadRequest(
                "reason is required when rejecting an invoice".to_string(),
            )),
        }
    }
}

/// Approve or reject an invoice request.
async fn review_invoice(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    ValidJson(request): ValidJson<ReviewRequest>,
) -> Result<Json<ApiResponse<Invoice>>> {
    let decision = request.into_decision()?;
    let invoice = state.db.review_invoice(&id, &decision).await?;

    tracing::info!(
        open_id = %auth.open_id,
        invoice_id = %id,
        status = %invoice.status,
        "Invoice reviewed"
    );

    Ok(success(invoice))
}
