// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Invoice model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::{Validate, ValidationError};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Review state of an invoice request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Pending,
    Approved,
    Rejected,
}

impl InvoiceStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown invoice status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for InvoiceStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// An invoice request raised against a merchant order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Invoice {
    pub id: String,
    pub order_id: String,
    /// Invoice header (buyer name or company)
    pub title: String,
    /// Buyer tax registration number, for company invoices
    pub tax_number: Option<String>,
    /// Amount in minor currency units
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub amount: i64,
    pub status: InvoiceStatus,
    pub reject_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Generate a new invoice id.
pub fn new_invoice_id() -> String {
    format!("inv_{}", uuid::Uuid::new_v4().simple())
}

/// Invoice as submitted through the admin API.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_new_invoice_reason"))]
pub struct NewInvoice {
    #[validate(length(min = 1, max = 64))]
    pub id: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub order_id: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 15, max = 20))]
    pub tax_number: Option<String>,
    #[validate(range(min = 1))]
    pub amount: i64,
    #[serde(default)]
    pub status: Option<InvoiceStatus>,
    #[validate(length(max = 500))]
    pub reject_reason: Option<String>,
}

impl NewInvoice {
    pub fn into_invoice(self, now: DateTime<Utc>) -> Invoice {
        let status = self.status.unwrap_or(InvoiceStatus::Pending);
        Invoice {
            id: self.id.unwrap_or_else(new_invoice_id),
            order_id: self.order_id,
            title: self.title,
            tax_number: self.tax_number,
            amount: self.amount,
            status,
            reject_reason: self.reject_reason.filter(|_| status == InvoiceStatus::Rejected),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A rejected invoice always carries a reason.
fn require_reject_reason(
    status: Option<InvoiceStatus>,
    reason: Option<&str>,
) -> Result<(), ValidationError> {
    if status == Some(InvoiceStatus::Rejected) && reason.map_or(true, |r| r.trim().is_empty()) {
        let mut err = ValidationError::new("reject_reason_required");
        err.message = Some("reject_reason is required when status is rejected".into());
        return Err(err);
    }
    Ok(())
}

fn validate_new_invoice_reason(invoice: &NewInvoice) -> Result<(), ValidationError> {
    require_reject_reason(invoice.status, invoice.reject_reason.as_deref())
}

fn validate_patch_reason(patch: &InvoicePatch) -> Result<(), ValidationError> {
    require_reject_reason(patch.status, patch.reject_reason.as_deref())
}

/// Outcome of a merchant review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewDecision {
    pub status: InvoiceStatus,
    pub reject_reason: Option<String>,
}

impl ReviewDecision {
    pub fn approve() -> Self {
        Self {
            status: InvoiceStatus::Approved,
            reject_reason: None,
        }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            status: InvoiceStatus::Rejected,
            reject_reason: Some(reason.into()),
        }
    }
}

/// Partial update from the admin API. Absent fields are left unchanged.
///
/// Moving an invoice out of `rejected` clears its reason.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[validate(schema(function = "validate_patch_reason"))]
pub struct InvoicePatch {
    #[validate(length(min = 1, max = 64))]
    pub order_id: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 15, max = 20))]
    pub tax_number: Option<String>,
    #[validate(range(min = 1))]
    pub amount: Option<i64>,
    pub status: Option<InvoiceStatus>,
    #[validate(length(max = 500))]
    pub reject_reason: Option<String>,
}

impl InvoicePatch {
    pub fn is_empty(&self) -> bool {
        self.order_id.is_none()
            && self.title.is_none()
            && self.tax_number.is_none()
            && self.amount.is_none()
            && self.status.is_none()
            && self.reject_reason.is_none()
    }

    pub fn apply(&self, invoice: &mut Invoice, now: DateTime<Utc>) {
        if let Some(order_id) = &self.order_id {
            invoice.order_id = order_id.clone();
        }
        if let Some(title) = &self.title {
            invoice.title = title.clone();
        }
        if let Some(tax_number) = &self.tax_number {
            invoice.tax_number = Some(tax_number.clone());
        }
        if let Some(amount) = self.amount {
            invoice.amount = amount;
        }
        if let Some(status) = self.status {
            invoice.status = status;
        }
        if invoice.status != InvoiceStatus::Rejected {
            invoice.reject_reason = None;
        } else if let Some(reason) = &self.reject_reason {
            invoice.reject_reason = Some(reason.clone());
        }
        invoice.updated_at = now;
    }
}

/// Listing filter. `None` fields match everything.
#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    pub status: Option<InvoiceStatus>,
    pub order_id: Option<String>,
}

impl InvoiceFilter {
    pub fn matches(&self, invoice: &Invoice) -> bool {
        self.status.map_or(true, |s| invoice.status == s)
            && self
                .order_id
                .as_deref()
                .map_or(true, |o| invoice.order_id == o)
    }
}

/// One-indexed page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 20,
        }
    }
}

impl PageRequest {
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }
}

/// One page of invoices.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct InvoicePage {
    pub invoices: Vec<Invoice>,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(now: DateTime<Utc>) -> Invoice {
        NewInvoice {
            id: Some("inv_1".to_string()),
            order_id: "order-1".to_string(),
            title: "Acme Ltd".to_string(),
            tax_number: None,
            amount: 1999,
            status: None,
            reject_reason: None,
        }
        .into_invoice(now)
    }

    #[test]
    fn test_new_invoice_defaults_to_pending() {
        let invoice = sample(Utc::now());
        assert_eq!(invoice.status, InvoiceStatus::Pending);
        assert_eq!(invoice.created_at, invoice.updated_at);
    }

    #[test]
    fn test_patch_only_touches_present_fields() {
        let created = Utc::now();
        let mut invoice = sample(created);
        let patch = InvoicePatch {
            amount: Some(5000),
            ..Default::default()
        };

        let later = created + chrono::Duration::seconds(5);
        patch.apply(&mut invoice, later);

        assert_eq!(invoice.amount, 5000);
        assert_eq!(invoice.title, "Acme Ltd");
        assert_eq!(invoice.updated_at, later);
        assert!(!patch.is_empty());
        assert!(InvoicePatch::default().is_empty());
    }

    #[test]
    fn test_patch_out_of_rejected_clears_reason() {
        let now = Utc::now();
        let mut invoice = sample(now);
        invoice.status = InvoiceStatus::Rejected;
        invoice.reject_reason = Some("Wrong title".to_string());

        let patch = InvoicePatch {
            status: Some(InvoiceStatus::Approved),
            ..Default::default()
        };
        patch.apply(&mut invoice, now);
        assert_eq!(invoice.status, InvoiceStatus::Approved);
        assert_eq!(invoice.reject_reason, None);

        // A reason alone does not stick to a non-rejected invoice.
        let patch = InvoicePatch {
            reject_reason: Some("late".to_string()),
            ..Default::default()
        };
        patch.apply(&mut invoice, now);
        assert_eq!(invoice.reject_reason, None);
    }

    #[test]
    fn test_rejected_requires_reason() {
        let mut new = NewInvoice {
            id: None,
            order_id: "order-1".to_string(),
            title: "Acme".to_string(),
            tax_number: None,
            amount: 100,
            status: Some(InvoiceStatus::Rejected),
            reject_reason: None,
        };
        assert!(new.validate().is_err());
        new.reject_reason = Some("Duplicate order".to_string());
        assert!(new.validate().is_ok());

        let patch = InvoicePatch {
            status: Some(InvoiceStatus::Rejected),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn test_filter_matches() {
        let invoice = sample(Utc::now());
        assert!(InvoiceFilter::default().matches(&invoice));
        assert!(InvoiceFilter {
            status: Some(InvoiceStatus::Pending),
            order_id: Some("order-1".to_string()),
        }
        .matches(&invoice));
        assert!(!InvoiceFilter {
            status: Some(InvoiceStatus::Approved),
            order_id: None,
        }
        .matches(&invoice));
    }

    #[test]
    fn test_page_offset() {
        assert_eq!(PageRequest { page: 1, page_size: 20 }.offset(), 0);
        assert_eq!(PageRequest { page: 3, page_size: 20 }.offset(), 40);
    }

    #[test]
    fn test_new_invoice_validation() {
        let mut new = NewInvoice {
            id: None,
            order_id: String::new(),
            title: "Acme".to_string(),
            tax_number: Some("123".to_string()),
            amount: 0,
            status: None,
            reject_reason: None,
        };
        let errors = new.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("order_id"));
        assert!(fields.contains_key("tax_number"));
        assert!(fields.contains_key("amount"));

        new.order_id = "order-1".to_string();
        new.tax_number = Some("91310000MA1FL0000X".to_string());
        new.amount = 1;
        assert!(new.validate().is_ok());
    }
}
