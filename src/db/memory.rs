// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process invoice store backed by a concurrent map.

use crate::db::{DatabaseError, DatabaseFailureKind};
use crate::models::{Invoice, InvoiceFilter, InvoicePage, InvoicePatch, PageRequest, ReviewDecision};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

/// Invoice store kept in memory, shared across clones.
#[derive(Clone, Default)]
pub struct MemoryStore {
    invoices: Arc<DashMap<String, Invoice>>,
}

impl MemoryStore {
    pub fn list_invoices(&self, filter: &InvoiceFilter, page: PageRequest) -> InvoicePage {
        let mut matching: Vec<Invoice> = self
            .invoices
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();

        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        let total = matching.len() as u64;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let invoices = matching
            .into_iter()
            .skip(offset)
            .take(page.page_size as usize)
            .collect();

        InvoicePage {
            invoices,
            total,
            page: page.page,
            page_size: page.page_size,
        }
    }

    pub fn review_invoice(
        &self,
        id: &str,
        decision: &ReviewDecision,
    ) -> Result<Invoice, DatabaseError> {
        let mut invoice = self
            .invoices
            .get_mut(id)
            .ok_or_else(|| DatabaseError::not_found(id))?;

        invoice.status = decision.status;
        invoice.reject_reason = decision.reject_reason.clone();
        invoice.updated_at = chrono::Utc::now();
        Ok(invoice.clone())
    }

    pub fn insert_invoices(&self, invoices: Vec<Invoice>) -> Result<Vec<Invoice>, DatabaseError> {
        let mut inserted: Vec<String> = Vec::with_capacity(invoices.len());

        for invoice in &invoices {
            // The entry guard holds a shard lock; release it before any rollback.
            let duplicate = match self.invoices.entry(invoice.id.clone()) {
                Entry::Occupied(_) => true,
                Entry::Vacant(slot) => {
                    slot.insert(invoice.clone());
                    false
                }
            };

            if duplicate {
                // Undo the partial batch, mirroring a rolled-back transaction.
                for id in &inserted {
                    self.invoices.remove(id);
                }
                return Err(DatabaseError::tagged(
                    DatabaseFailureKind::Query,
                    format!(
                        "duplicate key value violates unique constraint: id {}",
                        invoice.id
                    ),
                ));
            }
            inserted.push(invoice.id.clone());
        }

        Ok(invoices)
    }

    pub fn update_invoice(&self, id: &str, patch: &InvoicePatch) -> Result<Invoice, DatabaseError> {
        let mut invoice = self
            .invoices
            .get_mut(id)
            .ok_or_else(|| DatabaseError::not_found(id))?;

        patch.apply(&mut invoice, chrono::Utc::now());
        Ok(invoice.clone())
    }

    pub fn delete_invoice(&self, id: &str) -> Result<(), DatabaseError> {
        self.invoices
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DatabaseError::not_found(id))
    }

    pub fn len(&self) -> usize {
        self.invoices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.invoices.is_empty()
    }
}
