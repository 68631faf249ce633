// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod invoice;
pub mod merchant;

pub use invoice::{
    Invoice, InvoiceFilter, InvoicePage, InvoicePatch, InvoiceStatus, NewInvoice, PageRequest,
    ReviewDecision,
};
pub use merchant::MerchantInfo;
