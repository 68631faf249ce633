//! Random invoice records for populating the mock.

use crate::models::invoice::new_invoice_id;
use crate::models::{Invoice, InvoiceStatus};
use chrono::{Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

const TITLES: &[&str] = &[
    "Shanghai Lanting Trading Co., Ltd.",
    "Hangzhou Xiyue Technology Co., Ltd.",
    "Shenzhen Hailan Electronics Co., Ltd.",
    "Beijing Chenguang Culture Media Co., Ltd.",
    "Chengdu Jinsha Food Co., Ltd.",
    "Personal",
];

const REJECT_REASONS: &[&str] = &[
    "Tax number does not match the invoice title",
    "Order has been refunded",
    "Duplicate invoice request",
];

/// Generate `count` plausible invoices, spread over the last 30 days.
pub fn generate_invoices<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Invoice> {
    (0..count).map(|_| generate_invoice(rng)).collect()
}

fn generate_invoice<R: Rng + ?Sized>(rng: &mut R) -> Invoice {
    let title = TITLES.choose(rng).copied().unwrap_or("Personal");
    let tax_number = (title != "Personal").then(|| random_tax_number(rng));

    let status = match rng.gen_range(0..10) {
        0..=5 => InvoiceStatus::Pending,
        6..=8 => InvoiceStatus::Approved,
        _ => InvoiceStatus::Rejected,
    };
    let reject_reason = (status == InvoiceStatus::Rejected)
        .then(|| REJECT_REASONS.choose(rng).copied().unwrap_or("Rejected"))
        .map(str::to_string);

    let created_at = Utc::now() - Duration::minutes(rng.gen_range(0..30 * 24 * 60));

    Invoice {
        id: new_invoice_id(),
        // 19-digit order number
        order_id: rng.gen_range(10u64.pow(18)..10u64.pow(19)).to_string(),
        title: title.to_string(),
        tax_number,
        // 1.00 to 5000.00
        amount: rng.gen_range(100..=500_000),
        status,
        reject_reason,
        created_at,
        updated_at: created_at,
    }
}

/// 18-character unified social credit code lookalike.
fn random_tax_number<R: Rng + ?Sized>(rng: &mut R) -> String {
    const ALPHABET: &[u8] = b"0123456789ABCDEFGHJKLMNPQRTUWXY";
    (0..18)
        .map(|_| char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())]))
        .collect()
}
