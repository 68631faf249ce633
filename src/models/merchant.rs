//! Merchant info model.
//!
//! The mock has no merchant table: everything is derived from the open_id
//! carried by the access token, so a given token always sees the same shop.

use crate::time_utils::format_unix_rfc3339;
use serde::Serialize;
use sha2::{Digest, Sha256};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Merchant profile returned by `/api/merchant/info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MerchantInfo {
    pub open_id: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub shop_id: u64,
    pub shop_name: String,
    pub scope: Vec<String>,
    pub access_token_expires_at: Option<String>,
}

impl MerchantInfo {
    pub fn derive(open_id: &str, scope: &[String], expires_at: u64) -> Self {
        let digest = Sha256::digest(open_id.as_bytes());
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        // Keep shop ids in the 10-digit range the platform uses.
        let shop_id = 1_000_000_000 + u64::from_be_bytes(head) % 9_000_000_000;

        Self {
            open_id: open_id.to_string(),
            shop_id,
            shop_name: format!("Mock Shop {}", shop_id % 100_000),
            scope: scope.to_vec(),
            access_token_expires_at: format_unix_rfc3339(expires_at),
        }
    }
}
