// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Stateless OAuth2 authorization codes for the mock consent flow.
//!
//! Format (before base64url): `open_id|issued_ms_hex|signature_hex`, where the
//! signature is HMAC-SHA256 over `open_id|issued_ms_hex`.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Authorization codes are accepted for 10 minutes.
pub const AUTH_CODE_TTL_MS: u64 = 10 * 60 * 1000;

/// Prefix of every open_id minted by this mock.
pub const OPEN_ID_PREFIX: &str = "ou_";

/// Sign an authorization code that resolves to `open_id`.
pub fn sign_auth_code(open_id: &str, issued_ms: u64, secret: &[u8]) -> anyhow::Result<String> {
    anyhow::ensure!(!open_id.contains('|'), "open_id must not contain '|'");

    let payload = format!("{}|{:x}", open_id, issued_ms);
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| anyhow::anyhow!("HMAC init failed: {}", e))?;
    mac.update(payload.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());

    Ok(URL_SAFE_NO_PAD.encode(format!("{}|{}", payload, signature)))
}

/// Verify a signed authorization code and return its open_id.
///
/// Returns `None` for codes that were not minted by [`sign_auth_code`] with
/// the same secret, or that are older than [`AUTH_CODE_TTL_MS`].
pub fn verify_auth_code(code: &str, secret: &[u8], now_ms: u64) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(code).ok()?;
    let decoded = String::from_utf8(bytes).ok()?;

    let (payload, signature_hex) = decoded.rsplit_once('|')?;
    let (open_id, issued_hex) = payload.rsplit_once('|')?;
    if open_id.is_empty() {
        return None;
    }

    let signature = hex::decode(signature_hex).ok()?;
    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(payload.as_bytes());
    if mac.verify_slice(&signature).is_err() {
        tracing::warn!("Authorization code signature mismatch");
        return None;
    }

    let issued_ms = u64::from_str_radix(issued_hex, 16).ok()?;
    if issued_ms > now_ms || now_ms - issued_ms > AUTH_CODE_TTL_MS {
        tracing::debug!(issued_ms, now_ms, "Authorization code outside validity window");
        return None;
    }

    Some(open_id.to_string())
}

/// Deterministic open_id for an arbitrary (unsigned) authorization code.
///
/// Integrators frequently hard-code a test code; the same `app_id` and code
/// always map to the same merchant.
pub fn derive_open_id(app_id: &str, code: &str) -> String {
    let digest = Sha256::digest(format!("{}:{}", app_id, code).as_bytes());
    let mut open_id = hex::encode(digest);
    open_id.truncate(32);
    format!("{}{}", OPEN_ID_PREFIX, open_id)
}

/// Random open_id for consent requests that don't name one.
pub fn random_open_id() -> String {
    format!("{}{}", OPEN_ID_PREFIX, uuid::Uuid::new_v4().simple())
}
