// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Opaque token encoding.
//!
//! The mocked platform hands out tokens that look like random strings. Our
//! tokens are signed JWTs underneath, so the compact JWT form is wrapped in
//! URL-safe base64 to hide its `header.payload.signature` shape. This is
//! purely cosmetic; all security comes from the signature.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

/// Wrap a compact JWT as an opaque bearer string.
pub fn encode_opaque(jwt: &str) -> String {
    URL_SAFE_NO_PAD.encode(jwt.as_bytes())
}

/// Recover the compact JWT from an opaque bearer string.
///
/// Returns `None` when the input is not valid unpadded URL-safe base64 or
/// does not decode to UTF-8.
pub fn decode_opaque(token: &str) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(token.trim()).ok()?;
    String::from_utf8(bytes).ok()
}
