// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - token handling, error classification and mock data.

pub mod auth_code;
pub mod classifier;
pub mod mock_data;
pub mod opaque;
pub mod token;

pub use classifier::{classify, ClassifiedError};
pub use opaque::{decode_opaque, encode_opaque};
pub use token::{
    AccessGrant, InvalidReason, IssuedTokens, RefreshGrant, TokenCodec, TokenConfig, TokenError,
};
