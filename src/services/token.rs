// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Stateless OAuth2 token codec.
//!
//! Access and refresh tokens are HS256 JWTs wrapped by [`encode_opaque`].
//! Validity is a pure function of the signed payload and the current time:
//! nothing is stored server side and there is no revocation list.

use crate::services::opaque::{decode_opaque, encode_opaque};
use crate::time_utils::unix_now;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Default access token lifetime (365 days).
pub const DEFAULT_ACCESS_TTL_SECS: u64 = 365 * 24 * 60 * 60;
/// Default refresh token lifetime (730 days).
pub const DEFAULT_REFRESH_TTL_SECS: u64 = 2 * DEFAULT_ACCESS_TTL_SECS;

/// Signing secret and lifetimes, supplied at startup.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// HMAC signing secret (raw bytes)
    pub secret: Vec<u8>,
    pub access_ttl_secs: u64,
    pub refresh_ttl_secs: u64,
    /// Scope attached to access tokens re-issued from a refresh token
    pub default_scope: Vec<String>,
}

/// Token kind tag carried in the signed payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
struct Claims {
    /// Subject (merchant open_id)
    sub: String,
    /// Capability tags; access tokens only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scope: Option<Vec<String>>,
    kind: TokenKind,
    /// Issued at (Unix timestamp)
    iat: u64,
    /// Expiration time (Unix timestamp)
    exp: u64,
}

/// Why a presented token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidReason {
    #[error("token expired")]
    Expired,

    #[error("malformed token")]
    Malformed,

    #[error("wrong token kind")]
    WrongKind,
}

/// Failure to issue a token pair.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid refresh token: {0}")]
    Invalid(#[from] InvalidReason),

    #[error("token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// A verified access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGrant {
    pub subject_id: String,
    pub scope: Vec<String>,
    pub issued_at: u64,
    pub expires_at: u64,
}

/// A verified refresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshGrant {
    pub subject_id: String,
    pub issued_at: u64,
    pub expires_at: u64,
}

/// Token pair in the platform's OAuth2 response shape.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub access_token_expires_in: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub refresh_token_expires_in: u64,
}

/// Issues and validates opaque bearer tokens.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl_secs: u64,
    refresh_ttl_secs: u64,
    default_scope: Vec<String>,
}

impl TokenCodec {
    pub fn new(config: &TokenConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the caller's clock in `open`.
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(&config.secret),
            decoding_key: DecodingKey::from_secret(&config.secret),
            validation,
            access_ttl_secs: config.access_ttl_secs,
            refresh_ttl_secs: config.refresh_ttl_secs,
            default_scope: config.default_scope.clone(),
        }
    }

    /// Issue an access/refresh pair for `subject_id`.
    pub fn issue(&self, subject_id: &str, scope: &[String]) -> Result<IssuedTokens, TokenError> {
        self.issue_at(subject_id, scope, unix_now())
    }

    /// Issue a token pair as if the current time were `now`.
    pub fn issue_at(
        &self,
        subject_id: &str,
        scope: &[String],
        now: u64,
    ) -> Result<IssuedTokens, TokenError> {
        let access = Claims {
            sub: subject_id.to_string(),
            scope: Some(scope.to_vec()),
            kind: TokenKind::Access,
            iat: now,
            exp: now.saturating_add(self.access_ttl_secs),
        };
        let refresh = Claims {
            sub: subject_id.to_string(),
            scope: None,
            kind: TokenKind::Refresh,
            iat: now,
            exp: now.saturating_add(self.refresh_ttl_secs),
        };

        Ok(IssuedTokens {
            access_token: self.sign(&access)?,
            refresh_token: self.sign(&refresh)?,
            access_token_expires_in: self.access_ttl_secs,
            refresh_token_expires_in: self.refresh_ttl_secs,
        })
    }

    pub fn validate_access(&self, token: &str) -> Result<AccessGrant, InvalidReason> {
        self.validate_access_at(token, unix_now())
    }

    pub fn validate_access_at(&self, token: &str, now: u64) -> Result<AccessGrant, InvalidReason> {
        let claims = self.open(token, TokenKind::Access, now)?;
        let scope = claims.scope.ok_or(InvalidReason::Malformed)?;

        Ok(AccessGrant {
            subject_id: claims.sub,
            scope,
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }

    pub fn validate_refresh(&self, token: &str) -> Result<RefreshGrant, InvalidReason> {
        self.validate_refresh_at(token, unix_now())
    }

    pub fn validate_refresh_at(
        &self,
        token: &str,
        now: u64,
    ) -> Result<RefreshGrant, InvalidReason> {
        let claims = self.open(token, TokenKind::Refresh, now)?;

        Ok(RefreshGrant {
            subject_id: claims.sub,
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }

    /// Issue a fresh pair for the subject of a valid refresh token.
    ///
    /// The new access token carries the configured default scope.
    pub fn reissue_from_refresh(&self, token: &str) -> Result<IssuedTokens, TokenError> {
        self.reissue_from_refresh_at(token, unix_now())
    }

    pub fn reissue_from_refresh_at(&self, token: &str, now: u64) -> Result<IssuedTokens, TokenError> {
        let grant = self.validate_refresh_at(token, now)?;
        self.issue_at(&grant.subject_id, &self.default_scope, now)
    }

    fn sign(&self, claims: &Claims) -> Result<String, jsonwebtoken::errors::Error> {
        let jwt = encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)?;
        Ok(encode_opaque(&jwt))
    }

    /// Decode, verify and check kind, then expiry, in that order.
    fn open(&self, token: &str, expected: TokenKind, now: u64) -> Result<Claims, InvalidReason> {
        let jwt = decode_opaque(token).ok_or(InvalidReason::Malformed)?;
        let claims = decode::<Claims>(&jwt, &self.decoding_key, &self.validation)
            .map_err(|_| InvalidReason::Malformed)?
            .claims;

        if claims.kind != expected {
            return Err(InvalidReason::WrongKind);
        }
        if now >= claims.exp {
            return Err(InvalidReason::Expired);
        }
        Ok(claims)
    }
}
