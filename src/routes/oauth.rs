// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Mock OAuth2 routes: consent redirect, code exchange and token refresh.

use axum::{
    extract::State,
    http::HeaderValue,
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use subtle::ConstantTimeEq;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::routes::extract::{ValidJson, ValidQuery};
use crate::routes::{success, ApiResponse};
use crate::services::auth_code::{
    derive_open_id, random_open_id, sign_auth_code, verify_auth_code,
};
use crate::services::IssuedTokens;
use crate::time_utils::unix_now_millis;
use crate::AppState;

const GRANT_AUTHORIZATION_CODE: &str = "authorization_code";
const GRANT_REFRESH_TOKEN: &str = "refresh_token";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/oauth2/authorize", get(authorize))
        .route("/oauth2/access_token", post(access_token))
        .route("/oauth2/refresh_token", post(refresh_token))
}

/// Query parameters for the consent step.
#[derive(Deserialize, Validate)]
pub struct AuthorizeParams {
    #[validate(length(min = 1, max = 64))]
    app_id: String,
    #[validate(url)]
    redirect_uri: String,
    #[serde(default)]
    #[validate(length(max = 256))]
    state: Option<String>,
    /// Merchant to authorize as; a random one is minted when absent.
    #[serde(default)]
    #[validate(length(min = 1, max = 64))]
    open_id: Option<String>,
}

/// Body of `POST /oauth2/access_token`.
#[derive(Deserialize, Validate)]
pub struct AccessTokenRequest {
    #[validate(length(min = 1, max = 64))]
    app_id: String,
    #[validate(length(min = 1, max = 128))]
    app_secret: String,
    grant_type: String,
    #[validate(length(min = 1, max = 512))]
    code: String,
    #[serde(default)]
    #[validate(length(max = 32))]
    scope: Option<Vec<String>>,
}

/// Body of `POST /oauth2/refresh_token`.
#[derive(Deserialize, Validate)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, max = 64))]
    app_id: String,
    grant_type: String,
    #[validate(length(min = 1))]
    refresh_token: String,
}

/// Token data returned by both token endpoints.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TokenResponse {
    #[serde(flatten)]
    pub tokens: IssuedTokens,
    pub open_id: String,
    pub scope: Vec<String>,
}

/// Consent step: redirect straight back with a signed authorization code.
async fn authorize(
    State(state): State<Arc<AppState>>,
    ValidQuery(params): ValidQuery<AuthorizeParams>,
) -> Result<Redirect> {
    check_app_id(&state, &params.app_id)?;

    let open_id = match params.open_id {
        Some(open_id) if open_id.contains('|') => {
            return Err(AppError::BadRequest(
                "open_id must not contain '|'".to_string(),
            ));
        }
        Some(open_id) => open_id,
        None => random_open_id(),
    };

    let code = sign_auth_code(&open_id, unix_now_millis(), &state.config.token.secret)?;

    let separator = if params.redirect_uri.contains('?') {
        '&'
    } else {
        '?'
    };
    let mut redirect_url = format!("{}{}code={}", params.redirect_uri, separator, code);
    if let Some(oauth_state) = &params.state {
        redirect_url.push_str("&state=");
        redirect_url.push_str(&urlencoding::encode(oauth_state));
    }

    // URL parsing tolerates control characters that a Location header cannot carry.
    if HeaderValue::try_from(redirect_url.as_str()).is_err() {
        return Err(AppError::BadRequest(
            "redirect_uri contains invalid characters".to_string(),
        ));
    }

    tracing::info!(
        app_id = %params.app_id,
        open_id = %open_id,
        "Issued authorization code"
    );

    Ok(Redirect::temporary(&redirect_url))
}

/// Exchange an authorization code for a token pair.
async fn access_token(
    State(state): State<Arc<AppState>>,
    ValidJson(request): ValidJson<AccessTokenRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>> {
    if request.grant_type != GRANT_AUTHORIZATION_CODE {
        return Err(AppError::BadRequest(format!(
            "grant_type must be '{}'",
            GRANT_AUTHORIZATION_CODE
        )));
    }
    check_app_id(&state, &request.app_id)?;
    let secret_matches: bool = request
        .app_secret
        .as_bytes()
        .ct_eq(state.config.mock_app_secret.as_bytes())
        .into();
    if !secret_matches {
        tracing::warn!(app_id = %request.app_id, "Token request with wrong app_secret");
        return Err(AppError::InvalidClient);
    }

    // Codes from /oauth2/authorize carry their merchant; any other code maps
    // to a stable derived one.
    let open_id = verify_auth_code(
        &request.code,
        &state.config.token.secret,
        unix_now_millis(),
    )
    .unwrap_or_else(|| derive_open_id(&request.app_id, &request.code));

    let scope = match request.scope {
        Some(scope) if scope.iter().any(|s| !s.trim().is_empty()) => scope
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        _ => state.config.token.default_scope.clone(),
    };

    let tokens = state.tokens.issue(&open_id, &scope)?;

    tracing::info!(open_id = %open_id, scope = ?scope, "Issued token pair");

    Ok(success(TokenResponse {
        tokens,
        open_id,
        scope,
    }))
}

/// Exchange a refresh token for a new token pair.
async fn refresh_token(
    State(state): State<Arc<AppState>>,
    ValidJson(request): ValidJson<RefreshTokenRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>> {
    if request.grant_type != GRANT_REFRESH_TOKEN {
        return Err(AppError::BadRequest(format!(
            "grant_type must be '{}'",
            GRANT_REFRESH_TOKEN
        )));
    }
    check_app_id(&state, &request.app_id)?;

    let grant = state.tokens.validate_refresh(&request.refresh_token)?;
    let tokens = state.tokens.reissue_from_refresh(&request.refresh_token)?;

    tracing::info!(open_id = %grant.subject_id, "Refreshed token pair");

    Ok(success(TokenResponse {
        tokens,
        open_id: grant.subject_id,
        scope: state.config.token.default_scope.clone(),
    }))
}

fn check_app_id(state: &AppState, app_id: &str) -> Result<()> {
    if app_id != state.config.mock_app_id {
        tracing::warn!(app_id = %app_id, "Unknown app_id");
        return Err(AppError::InvalidClient);
    }
    Ok(())
}
