// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, Response};
use merchant_api_mock::config::Config;
use merchant_api_mock::db::InvoiceDb;
use merchant_api_mock::routes::create_router;
use merchant_api_mock::AppState;
use serde_json::Value;
use std::sync::Arc;

/// Create a test app backed by the in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_app_with(Config::default(), InvoiceDb::new_memory())
}

/// Create a test app whose store fails every call with a connection error.
#[allow(dead_code)]
pub fn create_offline_app() -> (axum::Router, Arc<AppState>) {
    create_app_with(Config::default(), InvoiceDb::new_mock())
}

#[allow(dead_code)]
pub fn create_app_with(config: Config, db: InvoiceDb) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(config, db));
    (create_router(state.clone()), state)
}

/// Issue a valid access token for `open_id`.
#[allow(dead_code)]
pub fn access_token(state: &AppState, open_id: &str) -> String {
    state
        .tokens
        .issue(open_id, &["all".to_string()])
        .expect("Failed to issue token")
        .access_token
}

/// Build a request with an optional bearer token and JSON body.
#[allow(dead_code)]
pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
