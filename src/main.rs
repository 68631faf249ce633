// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Merchant API mock server
//!
//! Serves the mock OAuth2, invoice and merchant endpoints plus the admin API
//! used to manage mock invoice records.

use merchant_api_mock::{config::Config, db::InvoiceDb, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        profile = %config.profile,
        "Starting merchant API mock"
    );

    let db = match &config.database {
        Some(database) => InvoiceDb::connect(database).await?,
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory invoice store");
            InvoiceDb::new_memory()
        }
    };
    tracing::info!(store = db.backend_name(), "Invoice store ready");

    if config.admin_api_key.is_none() {
        tracing::warn!("ADMIN_API_KEY not set; admin routes are unauthenticated");
    }

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), db));

    // Build router
    let app = merchant_api_mock::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("merchant_api_mock=debug,info")),
        )
        .with(format)
        .init();
}
