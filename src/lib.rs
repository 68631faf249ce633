// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Merchant API mock: a stand-in for a third-party e-commerce platform.
//!
//! This crate provides the backend for the mock merchant API (OAuth2 token
//! issuance, invoice listing and review, merchant info) plus the JSON admin
//! endpoints used to manage mock invoice records.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::InvoiceDb;
use services::TokenCodec;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: InvoiceDb,
    pub tokens: TokenCodec,
}

impl AppState {
    /// Build state from a loaded config and a connected store.
    pub fn new(config: Config, db: InvoiceDb) -> Self {
        let tokens = TokenCodec::new(&config.token);
        Self { config, db, tokens }
    }
}
