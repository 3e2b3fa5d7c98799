// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! HTTP API module
//!
//! # Endpoints
//! - `GET /metrics`: one poll cycle over the whole fleet, rendered as text
//! - `GET /health`: health check
//! - `GET /exporter/metrics`: exporter self-telemetry (OpenMetrics)

pub mod handlers;
mod state;

use axum::{Router, routing::get};
use std::sync::Arc;

pub use state::AppState;

/// Creates the main Axum router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .route("/health", get(handlers::health_check))
        .route("/exporter/metrics", get(handlers::exporter_metrics_handler))
        .with_state(state)
}
