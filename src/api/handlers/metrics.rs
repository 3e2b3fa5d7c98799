// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::api::AppState;
use crate::collector::exposition_body;

/// GET /metrics
///
/// Runs one poll cycle and returns every successful host's lines. Failed
/// hosts are left out; the response is `200 OK` even when all of them fail.
/// Only a fleet-level failure yields `500`.
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    tracing::debug!("/metrics starting poll cycle");
    match state.collector.collect().await {
        Ok(results) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            exposition_body(&results),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Poll cycle failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Poll cycle failed: {e}"),
            )
                .into_response()
        }
    }
}
