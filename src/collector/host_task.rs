// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Per-host collection task

use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};

use crate::config::Host;
use crate::facts::{DeviceFacts, FactClient, Getter};
use crate::render::render_device;
use crate::telemetry::ExporterMetrics;

use super::{HostError, HostResult};

/// Fetches and renders one host, always resolving to a `HostResult`
pub(super) async fn run(
    client: &dyn FactClient,
    host: &Host,
    timeout: Duration,
    telemetry: &ExporterMetrics,
) -> HostResult {
    tracing::trace!("Starting collection for host: {}", host.name);
    let start = Instant::now();

    let outcome = match AssertUnwindSafe(fetch_and_render(client, host, timeout))
        .catch_unwind()
        .await
    {
        Ok(outcome) => outcome,
        Err(payload) => Err(HostError::Panicked(panic_message(payload.as_ref()))),
    };

    let elapsed = start.elapsed();
    match &outcome {
        Ok(block) => {
            telemetry.record_host_success(&host.name, elapsed);
            tracing::debug!(
                "Collected host {} in {:.3}s ({} bytes)",
                host.name,
                elapsed.as_secs_f64(),
                block.len()
            );
        }
        Err(e) => {
            telemetry.record_host_failure(&host.name, e.kind(), elapsed);
            tracing::warn!(
                "Failed to collect host {} in {:.3}s: {}",
                host.name,
                elapsed.as_secs_f64(),
                e
            );
            tracing::trace!("Error details for {}: {:?}", host.name, e);
        }
    }

    HostResult {
        host: host.name.clone(),
        outcome,
    }
}

async fn fetch_and_render(
    client: &dyn FactClient,
    host: &Host,
    timeout: Duration,
) -> Result<String, HostError> {
    let raw = tokio::time::timeout(timeout, client.fetch_facts(host, &Getter::POLLED))
        .await
        .map_err(|_| HostError::Timeout(timeout))??;
    let facts = DeviceFacts::try_from(raw)?;
    Ok(render_device(&host.name, &facts))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
