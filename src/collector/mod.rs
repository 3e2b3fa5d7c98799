// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Fleet collection
//!
//! One poll cycle fans a collection task out per inventory host, bounded by a
//! worker semaphore, and waits for every host to resolve. Cycles are
//! independent: nothing is carried over from a previous run.

mod host_task;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;

use crate::config::{Config, Inventory};
use crate::error::{AppError, Result};
use crate::facts::{DeviceError, FactClient, RenderError};
use crate::telemetry::ExporterMetrics;

/// Why a host produced no output in a poll cycle
#[derive(Debug, Error)]
pub enum HostError {
    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("no response within {0:?}")]
    Timeout(Duration),

    #[error("poll cycle deadline reached before the host finished")]
    CycleDeadline,

    #[error("collection task panicked: {0}")]
    Panicked(String),
}

impl HostError {
    /// Stable label value for telemetry
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            HostError::Device(e) => e.kind(),
            HostError::Render(_) => "render",
            HostError::Timeout(_) => "timeout",
            HostError::CycleDeadline => "deadline",
            HostError::Panicked(_) => "panic",
        }
    }
}

/// Outcome of one host in one poll cycle
#[derive(Debug)]
pub struct HostResult {
    pub host: String,
    /// Rendered, newline-terminated metric lines
    pub outcome: std::result::Result<String, HostError>,
}

impl HostResult {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    #[must_use]
    pub fn block(&self) -> Option<&str> {
        self.outcome.as_deref().ok()
    }

    #[must_use]
    pub fn error(&self) -> Option<&HostError> {
        self.outcome.as_ref().err()
    }
}

/// Joins successful host blocks with a blank line between hosts
#[must_use]
pub fn exposition_body(results: &[HostResult]) -> String {
    let blocks: Vec<&str> = results.iter().filter_map(HostResult::block).collect();
    let mut body = String::with_capacity(blocks.iter().map(|b| b.len() + 1).sum());
    for (i, block) in blocks.iter().enumerate() {
        if i > 0 {
            body.push('\n');
        }
        body.push_str(block);
    }
    body
}

/// Concurrency and timeout bounds for a poll cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectorSettings {
    pub workers: usize,
    pub host_timeout: Duration,
    pub cycle_deadline: Option<Duration>,
}

impl From<&Config> for CollectorSettings {
    fn from(config: &Config) -> Self {
        Self {
            workers: config.num_workers,
            host_timeout: config.host_timeout,
            cycle_deadline: config.cycle_deadline,
        }
    }
}

/// Runs poll cycles over a fixed inventory
pub struct FleetCollector {
    client: Arc<dyn FactClient>,
    inventory: Arc<Inventory>,
    settings: CollectorSettings,
    telemetry: ExporterMetrics,
}

impl FleetCollector {
    #[must_use]
    pub fn new(
        client: Arc<dyn FactClient>,
        inventory: Arc<Inventory>,
        settings: CollectorSettings,
        telemetry: ExporterMetrics,
    ) -> Self {
        Self {
            client,
            inventory,
            settings,
            telemetry,
        }
    }

    #[must_use]
    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Runs one poll cycle and returns one `HostResult` per inventory host
    ///
    /// Individual host failures never fail the cycle. Hosts still running when
    /// the cycle deadline passes are aborted and reported as failed.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Executor` if the worker pool cannot be started.
    pub async fn collect(&self) -> Result<Vec<HostResult>> {
        let workers = self.settings.workers;
        if workers == 0 || workers > Semaphore::MAX_PERMITS {
            return Err(AppError::Executor(format!(
                "invalid worker pool size {workers}"
            )));
        }

        let cycle_start = Instant::now();
        let deadline = self.settings.cycle_deadline.map(|d| cycle_start + d);
        let semaphore = Arc::new(Semaphore::new(workers));
        let mut tasks = JoinSet::new();
        let mut pending: HashSet<String> = HashSet::with_capacity(self.inventory.len());

        tracing::debug!(
            "Starting poll cycle for {} host(s) with {} worker(s)",
            self.inventory.len(),
            workers
        );

        for host in self.inventory.values() {
            pending.insert(host.name.clone());
            let host = host.clone();
            let client = Arc::clone(&self.client);
            let semaphore = Arc::clone(&semaphore);
            let telemetry = self.telemetry.clone();
            let timeout = self.settings.host_timeout;
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await?;
                Ok::<_, AppError>(
                    host_task::run(client.as_ref(), &host, timeout, &telemetry).await,
                )
            });
        }

        let mut results = Vec::with_capacity(pending.len());
        let mut deadline_hit = false;
        loop {
            let joined = match deadline {
                Some(at) => match tokio::time::timeout_at(at, tasks.join_next()).await {
                    Ok(joined) => joined,
                    Err(_) => {
                        deadline_hit = true;
                        break;
                    }
                },
                None => tasks.join_next().await,
            };
            let Some(joined) = joined else {
                break;
            };
            match joined {
                Ok(Ok(result)) => {
                    pending.remove(&result.host);
                    results.push(result);
                }
                Ok(Err(e)) => {
                    tracing::error!("Worker pool failed mid-cycle: {}", e);
                    tasks.abort_all();
                    return Err(e);
                }
                Err(e) => tracing::error!("Host collection task did not complete: {}", e),
            }
        }
        tasks.abort_all();

        if deadline_hit {
            tracing::warn!(
                "Poll cycle deadline reached with {} host(s) still in flight",
                pending.len()
            );
        }
        for host in pending {
            let error = if deadline_hit {
                HostError::CycleDeadline
            } else {
                HostError::Panicked("collection task ended without a result".to_string())
            };
            self.telemetry
                .record_host_failure(&host, error.kind(), cycle_start.elapsed());
            results.push(HostResult {
                host,
                outcome: Err(error),
            });
        }

        let failed = results.iter().filter(|r| !r.is_success()).count();
        let elapsed = cycle_start.elapsed();
        self.telemetry.record_cycle(elapsed, failed);
        tracing::info!(
            "Poll cycle finished in {:.3}s: {} succeeded, {} failed",
            elapsed.as_secs_f64(),
            results.len() - failed,
            failed
        );

        Ok(results)
    }
}
