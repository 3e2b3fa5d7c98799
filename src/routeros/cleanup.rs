// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Connection pool cleanup task

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::ConnectionPool;

/// Cleanup interval for expired sessions (60 seconds)
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Periodically closes idle sessions until shutdown is signalled
pub fn start_pool_cleanup_task(
    pool: Arc<ConnectionPool>,
    mut shutdown_rx: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut cleanup_ticker = tokio::time::interval(CLEANUP_INTERVAL);
        loop {
            tokio::select! {
                _ = cleanup_ticker.tick() => {
                    pool.cleanup().await;
                },
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        tracing::debug!("Stopping connection pool cleanup");
                        break;
                    }
                }
            }
        }
    })
}
