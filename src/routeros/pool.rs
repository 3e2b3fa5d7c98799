// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Connection pool for managing RouterOS sessions across poll cycles

use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::connection::RouterOsConnection;
use crate::facts::DeviceError;

/// Idle sessions older than this are closed instead of reused
const MAX_IDLE_TIME: Duration = Duration::from_secs(300);

/// Consecutive failures before connection attempts back off
const BACKOFF_THRESHOLD: u32 = 3;

/// Reuses authenticated `RouterOS` sessions between poll cycles
///
/// Sessions are keyed by address and username. A session is checked out for
/// the duration of one host task and only returned if that task succeeded.
pub struct ConnectionPool {
    idle: Mutex<HashMap<String, IdleConnection>>,
    states: Mutex<HashMap<String, ConnectionState>>,
    max_idle_time: Duration,
}

struct IdleConnection {
    connection: RouterOsConnection,
    last_used: Instant,
}

/// Tracks connection health and error state
#[derive(Clone, Default)]
struct ConnectionState {
    consecutive_errors: u32,
    last_error_time: Option<Instant>,
    last_success_time: Option<Instant>,
}

impl ConnectionState {
    fn record_success(&mut self) {
        self.consecutive_errors = 0;
        self.last_success_time = Some(Instant::now());
    }

    fn record_error(&mut self) {
        self.consecutive_errors = self.consecutive_errors.saturating_add(1);
        self.last_error_time = Some(Instant::now());
    }

    fn backoff_delay(&self) -> Duration {
        // Exponential backoff: 2^n seconds, max 5 minutes
        let base_delay = 2u64.pow(self.consecutive_errors.min(8));
        Duration::from_secs(base_delay.min(300))
    }

    fn should_skip_attempt(&self) -> bool {
        if self.consecutive_errors < BACKOFF_THRESHOLD {
            return false;
        }
        self.last_error_time
            .is_some_and(|last_error| last_error.elapsed() < self.backoff_delay())
    }
}

fn pool_key(addr: &str, username: &str) -> String {
    format!("{addr}:{username}")
}

impl Default for ConnectionPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionPool {
    #[must_use]
    pub fn new() -> Self {
        Self {
            idle: Mutex::new(HashMap::new()),
            states: Mutex::new(HashMap::new()),
            max_idle_time: MAX_IDLE_TIME,
        }
    }

    /// Checks out an idle session or opens and authenticates a new one
    pub(super) async fn get_connection(
        &self,
        addr: &str,
        username: &str,
        password: &str,
    ) -> Result<RouterOsConnection, DeviceError> {
        let key = pool_key(addr, username);

        {
            let states = self.states.lock().await;
            if let Some(state) = states.get(&key).filter(|s| s.should_skip_attempt()) {
                tracing::debug!(
                    "Skipping connection attempt to {} ({} consecutive errors, backoff {:?})",
                    addr,
                    state.consecutive_errors,
                    state.backoff_delay()
                );
                return Err(DeviceError::Connectivity(format!(
                    "connection to {addr} temporarily disabled after {} consecutive errors",
                    state.consecutive_errors
                )));
            }
        }

        {
            let mut idle = self.idle.lock().await;
            if let Some(pooled) = idle.remove(&key) {
                if pooled.last_used.elapsed() < self.max_idle_time {
                    tracing::debug!("Reusing pooled session for {}", addr);
                    return Ok(pooled.connection);
                }
                tracing::debug!("Pooled session for {} expired, reconnecting", addr);
            }
        }

        tracing::debug!("Opening new session for {}", addr);
        let result = async {
            let mut conn = RouterOsConnection::connect(addr).await?;
            conn.login(username, password).await?;
            Ok::<_, DeviceError>(conn)
        }
        .await;

        if let Err(e) = &result {
            tracing::trace!("Session setup for {} failed: {}", addr, e);
            self.record_error(addr, username).await;
        }
        result
    }

    /// Returns a healthy session for reuse by the next cycle
    pub(super) async fn release_connection(
        &self,
        addr: &str,
        username: &str,
        connection: RouterOsConnection,
    ) {
        tracing::trace!("Returning session to pool for {}", addr);
        self.idle.lock().await.insert(
            pool_key(addr, username),
            IdleConnection {
                connection,
                last_used: Instant::now(),
            },
        );
    }

    pub(super) async fn record_success(&self, addr: &str, username: &str) {
        let mut states = self.states.lock().await;
        states
            .entry(pool_key(addr, username))
            .or_default()
            .record_success();
    }

    pub(super) async fn record_error(&self, addr: &str, username: &str) {
        let mut states = self.states.lock().await;
        states
            .entry(pool_key(addr, username))
            .or_default()
            .record_error();
    }

    /// Consecutive errors and whether the session ever succeeded
    pub async fn get_connection_state(&self, addr: &str, username: &str) -> Option<(u32, bool)> {
        let states = self.states.lock().await;
        states
            .get(&pool_key(addr, username))
            .map(|state| (state.consecutive_errors, state.last_success_time.is_some()))
    }

    /// Number of idle sessions held
    pub async fn idle_count(&self) -> usize {
        self.idle.lock().await.len()
    }

    /// Closes idle sessions past the idle limit
    pub async fn cleanup(&self) {
        let mut idle = self.idle.lock().await;
        idle.retain(|key, pooled| {
            let keep = pooled.last_used.elapsed() < self.max_idle_time;
            if !keep {
                tracing::debug!("Closing expired session: {}", key);
            }
            keep
        });
    }

    /// Closes every idle session; called once on process shutdown
    pub async fn shutdown(&self) {
        let mut idle = self.idle.lock().await;
        tracing::info!("Closing {} pooled RouterOS session(s)", idle.len());
        idle.clear();
    }
}
