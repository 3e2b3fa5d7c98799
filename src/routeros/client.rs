// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Fact client for MikroTik RouterOS devices

use async_trait::async_trait;
use std::sync::Arc;

use super::connection::{RouterOsConnection, parse_bgp_sessions, parse_interface_counters};
use super::pool::ConnectionPool;
use crate::config::Host;
use crate::facts::{DeviceError, FactClient, Getter, RawFacts};

/// Platform name this driver answers to in the inventory
pub const PLATFORM: &str = "routeros";

/// Fetches device facts over the `RouterOS` API
///
/// Sessions come from a shared [`ConnectionPool`] so repeated poll cycles do
/// not log in again.
pub struct RouterOsClient {
    pool: Arc<ConnectionPool>,
}

impl RouterOsClient {
    #[must_use]
    pub fn with_pool(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }
}

async fn run_getters(
    conn: &mut RouterOsConnection,
    getters: &[Getter],
) -> Result<RawFacts, DeviceError> {
    let mut facts = RawFacts::new();
    for getter in getters {
        let value = match getter {
            Getter::InterfacesCounters => {
                parse_interface_counters(&conn.command("/interface/print", &[]).await?)
            }
            Getter::BgpNeighbors => {
                parse_bgp_sessions(&conn.command("/routing/bgp/session/print", &[]).await?)
            }
        };
        facts.insert(*getter, value);
    }
    Ok(facts)
}

#[async_trait]
impl FactClient for RouterOsClient {
    async fn fetch_facts(&self, host: &Host, getters: &[Getter]) -> Result<RawFacts, DeviceError> {
        let mut conn = self
            .pool
            .get_connection(&host.address, &host.username, &host.password)
            .await?;

        let result = run_getters(&mut conn, getters).await;

        match &result {
            Ok(_) => {
                self.pool
                    .record_success(&host.address, &host.username)
                    .await;
                self.pool
                    .release_connection(&host.address, &host.username, conn)
                    .await;
            }
            Err(e) => {
                // The session may be mid-reply; drop it rather than reuse it
                tracing::debug!("Dropping RouterOS session for {}: {}", host.name, e);
                self.pool.record_error(&host.address, &host.username).await;
            }
        }

        result
    }
}
