// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Exporter self-telemetry
//!
//! Per-host outcomes of every poll cycle are recorded here and served on
//! `/exporter/metrics`. Nothing in this registry feeds back into a cycle.

mod labels;

pub use labels::{HostErrorLabels, HostLabels};

use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::registry::Registry;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{AppError, Result};

#[derive(Clone)]
pub struct ExporterMetrics {
    registry: Arc<Registry>,
    host_scrape_success: Family<HostLabels, Counter>,
    host_scrape_errors: Family<HostErrorLabels, Counter>,
    host_scrape_duration_milliseconds: Family<HostLabels, Gauge>,
    collection_cycle_duration_milliseconds: Gauge,
    collection_hosts_failed: Gauge,
}

impl Default for ExporterMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn as_millis(duration: Duration) -> i64 {
    duration.as_millis().min(i64::MAX as u128) as i64
}

impl ExporterMetrics {
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let host_scrape_success = Family::<HostLabels, Counter>::default();
        registry.register(
            "exporter_host_scrape_success",
            "Successful per-host collections",
            host_scrape_success.clone(),
        );
        let host_scrape_errors = Family::<HostErrorLabels, Counter>::default();
        registry.register(
            "exporter_host_scrape_errors",
            "Failed per-host collections by failure kind",
            host_scrape_errors.clone(),
        );
        let host_scrape_duration_milliseconds = Family::<HostLabels, Gauge>::default();
        registry.register(
            "exporter_host_scrape_duration_milliseconds",
            "Duration of the last collection for a host",
            host_scrape_duration_milliseconds.clone(),
        );
        let collection_cycle_duration_milliseconds = Gauge::default();
        registry.register(
            "exporter_collection_cycle_duration_milliseconds",
            "Duration of the last full poll cycle",
            collection_cycle_duration_milliseconds.clone(),
        );
        let collection_hosts_failed = Gauge::default();
        registry.register(
            "exporter_collection_hosts_failed",
            "Hosts that failed in the last poll cycle",
            collection_hosts_failed.clone(),
        );

        Self {
            registry: Arc::new(registry),
            host_scrape_success,
            host_scrape_errors,
            host_scrape_duration_milliseconds,
            collection_cycle_duration_milliseconds,
            collection_hosts_failed,
        }
    }

    /// Encodes the registry in OpenMetrics text format
    ///
    /// # Errors
    ///
    /// Returns `AppError::Metrics` if encoding fails.
    pub fn encode(&self) -> Result<String> {
        let mut buffer = String::new();
        encode(&mut buffer, &self.registry).map_err(|e| AppError::Metrics(e.to_string()))?;
        Ok(buffer)
    }

    pub fn record_host_success(&self, host: &str, elapsed: Duration) {
        let labels = HostLabels {
            net_device: host.to_string(),
        };
        self.host_scrape_success.get_or_create(&labels).inc();
        self.host_scrape_duration_milliseconds
            .get_or_create(&labels)
            .set(as_millis(elapsed));
    }

    pub fn record_host_failure(&self, host: &str, kind: &str, elapsed: Duration) {
        self.host_scrape_errors
            .get_or_create(&HostErrorLabels {
                net_device: host.to_string(),
                kind: kind.to_string(),
            })
            .inc();
        self.host_scrape_duration_milliseconds
            .get_or_create(&HostLabels {
                net_device: host.to_string(),
            })
            .set(as_millis(elapsed));
    }

    #[allow(clippy::cast_possible_wrap)]
    pub fn record_cycle(&self, elapsed: Duration, hosts_failed: usize) {
        self.collection_cycle_duration_milliseconds
            .set(as_millis(elapsed));
        self.collection_hosts_failed.set(hosts_failed as i64);
    }

    #[must_use]
    pub fn host_success_count(&self, host: &str) -> u64 {
        self.host_scrape_success
            .get_or_create(&HostLabels {
                net_device: host.to_string(),
            })
            .get()
    }

    #[must_use]
    pub fn host_error_count(&self, host: &str, kind: &str) -> u64 {
        self.host_scrape_errors
            .get_or_create(&HostErrorLabels {
                net_device: host.to_string(),
                kind: kind.to_string(),
            })
            .get()
    }
}
