// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Application state shared across HTTP handlers

use std::sync::Arc;

use crate::collector::{CollectorSettings, FleetCollector};
use crate::config::Config;
use crate::facts::FactClient;
use crate::telemetry::ExporterMetrics;

/// Process-wide state, built once at startup and handed to every handler
pub struct AppState {
    pub config: Config,
    pub collector: FleetCollector,
    pub telemetry: ExporterMetrics,
}

impl AppState {
    #[must_use]
    pub fn new(config: Config, client: Arc<dyn FactClient>) -> Self {
        let telemetry = ExporterMetrics::new();
        let collector = FleetCollector::new(
            client,
            Arc::new(config.inventory.clone()),
            CollectorSettings::from(&config),
            telemetry.clone(),
        );
        Self {
            config,
            collector,
            telemetry,
        }
    }
}
