// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

mod exporter;
mod health;
mod metrics;

pub use exporter::exporter_metrics_handler;
pub use health::health_check;
pub use metrics::metrics_handler;
