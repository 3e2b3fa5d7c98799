// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! # Network Telemetry Exporter
//!
//! Polls a fleet of network devices for interface and BGP counters on every
//! scrape and republishes them as labeled text metric lines.
//!
//! ## Main modules
//! - `api`: HTTP API handlers
//! - `collector`: per-host tasks and the fleet poll cycle
//! - `config`: configuration and inventory loading
//! - `error`: error types
//! - `facts`: device fact client boundary and typed fact shapes
//! - `render`: metric line rendering
//! - `routeros`: RouterOS fact driver
//! - `telemetry`: exporter self-metrics
//! - `prelude`: commonly used types and traits

mod api;
mod collector;
mod config;
mod error;
mod facts;
mod render;
mod routeros;
mod telemetry;
pub mod prelude;

// Re-export commonly used types
/// Application configuration
pub use config::{Config, Host, Inventory};

/// Application error and result type
pub use error::{AppError, Result};

/// HTTP API router and state
pub use api::{AppState, create_router};

/// Fleet poll cycle
pub use collector::{CollectorSettings, FleetCollector, HostError, HostResult, exposition_body};

/// Device fact client boundary
pub use facts::{
    DeviceError, DeviceFacts, DriverRegistry, FactClient, Getter, RawFacts, RenderError,
};

/// Metric line rendering
pub use render::{MetricLine, render_bgp_neighbors, render_device, render_interface_counters};

/// RouterOS driver and its connection pool
pub use routeros::{
    ConnectionPool, PLATFORM as ROUTEROS_PLATFORM, RouterOsClient, start_pool_cleanup_task,
};

/// RouterOS wire protocol helpers (public for tests)
pub use routeros::{encode_length, encode_word, read_length};

/// Exporter self-telemetry
pub use telemetry::ExporterMetrics;
