// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Prelude module for convenient imports
//!
//! ```rust
//! use network_telemetry_exporter::prelude::*;
//! ```

// Core types
pub use crate::config::{Config, Host, Inventory};
pub use crate::error::{AppError, Result};

// Fact boundary
pub use crate::facts::{
    BgpNeighbors, DeviceError, DeviceFacts, DriverRegistry, FactClient, Getter,
    InterfaceCounters, RawFacts, RenderError,
};

// Collection and rendering
pub use crate::collector::{CollectorSettings, FleetCollector, HostError, HostResult};
pub use crate::render::MetricLine;

// RouterOS driver
pub use crate::routeros::{ConnectionPool, RouterOsClient};
