// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Device fact client boundary
//!
//! A [`FactClient`] logs into a device and returns loosely-typed nested facts
//! per getter. Those facts are converted into [`DeviceFacts`] right here, so
//! nothing downstream walks open-ended maps.

mod drivers;
mod types;

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

use crate::config::Host;

pub use drivers::DriverRegistry;
pub use types::{AddressFamilies, BgpNeighbors, BgpPeer, BgpVrf, DeviceFacts, InterfaceCounters};

/// A named category of facts requested from a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Getter {
    InterfacesCounters,
    BgpNeighbors,
}

impl Getter {
    /// Getters requested on every poll cycle
    pub const POLLED: [Getter; 2] = [Getter::InterfacesCounters, Getter::BgpNeighbors];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Getter::InterfacesCounters => "interfaces_counters",
            Getter::BgpNeighbors => "bgp_neighbors",
        }
    }
}

impl fmt::Display for Getter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors reported by a device fact client
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeviceError {
    #[error("connectivity error: {0}")]
    Connectivity(String),

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("device timed out: {0}")]
    Timeout(String),

    #[error("protocol error: {0}")]
    Protocol(String),
}

impl DeviceError {
    /// Stable label value for telemetry
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            DeviceError::Connectivity(_) => "connectivity",
            DeviceError::Auth(_) => "auth",
            DeviceError::Timeout(_) => "timeout",
            DeviceError::Protocol(_) => "protocol",
        }
    }
}

/// Nested fact data keyed by getter name, as returned by a device driver
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFacts(Map<String, Value>);

impl RawFacts {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, getter: Getter, facts: Value) {
        self.0.insert(getter.as_str().to_string(), facts);
    }

    #[must_use]
    pub fn with(mut self, getter: Getter, facts: Value) -> Self {
        self.insert(getter, facts);
        self
    }

    pub(crate) fn take(&mut self, getter: Getter) -> Option<Value> {
        self.0.remove(getter.as_str())
    }
}

impl From<Map<String, Value>> for RawFacts {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Facts that were present but did not have the expected shape
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("getter '{0}' missing from device facts")]
    MissingGetter(Getter),

    #[error("malformed '{getter}' facts: {source}")]
    MalformedFacts {
        getter: Getter,
        #[source]
        source: serde_json::Error,
    },
}

/// Capability to fetch facts from one device
///
/// Implementations own their connection handling; the collector only bounds
/// how many fetches run at once and how long each may take.
#[async_trait]
pub trait FactClient: Send + Sync {
    async fn fetch_facts(&self, host: &Host, getters: &[Getter]) -> Result<RawFacts, DeviceError>;
}
