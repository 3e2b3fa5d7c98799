// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Metric line rendering
//!
//! Pure functions turning typed device facts into exposition lines of the form
//!
//! ```text
//! metric_name {label1="value1", label2="value2"} value
//! ```
//!
//! Labels keep emission order. Label values are written verbatim: device,
//! interface and peer names must not contain `"`, `\` or newlines.

use serde_json::Number;
use std::fmt::{self, Write as _};

use crate::facts::{BgpNeighbors, DeviceFacts, InterfaceCounters};


pub const INTERFACE_COUNTER: &str = "network_device_interface_counter";
pub const BGP_SESSION_UP: &str = "bgp_session_up";
pub const BGP_PREFIXES: &str = "bgp_prefixes";

/// One rendered sample: name, ordered labels, value
#[derive(Debug, Clone, PartialEq)]
pub struct MetricLine {
    pub name: &'static str,
    pub labels: Vec<(&'static str, String)>,
    pub value: Number,
}

impl MetricLine {
    fn new(name: &'static str, value: Number) -> Self {
        Self {
            name,
            labels: Vec::new(),
            value,
        }
    }

    fn label(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.labels.push((key, value.into()));
        self
    }
}

impl fmt::Display for MetricLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{", self.name)?;
        for (i, (key, value)) in self.labels.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}=\"{value}\"")?;
        }
        write!(f, "}} {}", self.value)
    }
}

/// Splits `rx_unicast_packets` into `("rx", "unicast_packets")`
///
/// A key without a separator is all direction and an empty metric.
#[must_use]
pub fn split_counter_key(key: &str) -> (&str, &str) {
    key.split_once('_').unwrap_or((key, ""))
}

/// One `network_device_interface_counter` line per (interface, counter)
#[must_use]
pub fn render_interface_counters(host_name: &str, counters: &InterfaceCounters) -> Vec<MetricLine> {
    counters
        .iter()
        .flat_map(|(interface, values)| {
            values.iter().map(move |(key, value)| {
                let (direction, metric) = split_counter_key(key);
                MetricLine::new(INTERFACE_COUNTER, value.clone())
                    .label("net_device", host_name)
                    .label("interface", interface.as_str())
                    .label("direction", direction)
                    .label("metric", metric)
            })
        })
        .collect()
}

/// Per peer: one `bgp_session_up` line, then one `bgp_prefixes` line per IPv4 counter
#[must_use]
pub fn render_bgp_neighbors(host_name: &str, bgp: &BgpNeighbors) -> Vec<MetricLine> {
    let mut lines = Vec::new();
    for (peer, data) in &bgp.global.peers {
        lines.push(
            MetricLine::new(BGP_SESSION_UP, Number::from(u8::from(data.is_up)))
                .label("net_device", host_name)
                .label("peer", peer.as_str()),
        );
        for (counter, value) in &data.address_family.ipv4 {
            lines.push(
                MetricLine::new(BGP_PREFIXES, value.clone())
                    .label("net_device", host_name)
                    .label("peer", peer.as_str())
                    .label("metric", counter.as_str()),
            );
        }
    }
    lines
}

/// Renders every line for one device into a newline-terminated text block
#[must_use]
pub fn render_device(host_name: &str, facts: &DeviceFacts) -> String {
    let mut block = String::new();
    let lines = render_interface_counters(host_name, &facts.interfaces_counters)
        .into_iter()
        .chain(render_bgp_neighbors(host_name, &facts.bgp_neighbors));
    for line in lines {
        // Writing into a String cannot fail
        let _ = writeln!(block, "{line}");
    }
    block
}
