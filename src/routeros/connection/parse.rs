// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! RouterOS reply parsing into device fact shapes

use serde_json::{Map, Number, Value, json};

use super::Sentence;

/// `/interface/print` attribute -> counter key
const INTERFACE_COUNTERS: [(&str, &str); 8] = [
    ("rx-byte", "rx_octets"),
    ("tx-byte", "tx_octets"),
    ("rx-packet", "rx_packets"),
    ("tx-packet", "tx_packets"),
    ("rx-error", "rx_errors"),
    ("tx-error", "tx_errors"),
    ("rx-drop", "rx_discards"),
    ("tx-drop", "tx_discards"),
];

fn counter(sentence: &Sentence, attribute: &str) -> Option<Number> {
    sentence
        .get(attribute)
        .and_then(|v| v.parse::<u64>().ok())
        .map(Number::from)
}

/// Builds `interfaces_counters` facts from `/interface/print`
///
/// Only counters the device reported are included.
pub(crate) fn parse_interface_counters(sentences: &[Sentence]) -> Value {
    let mut interfaces = Map::new();
    for s in sentences {
        let Some(name) = s.get("name") else {
            continue;
        };
        let counters: Map<String, Value> = INTERFACE_COUNTERS
            .iter()
            .filter_map(|(attribute, key)| {
                counter(s, attribute).map(|n| ((*key).to_string(), Value::Number(n)))
            })
            .collect();
        interfaces.insert(name.clone(), Value::Object(counters));
    }
    Value::Object(interfaces)
}

/// Builds `bgp_neighbors` facts from `/routing/bgp/session/print`
pub(crate) fn parse_bgp_sessions(sentences: &[Sentence]) -> Value {
    let mut peers = Map::new();
    for s in sentences {
        let Some(remote) = s.get("remote.address") else {
            continue;
        };
        let mut ipv4 = Map::new();
        if let Some(prefixes) = counter(s, "prefix-count") {
            ipv4.insert("received_prefixes".to_string(), Value::Number(prefixes));
        }
        peers.insert(
            remote.clone(),
            json!({
                "is_up": s.get("established").is_some_and(|v| v == "true"),
                "address_family": { "ipv4": ipv4 },
            }),
        );
    }
    json!({ "global": { "peers": peers } })
}
