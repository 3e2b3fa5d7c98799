// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Typed shapes for the two polled fact kinds

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Number, Value};
use std::collections::BTreeMap;

use super::{Getter, RawFacts, RenderError};

/// Interface name -> counter key (`<direction>_<metric>`) -> value
pub type InterfaceCounters = BTreeMap<String, BTreeMap<String, Number>>;

/// BGP neighbor data; only the `global` routing instance is polled
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BgpNeighbors {
    pub global: BgpVrf,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct BgpVrf {
    pub peers: BTreeMap<String, BgpPeer>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BgpPeer {
    pub is_up: bool,
    pub address_family: AddressFamilies,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct AddressFamilies {
    /// Counter name -> value, e.g. `received_prefixes`
    pub ipv4: BTreeMap<String, Number>,
}

/// Everything one poll cycle needs from a single device
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceFacts {
    pub interfaces_counters: InterfaceCounters,
    pub bgp_neighbors: BgpNeighbors,
}

impl TryFrom<RawFacts> for DeviceFacts {
    type Error = RenderError;

    fn try_from(mut raw: RawFacts) -> Result<Self, Self::Error> {
        Ok(Self {
            interfaces_counters: decode(&mut raw, Getter::InterfacesCounters)?,
            bgp_neighbors: decode(&mut raw, Getter::BgpNeighbors)?,
        })
    }
}

fn decode<T: DeserializeOwned>(raw: &mut RawFacts, getter: Getter) -> Result<T, RenderError> {
    let value: Value = raw.take(getter).ok_or(RenderError::MissingGetter(getter))?;
    serde_json::from_value(value).map_err(|source| RenderError::MalformedFacts { getter, source })
}
