// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Label types for exporter self-telemetry

use prometheus_client::encoding::EncodeLabelSet;

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct HostLabels {
    pub net_device: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct HostErrorLabels {
    pub net_device: String,
    pub kind: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_labels_hash() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(
            HostLabels {
                net_device: "r1".to_string(),
            },
            100,
        );

        let lookup = HostLabels {
            net_device: "r1".to_string(),
        };
        assert_eq!(map.get(&lookup), Some(&100));
    }

    #[test]
    fn test_error_labels_distinguish_kind() {
        let timeout = HostErrorLabels {
            net_device: "r1".to_string(),
            kind: "timeout".to_string(),
        };
        let auth = HostErrorLabels {
            net_device: "r1".to_string(),
            kind: "auth".to_string(),
        };
        assert_ne!(timeout, auth);
    }
}
