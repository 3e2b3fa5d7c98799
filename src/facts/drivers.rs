// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Platform driver dispatch

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use super::{DeviceError, FactClient, Getter, RawFacts};
use crate::config::Host;

/// Routes each host to the fact client registered for its `platform`
#[derive(Default, Clone)]
pub struct DriverRegistry {
    drivers: HashMap<String, Arc<dyn FactClient>>,
}

impl DriverRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn register(mut self, platform: &str, client: Arc<dyn FactClient>) -> Self {
        self.drivers.insert(platform.to_string(), client);
        self
    }

    #[must_use]
    pub fn supports(&self, platform: &str) -> bool {
        self.drivers.contains_key(platform)
    }
}

#[async_trait]
impl FactClient for DriverRegistry {
    async fn fetch_facts(&self, host: &Host, getters: &[Getter]) -> Result<RawFacts, DeviceError> {
        let driver = self.drivers.get(&host.platform).ok_or_else(|| {
            DeviceError::Protocol(format!("unsupported platform driver '{}'", host.platform))
        })?;
        driver.fetch_facts(host, getters).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Fixed;

    #[async_trait]
    impl FactClient for Fixed {
        async fn fetch_facts(
            &self,
            _host: &Host,
            _getters: &[Getter],
        ) -> Result<RawFacts, DeviceError> {
            Ok(RawFacts::new().with(Getter::InterfacesCounters, json!({})))
        }
    }

    fn host(platform: &str) -> Host {
        Host {
            name: "r1".to_string(),
            address: "192.0.2.1:8728".to_string(),
            username: "admin".to_string(),
            password: String::new(),
            platform: platform.to_string(),
        }
    }

    #[tokio::test]
    async fn test_dispatches_by_platform() {
        let registry = DriverRegistry::new().register("fixed", Arc::new(Fixed));
        assert!(registry.supports("fixed"));

        let facts = registry
            .fetch_facts(&host("fixed"), &Getter::POLLED)
            .await
            .unwrap();
        assert_eq!(
            facts,
            RawFacts::new().with(Getter::InterfacesCounters, json!({}))
        );
    }

    #[tokio::test]
    async fn test_unknown_platform_is_protocol_error() {
        let registry = DriverRegistry::new().register("fixed", Arc::new(Fixed));

        let err = registry
            .fetch_facts(&host("junos"), &Getter::POLLED)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "protocol");
        assert!(err.to_string().contains("junos"));
    }
}
