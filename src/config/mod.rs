// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

//! Configuration module for the network telemetry exporter
//!
//! Loads process settings from environment variables and the host inventory
//! from a JSON file or inline JSON.

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::error::{AppError, Result};


/// Default configuration values
pub mod defaults {
    pub const SERVER_ADDR: &str = "0.0.0.0:5000";
    pub const NUM_WORKERS: usize = 100;
    pub const HOST_TIMEOUT_SECS: u64 = 30;
    pub const CYCLE_DEADLINE_SECS: u64 = 60;
    pub const USERNAME: &str = "admin";
    pub const PLATFORM: &str = "routeros";
}

/// Environment variable names used by the application
pub mod env_vars {
    pub const SERVER_ADDR: &str = "SERVER_ADDR";
    pub const INVENTORY_FILE: &str = "INVENTORY_FILE";
    pub const HOSTS_CONFIG: &str = "HOSTS_CONFIG";
    pub const NUM_WORKERS: &str = "NUM_WORKERS";
    pub const HOST_TIMEOUT_SECONDS: &str = "HOST_TIMEOUT_SECONDS";
    pub const CYCLE_DEADLINE_SECONDS: &str = "CYCLE_DEADLINE_SECONDS";
}

fn default_username() -> String {
    defaults::USERNAME.to_string()
}

fn default_platform() -> String {
    defaults::PLATFORM.to_string()
}

/// Connection parameters for a single network device
///
/// The name is filled in from the inventory key.
#[derive(Clone, Deserialize)]
pub struct Host {
    #[serde(default)]
    pub name: String,
    pub address: String,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Driver used to talk to the device, e.g. `routeros`
    #[serde(default = "default_platform")]
    pub platform: String,
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("name", &self.name)
            .field("address", &self.address)
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .field("platform", &self.platform)
            .finish()
    }
}

impl Host {
    /// Validates host configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Host name cannot be empty".to_string());
        }

        if !self.address.contains(':') {
            return Err(format!(
                "Invalid address format '{}' for host '{}': expected 'host:port'",
                self.address, self.name
            ));
        }

        if self.username.trim().is_empty() {
            return Err(format!("Username cannot be empty for host '{}'", self.name));
        }

        Ok(())
    }
}

/// Hosts keyed by name. Read-only once loaded.
pub type Inventory = HashMap<String, Host>;

/// On-disk inventory layout
#[derive(Debug, Deserialize)]
struct InventoryFile {
    #[serde(default)]
    num_workers: Option<usize>,
    #[serde(default)]
    hosts: HashMap<String, Host>,
}

/// Application-wide configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: String,
    pub inventory: Inventory,
    pub num_workers: usize,
    pub host_timeout: Duration,
    /// `None` disables the cycle-level deadline
    pub cycle_deadline: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_addr: defaults::SERVER_ADDR.to_string(),
            inventory: Inventory::new(),
            num_workers: defaults::NUM_WORKERS,
            host_timeout: Duration::from_secs(defaults::HOST_TIMEOUT_SECS),
            cycle_deadline: Some(Duration::from_secs(defaults::CYCLE_DEADLINE_SECS)),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when the inventory cannot be read or parsed.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let server_addr = std::env::var(env_vars::SERVER_ADDR)
            .unwrap_or_else(|_| defaults::SERVER_ADDR.to_string());

        let (hosts, worker_hint) = if let Ok(path) = std::env::var(env_vars::INVENTORY_FILE) {
            let file = load_inventory_file(Path::new(&path))?;
            (file.hosts, file.num_workers)
        } else if let Ok(hosts_json) = std::env::var(env_vars::HOSTS_CONFIG) {
            let hosts = serde_json::from_str(&hosts_json).map_err(|e| {
                AppError::Config(format!("Failed to parse {}: {e}", env_vars::HOSTS_CONFIG))
            })?;
            (hosts, None)
        } else {
            tracing::warn!(
                "No inventory configured. Service will start but /metrics will be empty."
            );
            (HashMap::new(), None)
        };

        let num_workers = env_parse::<usize>(env_vars::NUM_WORKERS)
            .or(worker_hint)
            .unwrap_or(defaults::NUM_WORKERS);

        let host_timeout = Duration::from_secs(
            env_parse(env_vars::HOST_TIMEOUT_SECONDS).unwrap_or(defaults::HOST_TIMEOUT_SECS),
        );

        let cycle_deadline = match env_parse::<u64>(env_vars::CYCLE_DEADLINE_SECONDS)
            .unwrap_or(defaults::CYCLE_DEADLINE_SECS)
        {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Ok(Config {
            server_addr,
            inventory: build_inventory(hosts),
            num_workers,
            host_timeout,
            cycle_deadline,
        })
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse::<T>().ok())
}

fn load_inventory_file(path: &Path) -> Result<InventoryFile> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        AppError::Config(format!(
            "Failed to read inventory {}: {e}",
            path.display()
        ))
    })?;
    parse_inventory(&raw)
        .map_err(|e| AppError::Config(format!("Failed to parse inventory {}: {e}", path.display())))
}

fn parse_inventory(raw: &str) -> std::result::Result<InventoryFile, serde_json::Error> {
    serde_json::from_str(raw)
}

/// Fills host names from their keys and drops hosts that fail validation
fn build_inventory(hosts: HashMap<String, Host>) -> Inventory {
    hosts
        .into_iter()
        .filter_map(|(name, mut host)| {
            host.name = name.clone();
            match host.validate() {
                Ok(()) => Some((name, host)),
                Err(e) => {
                    tracing::error!("Invalid host configuration: {}", e);
                    tracing::warn!("Skipping invalid host: {}", name);
                    None
                }
            }
        })
        .collect()
}
