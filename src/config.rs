//! Configuration module for tundialer
//!
//! JSON dial configuration for the command-line host. The connector itself
//! never reads configuration; everything here is resolved into plain
//! arguments before dialing.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::common::{EndpointAddress, InterfaceName};
use crate::error::{Error, Result};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialConfig {
    /// Log configuration
    #[serde(default)]
    pub log: LogConfig,

    /// Egress interface name (e.g. "eth0")
    #[serde(default)]
    pub interface: String,

    /// Target IPv4 address in dotted-decimal form
    #[serde(default)]
    pub address: String,

    /// Target port
    #[serde(default)]
    pub port: u16,

    /// Give up waiting after this many milliseconds (OS default when unset)
    #[serde(default)]
    pub connect_timeout_ms: Option<u64>,

    /// Apply TCP_NODELAY after binding
    #[serde(default = "default_nodelay")]
    pub nodelay: bool,
}

fn default_nodelay() -> bool {
    true
}

impl Default for DialConfig {
    fn default() -> Self {
        Self {
            log: LogConfig::default(),
            interface: String::new(),
            address: String::new(),
            port: 0,
            connect_timeout_ms: None,
            nodelay: default_nodelay(),
        }
    }
}

/// Log configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl DialConfig {
    /// Load configuration from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;
        Self::from_json(&content)
    }

    /// Parse configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Example configuration dialing a local service over loopback
    pub fn example() -> Self {
        DialConfig {
            log: LogConfig::default(),
            interface: "lo".to_string(),
            address: "127.0.0.1".to_string(),
            port: 8080,
            connect_timeout_ms: Some(5000),
            nodelay: true,
        }
    }

    /// Check that the dial target is complete and the interface name is usable
    pub fn validate(&self) -> Result<()> {
        if self.interface.is_empty() {
            return Err(Error::Config("interface is required".into()));
        }
        if self.address.is_empty() {
            return Err(Error::Config("address is required".into()));
        }
        self.interface_name()?;
        Ok(())
    }

    pub fn interface_name(&self) -> Result<InterfaceName> {
        Ok(InterfaceName::new(self.interface.clone())?)
    }

    pub fn endpoint(&self) -> EndpointAddress {
        EndpointAddress::new(self.address.clone(), self.port)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }
}
