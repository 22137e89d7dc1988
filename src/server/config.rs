use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::common::config::{check_address, check_threshold, ConfigError, DEFAULT_PORT};

/// Server configuration, usually loaded from TOML.
///
/// # Example TOML
///
/// ```toml
/// [server]
/// address = "0.0.0.0:5000"
/// recv_timeout_ms = 500
///
/// [control]
/// sensitivity = 0.2
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: ServerInfo,
    pub control: ServerControl,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerInfo {
    /// Address the UDP socket binds to
    pub address: String,
    /// Idle timeout; `None` blocks on receive forever
    pub recv_timeout_ms: Option<u64>,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            address: format!("0.0.0.0:{}", DEFAULT_PORT),
            recv_timeout_ms: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerControl {
    /// Minimum servo position change that triggers a new servo command
    pub sensitivity: f64,
}

impl Default for ServerControl {
    fn default() -> Self {
        Self { sensitivity: 0.2 }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_address("server.address", &self.server.address)?;
        check_threshold("control.sensitivity", self.control.sensitivity)?;
        // a zero timeout would fire right after every packet and stop the drivetrain
        if self.server.recv_timeout_ms == Some(0) {
            return Err(ConfigError::ZeroTimeout {
                name: "server.recv_timeout_ms",
            });
        }
        Ok(())
    }

    pub fn recv_timeout(&self) -> Option<Duration> {
        self.server.recv_timeout_ms.map(Duration::from_millis)
    }
}
