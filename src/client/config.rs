use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::common::config::{check_threshold, ConfigError, DEFAULT_PORT};

/// Client configuration loaded from TOML file.
///
/// Every section and key is optional; missing values take the defaults shown.
///
/// # Example TOML
///
/// ```toml
/// [client]
/// server_address = "192.168.1.101:5000"
/// bind_address = "0.0.0.0:0"
/// source = "stdin"
///
/// [control]
/// sensitivity = 0.1
/// dead_zone = 0.2
/// send_delay_ms = 0
///
/// [axes]
/// direction = 0
/// speed = 1
/// arm = 2
/// sorter = 3
/// gripper = 4
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Where to send packets and where events come from
    pub client: ClientInfo,
    /// Sampling thresholds and send pacing
    pub control: ClientControl,
    /// Joystick axis index feeding each packet field
    pub axes: AxisMap,
}

/// Where joystick events are read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum InputSource {
    /// `<axis> <value>` lines on standard input
    #[default]
    Stdin,
    /// First connected gamepad (needs the `gamepad` feature)
    Gamepad,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientInfo {
    /// Robot address; host names are resolved at startup
    pub server_address: String,
    /// Local address for the sending socket
    pub bind_address: String,
    pub source: InputSource,
}

impl Default for ClientInfo {
    fn default() -> Self {
        Self {
            server_address: format!("192.168.1.101:{}", DEFAULT_PORT),
            bind_address: "0.0.0.0:0".to_string(),
            source: InputSource::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientControl {
    /// Minimum axis change that replaces the held value
    pub sensitivity: f64,
    /// Speed/direction magnitudes below this are sent as exactly zero
    pub dead_zone: f64,
    /// Pause after each send; 0 disables it
    pub send_delay_ms: u64,
}

impl Default for ClientControl {
    fn default() -> Self {
        Self {
            sensitivity: 0.1,
            dead_zone: 0.2,
            send_delay_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisMap {
    pub speed: u8,
    pub direction: u8,
    pub arm: u8,
    pub sorter: u8,
    pub gripper: u8,
}

impl Default for AxisMap {
    fn default() -> Self {
        Self {
            direction: 0,
            speed: 1,
            arm: 2,
            sorter: 3,
            gripper: 4,
        }
    }
}

impl AxisMap {
    /// Axis indices in packet field order.
    pub fn in_field_order(&self) -> [u8; 5] {
        [self.speed, self.direction, self.arm, self.sorter, self.gripper]
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_threshold("control.sensitivity", self.control.sensitivity)?;
        check_threshold("control.dead_zone", self.control.dead_zone)?;

        let axes = self.axes.in_field_order();
        for (i, axis) in axes.iter().enumerate() {
            if axes[i + 1..].contains(axis) {
                return Err(ConfigError::DuplicateAxis { axis: *axis });
            }
        }
        Ok(())
    }

    pub fn send_delay(&self) -> Duration {
        Duration::from_millis(self.control.send_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.client.server_address, "192.168.1.101:5000");
        assert_eq!(config.client.source, InputSource::Stdin);
        assert_eq!(config.control.sensitivity, 0.1);
        assert_eq!(config.control.dead_zone, 0.2);
        assert_eq!(config.send_delay(), Duration::ZERO);
        assert_eq!(config.axes.in_field_order(), [1, 0, 2, 3, 4]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_overrides() {
        let config: ClientConfig = toml::from_str(
            r#"
            [client]
            server_address = "127.0.0.1:6000"
            source = "gamepad"

            [control]
            dead_zone = 0.05
            send_delay_ms = 20

            [axes]
            arm = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.client.server_address, "127.0.0.1:6000");
        assert_eq!(config.client.bind_address, "0.0.0.0:0");
        assert_eq!(config.client.source, InputSource::Gamepad);
        assert_eq!(config.control.sensitivity, 0.1);
        assert_eq!(config.control.dead_zone, 0.05);
        assert_eq!(config.send_delay(), Duration::from_millis(20));
        assert_eq!(config.axes.arm, 5);
        assert_eq!(config.axes.speed, 1);
    }

    #[test]
    fn test_validate_rejects_duplicate_axes() {
        let mut config = ClientConfig::default();
        config.axes.gripper = 1;
        assert_eq!(
            config.validate(),
            Err(ConfigError::DuplicateAxis { axis: 1 })
        );
    }

    #[test]
    fn test_validate_rejects_negative_dead_zone() {
        let mut config = ClientConfig::default();
        config.control.dead_zone = -0.2;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidThreshold {
                name: "control.dead_zone",
                ..
            })
        ));
    }
}
