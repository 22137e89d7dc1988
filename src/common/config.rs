//! # Configuration Utilities
//!
//! Shared configuration loading used by both the server and client binaries.
//! Each side defines its own config struct (see [`crate::server::config`] and
//! [`crate::client::config`]); this module only knows how to read TOML and
//! sanity-check the numeric thresholds they share.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default UDP port the robot listens on.
pub const DEFAULT_PORT: u16 = 5000;

/// A configuration value that parsed but makes no sense.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{name} must be a finite, non-negative number (got {value})")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("invalid socket address for {name}: {value:?}")]
    InvalidAddress { name: &'static str, value: String },

    #[error("joystick axis {axis} is mapped to more than one field")]
    DuplicateAxis { axis: u8 },

    #[error("{name} must be greater than zero; omit it to disable the timeout")]
    ZeroTimeout { name: &'static str },
}

/// Load a TOML configuration file and deserialize it into the specified type.
///
/// # Arguments
/// - `path`: Path to the TOML configuration file
///
/// # Returns
/// - `Ok(T)`: Successfully loaded and parsed configuration
/// - `Err`: File I/O or parsing error, with the file path attached
///
/// # Example
/// ```ignore
/// let config: ServerConfig = load_config("config/server.toml")?;
/// ```
pub fn load_config<T, P>(path: P) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: T = toml::from_str(&content)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    Ok(config)
}

/// Load `path` if given, otherwise fall back to `T::default()`.
pub fn load_or_default<T, P>(path: Option<P>) -> Result<T>
where
    T: for<'de> Deserialize<'de> + Default,
    P: AsRef<Path>,
{
    match path {
        Some(path) => load_config(path),
        None => Ok(T::default()),
    }
}

/// Reject negative, NaN or infinite thresholds.
pub fn check_threshold(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidThreshold { name, value })
    }
}

/// Ensure `value` parses as a `host:port` socket address.
pub fn check_address(name: &'static str, value: &str) -> Result<(), ConfigError> {
    value
        .parse::<std::net::SocketAddr>()
        .map(|_| ())
        .map_err(|_| ConfigError::InvalidAddress {
            name,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default)]
    struct Sample {
        name: String,
        level: u32,
    }

    #[test]
    fn test_load_config_reads_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name = \"robot\"\nlevel = 3").unwrap();

        let sample: Sample = load_config(file.path()).unwrap();
        assert_eq!(
            sample,
            Sample {
                name: "robot".to_string(),
                level: 3
            }
        );
    }

    #[test]
    fn test_load_config_reports_path_on_error() {
        let err = load_config::<Sample, _>("/definitely/not/here.toml").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }

    #[test]
    fn test_load_or_default_without_path() {
        let sample: Sample = load_or_default(None::<&str>).unwrap();
        assert_eq!(sample, Sample::default());
    }

    #[test]
    fn test_check_threshold() {
        assert!(check_threshold("sensitivity", 0.0).is_ok());
        assert!(check_threshold("sensitivity", 0.2).is_ok());
        assert_eq!(
            check_threshold("dead_zone", -0.1),
            Err(ConfigError::InvalidThreshold {
                name: "dead_zone",
                value: -0.1
            })
        );
        assert!(check_threshold("dead_zone", f64::NAN).is_err());
    }

    #[test]
    fn test_check_address() {
        assert!(check_address("address", "0.0.0.0:5000").is_ok());
        assert!(check_address("address", "robot.local").is_err());
    }
}
