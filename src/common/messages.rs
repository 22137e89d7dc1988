//! # Control Packet Protocol
//!
//! Defines the single message exchanged between the remote client and the robot
//! server, and its text encoding.
//!
//! ## Wire Format
//!
//! One UDP datagram carries one packet: five ASCII decimal floats separated by
//! whitespace, in fixed order:
//!
//! ```text
//! <speed> <direction> <arm> <sorter> <gripper>
//! ```
//!
//! There is no header, length prefix or version field. Extra whitespace between
//! or around the fields is tolerated on decode.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Number of fields in a control packet.
pub const FIELD_COUNT: usize = 5;

/// Largest accepted datagram payload, in bytes.
pub const MAX_PACKET_SIZE: usize = 1024;

/// Field names in wire order, used in error reports.
const FIELD_NAMES: [&str; FIELD_COUNT] = ["speed", "direction", "arm", "sorter", "gripper"];

/// Reasons a datagram can fail to decode into a [`ControlPacket`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("payload is {len} bytes, limit is {MAX_PACKET_SIZE}")]
    TooLong { len: usize },

    #[error("payload is not valid UTF-8")]
    NotUtf8,

    #[error("expected 5 fields, found {found}")]
    FieldCount { found: usize },

    #[error("field '{field}' is not a finite number: {token:?}")]
    InvalidNumber { field: &'static str, token: String },
}

/// One command from the remote: drivetrain speed/direction plus three servo positions.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControlPacket {
    pub speed: f64,
    pub direction: f64,
    pub arm: f64,
    pub sorter: f64,
    pub gripper: f64,
}

impl ControlPacket {
    /// Encode the packet into its datagram payload.
    ///
    /// # Example
    /// ```ignore
    /// let packet = ControlPacket { speed: 0.5, direction: -0.3, ..Default::default() };
    /// socket.send_to(&packet.encode(), server_addr).await?;
    /// ```
    pub fn encode(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }

    /// Decode a raw datagram payload.
    ///
    /// # Returns
    /// - `Ok(ControlPacket)`: exactly five finite numbers were found
    /// - `Err(DecodeError)`: oversized or non-UTF-8 payload, wrong field count
    ///   or a bad token
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() > MAX_PACKET_SIZE {
            return Err(DecodeError::TooLong { len: bytes.len() });
        }
        let text = std::str::from_utf8(bytes).map_err(|_| DecodeError::NotUtf8)?;
        text.parse()
    }
}

impl FromStr for ControlPacket {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        let tokens: [&str; FIELD_COUNT] = tokens
            .try_into()
            .map_err(|rest: Vec<&str>| DecodeError::FieldCount { found: rest.len() })?;

        let mut values = [0.0f64; FIELD_COUNT];
        for (i, token) in tokens.iter().enumerate() {
            values[i] = parse_field(FIELD_NAMES[i], token)?;
        }

        let [speed, direction, arm, sorter, gripper] = values;
        Ok(Self {
            speed,
            direction,
            arm,
            sorter,
            gripper,
        })
    }
}

impl fmt::Display for ControlPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.speed, self.direction, self.arm, self.sorter, self.gripper
        )
    }
}

fn parse_field(field: &'static str, token: &str) -> Result<f64, DecodeError> {
    match token.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(DecodeError::InvalidNumber {
            field,
            token: token.to_string(),
        }),
    }
}
