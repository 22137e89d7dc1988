//! Joystick remote control for a drivetrain + three-servo robot over UDP.
//!
//! The [`client`] samples joystick axes and sends
//! `<speed> <direction> <arm> <sorter> <gripper>` datagrams; the [`server`]
//! decodes them, drives the drivetrain on every packet and re-commands a servo
//! only when its position moved by more than the sensitivity threshold.

pub mod client;
pub mod common;
pub mod server;

pub use common::messages::{ControlPacket, DecodeError};
