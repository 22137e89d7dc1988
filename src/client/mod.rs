//! # Remote Client
//!
//! - [`input`]: joystick events and the sources that produce them
//! - [`sampler`]: sensitivity gating and dead zone, packet assembly
//! - [`session`]: the send loop
//! - [`config`]: server address, thresholds and axis mapping

pub mod config;
pub mod input;
pub mod sampler;
pub mod session;

pub use config::{ClientConfig, InputSource};
pub use input::InputEvent;
pub use sampler::Sampler;
pub use session::ClientSession;
