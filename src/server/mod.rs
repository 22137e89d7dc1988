//! # Robot Server
//!
//! - [`session`]: socket ownership, the receive loop and guaranteed teardown
//! - [`dispatch`]: drivetrain + change-gated servo commands per packet
//! - [`actuators`]: the hardware seam and a dry-run backend
//! - [`metrics`]: per-session counters
//! - [`config`]: listen address, receive timeout and sensitivity

pub mod actuators;
pub mod config;
pub mod dispatch;
pub mod metrics;
pub mod session;

pub use actuators::{ActuatorError, Actuators, LoggingActuators, Servo};
pub use config::ServerConfig;
pub use dispatch::Dispatcher;
pub use metrics::{SessionMetrics, SessionStats};
pub use session::ServerSession;
