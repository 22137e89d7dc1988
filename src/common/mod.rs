//! # Common Components
//!
//! Shared utilities used by both the client and server.
//!
//! ## Modules
//!
//! - [`messages`]: The control packet and its whitespace-delimited text encoding
//! - [`config`]: TOML configuration loading and threshold validation
//! - [`logging`]: Logger initialization for the binaries
//! - [`signal`]: Ctrl-C as a shutdown future

pub mod config;
pub mod logging;
pub mod messages;
pub mod signal;
