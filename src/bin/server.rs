//! # Server Binary Entry Point
//!
//! Runs on the robot: listens for control packets and drives the actuators.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin server -- --config config/server.toml
//! cargo run --bin server -- --address 0.0.0.0:5000 --sensitivity 0.2 --verbose
//! ```
//!
//! The server will:
//! 1. Resolve configuration (TOML file if given, then command-line overrides)
//! 2. Bind the UDP socket
//! 3. Decode and dispatch packets until Ctrl-C
//! 4. Shut the actuators down and close the socket
//! 5. Write session stats as JSON (if `--stats-output` is given)

use anyhow::Context;
use clap::Parser;
use log::info;

use robot_remote::common::config::load_or_default;
use robot_remote::common::logging::{init_logger, level_for};
use robot_remote::common::signal::interrupted;
use robot_remote::server::{LoggingActuators, ServerConfig, ServerSession};

/// Command-line arguments for the server binary
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the server configuration file (TOML format)
    #[arg(short, long)]
    config: Option<String>,

    /// Listen address, e.g. 0.0.0.0:5000
    #[arg(short, long)]
    address: Option<String>,

    /// Minimum servo position change that triggers a new command
    #[arg(short, long)]
    sensitivity: Option<f64>,

    /// Stop the drivetrain if no packet arrives for this long
    #[arg(long)]
    recv_timeout_ms: Option<u64>,

    /// Path to write session stats JSON on shutdown
    #[arg(long)]
    stats_output: Option<String>,

    /// Log every packet and command
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn apply(&self, config: &mut ServerConfig) {
        if let Some(address) = &self.address {
            config.server.address = address.clone();
        }
        if let Some(sensitivity) = self.sensitivity {
            config.control.sensitivity = sensitivity;
        }
        if let Some(timeout) = self.recv_timeout_ms {
            config.server.recv_timeout_ms = Some(timeout);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments and initialize logging
    let args = Args::parse();
    init_logger(level_for(args.verbose));

    // Load configuration (file if given, defaults otherwise), then apply CLI overrides
    let mut config: ServerConfig = load_or_default(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate().context("invalid server configuration")?;

    info!(
        "🚀 Robot server starting (sensitivity {}, receive timeout {:?})",
        config.control.sensitivity,
        config.recv_timeout()
    );

    // Bind the socket; a bind failure aborts startup
    let session = ServerSession::bind(&config, LoggingActuators::new()).await?;

    // Serve until Ctrl-C (teardown happens inside run)
    let metrics = session.run(interrupted()).await?;

    // Export stats if requested
    if let Some(output_path) = args.stats_output {
        metrics
            .export_to_json(&output_path)
            .with_context(|| format!("failed to write stats to {}", output_path))?;
        info!("Stats exported to: {}", output_path);
    }

    Ok(())
}
