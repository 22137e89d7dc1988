//! # Client Binary Entry Point
//!
//! Runs on the operator's machine: samples joystick axes and sends control
//! packets to the robot.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin client -- --config config/client.toml
//! echo "1 -0.8" | cargo run --bin client -- --server 127.0.0.1:5000
//! cargo run --features gamepad --bin client -- --source gamepad
//! ```

use anyhow::Context;
use clap::Parser;
use log::info;
use tokio::sync::mpsc;

use robot_remote::client::input::{spawn_stdin_source, EVENT_QUEUE_SIZE};
use robot_remote::client::{ClientConfig, ClientSession, InputEvent, InputSource};
use robot_remote::common::config::load_or_default;
use robot_remote::common::logging::{init_logger, level_for};
use robot_remote::common::signal::interrupted;

/// Command-line arguments for the client binary
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the client configuration file (TOML format)
    #[arg(short, long)]
    config: Option<String>,

    /// Robot address, e.g. 192.168.1.101:5000
    #[arg(long)]
    server: Option<String>,

    /// Minimum axis change that replaces the held value
    #[arg(short, long)]
    sensitivity: Option<f64>,

    /// Speed/direction below this magnitude are sent as zero
    #[arg(short, long)]
    dead_zone: Option<f64>,

    /// Where joystick events come from
    #[arg(long, value_enum)]
    source: Option<InputSource>,

    /// Log every packet sent
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn apply(&self, config: &mut ClientConfig) {
        if let Some(server) = &self.server {
            config.client.server_address = server.clone();
        }
        if let Some(sensitivity) = self.sensitivity {
            config.control.sensitivity = sensitivity;
        }
        if let Some(dead_zone) = self.dead_zone {
            config.control.dead_zone = dead_zone;
        }
        if let Some(source) = self.source {
            config.client.source = source;
        }
    }
}

fn start_source(source: InputSource, tx: mpsc::Sender<InputEvent>) -> anyhow::Result<()> {
    match source {
        InputSource::Stdin => {
            // Reader thread is detached: a pending stdin read won't block exit
            spawn_stdin_source(tx).context("failed to start stdin reader thread")?;
            Ok(())
        }
        #[cfg(feature = "gamepad")]
        InputSource::Gamepad => {
            robot_remote::client::input::spawn_gamepad_source(tx)
                .context("failed to start gamepad thread")?;
            Ok(())
        }
        #[cfg(not(feature = "gamepad"))]
        InputSource::Gamepad => {
            drop(tx);
            anyhow::bail!("gamepad input needs the client built with --features gamepad")
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments and initialize logging
    let args = Args::parse();
    init_logger(level_for(args.verbose));

    // Load configuration (file if given, defaults otherwise), then apply CLI overrides
    let mut config: ClientConfig = load_or_default(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate().context("invalid client configuration")?;

    // Resolve the robot address and bind the sending socket
    let session = ClientSession::connect(&config).await?;

    // Start the event source feeding the session
    let (tx, rx) = mpsc::channel(EVENT_QUEUE_SIZE);
    start_source(config.client.source, tx)?;

    // Send packets until the source ends or Ctrl-C
    let sent = session.run(rx, interrupted()).await?;
    info!("Sent {} packets", sent);

    Ok(())
}
