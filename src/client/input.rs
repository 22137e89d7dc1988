//! # Joystick Input
//!
//! Input sources turn whatever the operator is holding into [`InputEvent`]s and
//! push them into a bounded channel read by the
//! [`ClientSession`](super::session::ClientSession).
//!
//! ## Sources
//!
//! - **stdin** (always available): one axis event per line, `<axis> <value>`,
//!   e.g. `1 -0.5`. Blank lines and lines starting with `#` are skipped.
//! - **gamepad** (`gamepad` feature): the first connected gamepad via gilrs.
//!   Axis indices: left stick X = 0, left stick Y = 1, right stick X = 2,
//!   right stick Y = 3, left trigger = 4, right trigger = 5. Values are passed
//!   through as reported by the driver.

use log::{debug, info, warn};
use std::io::{self, BufRead};
use std::thread::{self, JoinHandle};
use thiserror::Error;
use tokio::sync::mpsc;

/// Capacity of the event channel between a source and the session.
pub const EVENT_QUEUE_SIZE: usize = 64;

/// One joystick event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// An axis moved to `value` (nominally `[-1.0, 1.0]`).
    Axis { axis: u8, value: f64 },
    /// A button changed state.
    Button { code: u32, pressed: bool },
    /// Anything else the device reports (connect, disconnect, ...).
    Other,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputParseError {
    #[error("expected '<axis> <value>', got {0:?}")]
    Shape(String),

    #[error("invalid axis index {0:?}")]
    Axis(String),

    #[error("invalid axis value {0:?}")]
    Value(String),
}

/// Parse one line of the stdin event format.
///
/// # Returns
/// - `Ok(Some(event))`: an axis event
/// - `Ok(None)`: blank or comment line
/// - `Err`: anything else
pub fn parse_line(line: &str) -> Result<Option<InputEvent>, InputParseError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut tokens = line.split_whitespace();
    let (Some(axis), Some(value), None) = (tokens.next(), tokens.next(), tokens.next()) else {
        return Err(InputParseError::Shape(line.to_string()));
    };

    let axis = axis
        .parse::<u8>()
        .map_err(|_| InputParseError::Axis(axis.to_string()))?;
    let value = match value.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => return Err(InputParseError::Value(value.to_string())),
    };

    Ok(Some(InputEvent::Axis { axis, value }))
}

/// Forward parsed lines to `tx` until EOF, a read error, or the receiver closes.
fn pump_lines<R: BufRead>(reader: R, tx: mpsc::Sender<InputEvent>) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("⚠️  Error reading input: {}", e);
                return;
            }
        };

        match parse_line(&line) {
            Ok(Some(event)) => {
                if tx.blocking_send(event).is_err() {
                    debug!("Event receiver dropped, stopping input source");
                    return;
                }
            }
            Ok(None) => {}
            Err(e) => warn!("⚠️  Skipping input line: {}", e),
        }
    }
    info!("⌨️  Input stream closed");
}

/// Read events from any line-oriented reader on a dedicated thread.
///
/// The thread is detached from the runtime, so a read that never returns does
/// not keep the process alive once `main` is done.
pub fn spawn_reader_source<R>(reader: R, tx: mpsc::Sender<InputEvent>) -> io::Result<JoinHandle<()>>
where
    R: BufRead + Send + 'static,
{
    thread::Builder::new()
        .name("input".to_string())
        .spawn(move || pump_lines(reader, tx))
}

/// Read `<axis> <value>` lines from standard input.
pub fn spawn_stdin_source(tx: mpsc::Sender<InputEvent>) -> io::Result<JoinHandle<()>> {
    info!("⌨️  Reading axis events from stdin as '<axis> <value>'");
    thread::Builder::new()
        .name("stdin".to_string())
        .spawn(move || pump_lines(io::stdin().lock(), tx))
}

#[cfg(feature = "gamepad")]
mod gamepad {
    use super::InputEvent;
    use gilrs::{Axis, EventType, Gilrs};
    use log::{error, info};
    use tokio::sync::mpsc;

    fn axis_index(axis: Axis) -> Option<u8> {
        match axis {
            Axis::LeftStickX => Some(0),
            Axis::LeftStickY => Some(1),
            Axis::RightStickX => Some(2),
            Axis::RightStickY => Some(3),
            Axis::LeftZ => Some(4),
            Axis::RightZ => Some(5),
            _ => None,
        }
    }

    pub(super) fn translate(event: EventType) -> InputEvent {
        match event {
            EventType::AxisChanged(axis, value, _) => match axis_index(axis) {
                Some(axis) => InputEvent::Axis {
                    axis,
                    value: f64::from(value),
                },
                None => InputEvent::Other,
            },
            EventType::ButtonPressed(_, code) => InputEvent::Button {
                code: code.into_u32(),
                pressed: true,
            },
            EventType::ButtonReleased(_, code) => InputEvent::Button {
                code: code.into_u32(),
                pressed: false,
            },
            _ => InputEvent::Other,
        }
    }

    /// Blocking event pump for the gilrs backend; runs on its own thread.
    pub(super) fn pump(tx: mpsc::Sender<InputEvent>) {
        let mut gilrs = match Gilrs::new() {
            Ok(gilrs) => gilrs,
            Err(e) => {
                error!("❌ Failed to open gamepad backend: {}", e);
                return;
            }
        };

        match gilrs.gamepads().next() {
            Some((_, pad)) => info!("🎮 Using gamepad '{}'", pad.name()),
            None => info!("🎮 No gamepad connected yet, waiting for one"),
        }

        while let Some(event) = gilrs.next_event_blocking(None) {
            if tx.blocking_send(translate(event.event)).is_err() {
                break;
            }
        }
    }
}

/// Pump gamepad events on a dedicated thread.
#[cfg(feature = "gamepad")]
pub fn spawn_gamepad_source(tx: mpsc::Sender<InputEvent>) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("gamepad".to_string())
        .spawn(move || gamepad::pump(tx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_axis_line() {
        assert_eq!(
            parse_line("1 -0.5"),
            Ok(Some(InputEvent::Axis {
                axis: 1,
                value: -0.5
            }))
        );
        assert_eq!(
            parse_line("  0\t0.25  "),
            Ok(Some(InputEvent::Axis {
                axis: 0,
                value: 0.25
            }))
        );
    }

    #[test]
    fn test_parse_skips_blank_and_comments() {
        assert_eq!(parse_line(""), Ok(None));
        assert_eq!(parse_line("   "), Ok(None));
        assert_eq!(parse_line("# full forward"), Ok(None));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(parse_line("1"), Err(InputParseError::Shape(_))));
        assert!(matches!(parse_line("1 0.5 9"), Err(InputParseError::Shape(_))));
        assert!(matches!(parse_line("-1 0.5"), Err(InputParseError::Axis(_))));
        assert!(matches!(parse_line("1 fast"), Err(InputParseError::Value(_))));
        assert!(matches!(parse_line("1 NaN"), Err(InputParseError::Value(_))));
    }

    #[test]
    fn test_reader_source_forwards_events() {
        let input: &[u8] = b"1 -0.5\nnot an event\n\n0 0.3\n";
        let (tx, mut rx) = mpsc::channel(EVENT_QUEUE_SIZE);

        spawn_reader_source(input, tx).unwrap().join().unwrap();

        assert_eq!(
            rx.blocking_recv(),
            Some(InputEvent::Axis {
                axis: 1,
                value: -0.5
            })
        );
        assert_eq!(
            rx.blocking_recv(),
            Some(InputEvent::Axis {
                axis: 0,
                value: 0.3
            })
        );
        assert_eq!(rx.blocking_recv(), None);
    }

    /// Blocks in `read` until bytes arrive or the sending side goes away.
    struct StalledInput(std::sync::mpsc::Receiver<Vec<u8>>);

    impl io::Read for StalledInput {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.recv() {
                Ok(bytes) => {
                    let n = bytes.len().min(buf.len());
                    buf[..n].copy_from_slice(&bytes[..n]);
                    Ok(n)
                }
                Err(_) => Ok(0),
            }
        }
    }

    #[test]
    fn test_stalled_source_does_not_hold_the_runtime() {
        let (feed, stalled) = std::sync::mpsc::channel::<Vec<u8>>();
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let (tx, rx) = mpsc::channel(EVENT_QUEUE_SIZE);

        let source = runtime
            .block_on(async move { spawn_reader_source(io::BufReader::new(StalledInput(stalled)), tx) })
            .unwrap();

        let started = std::time::Instant::now();
        drop(rx);
        drop(runtime);
        assert!(started.elapsed() < std::time::Duration::from_secs(1));

        // EOF lets the reader thread finish.
        drop(feed);
        source.join().unwrap();
    }
}
