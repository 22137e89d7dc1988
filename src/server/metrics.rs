use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

use crate::server::dispatch::DispatchOutcome;

/// Traffic and command counters for one server session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub packets_received: u64,
    pub packets_dropped: u64,
    pub drive_commands: u64,
    pub servo_commands: u64,
    pub actuator_errors: u64,
    pub idle_timeouts: u64,
}

impl SessionStats {
    /// `drive_commands` counts only drivetrain commands that succeeded.
    pub fn record_dispatch(&mut self, outcome: DispatchOutcome) {
        if outcome.drove {
            self.drive_commands += 1;
        }
        self.servo_commands += outcome.servo_commands as u64;
        self.actuator_errors += outcome.actuator_errors as u64;
    }

    /// Fraction of received datagrams that failed to decode, in percent.
    pub fn drop_rate(&self) -> f64 {
        if self.packets_received == 0 {
            return 0.0;
        }
        self.packets_dropped as f64 / self.packets_received as f64 * 100.0
    }

    pub fn summary(&self) -> String {
        format!(
            "{} packets ({} dropped, {:.1}%), {} drive / {} servo commands, {} actuator errors, {} idle timeouts",
            self.packets_received,
            self.packets_dropped,
            self.drop_rate(),
            self.drive_commands,
            self.servo_commands,
            self.actuator_errors,
            self.idle_timeouts
        )
    }
}

/// Stats plus the session's start time, for export.
#[derive(Debug)]
pub struct SessionMetrics {
    started: Instant,
    pub stats: SessionStats,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            stats: SessionStats::default(),
        }
    }

    pub fn export_to_json<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let output = serde_json::json!({
            "session_duration_secs": self.started.elapsed().as_secs(),
            "drop_rate_percent": self.stats.drop_rate(),
            "stats": self.stats,
        });

        let json_string = serde_json::to_string_pretty(&output)?;
        let mut file = File::create(path)?;
        file.write_all(json_string.as_bytes())?;

        Ok(())
    }
}

impl Default for SessionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_dispatch() {
        let mut stats = SessionStats::default();
        stats.record_dispatch(DispatchOutcome {
            drove: true,
            servo_commands: 3,
            actuator_errors: 0,
        });
        stats.record_dispatch(DispatchOutcome {
            drove: true,
            servo_commands: 0,
            actuator_errors: 1,
        });

        assert_eq!(stats.drive_commands, 2);
        assert_eq!(stats.servo_commands, 3);
        assert_eq!(stats.actuator_errors, 1);
    }

    #[test]
    fn test_failed_drive_is_not_counted_as_a_command() {
        let mut stats = SessionStats::default();
        stats.record_dispatch(DispatchOutcome {
            drove: false,
            servo_commands: 2,
            actuator_errors: 1,
        });

        assert_eq!(stats.drive_commands, 0);
        assert_eq!(stats.servo_commands, 2);
        assert_eq!(stats.actuator_errors, 1);
    }

    #[test]
    fn test_drop_rate() {
        let mut stats = SessionStats::default();
        assert_eq!(stats.drop_rate(), 0.0);

        stats.packets_received = 4;
        stats.packets_dropped = 1;
        assert_eq!(stats.drop_rate(), 25.0);
    }

    #[test]
    fn test_export_to_json() {
        let mut metrics = SessionMetrics::new();
        metrics.stats.packets_received = 7;
        metrics.stats.servo_commands = 2;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        metrics.export_to_json(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["stats"]["packets_received"], 7);
        assert_eq!(value["stats"]["servo_commands"], 2);
    }
}
