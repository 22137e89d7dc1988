//! # Actuator Interface
//!
//! The server never talks to hardware directly. It drives an [`Actuators`]
//! implementation supplied by the hardware-abstraction layer: one drivetrain and
//! three named servos. [`LoggingActuators`] is the dry-run backend the server
//! binary uses when no hardware backend is linked in.

use log::info;
use std::fmt;
use thiserror::Error;

/// The three position servos on the robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Servo {
    Arm,
    Sorter,
    Gripper,
}

impl Servo {
    pub fn name(self) -> &'static str {
        match self {
            Servo::Arm => "arm",
            Servo::Sorter => "sorter",
            Servo::Gripper => "gripper",
        }
    }
}

impl fmt::Display for Servo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A command the hardware layer could not carry out.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ActuatorError {
    #[error("drivetrain rejected move({speed}, {direction}): {reason}")]
    Drive {
        speed: f64,
        direction: f64,
        reason: String,
    },

    #[error("{servo} servo rejected move({position}): {reason}")]
    Servo {
        servo: Servo,
        position: f64,
        reason: String,
    },

    #[error("shutdown failed: {0}")]
    Shutdown(String),
}

/// Hardware collaborator driven by the server loop.
///
/// Every method reports failure per command; the caller logs and carries on.
pub trait Actuators: Send {
    /// Set drivetrain speed and direction.
    fn drive(&mut self, speed: f64, direction: f64) -> Result<(), ActuatorError>;

    /// Move one servo to `position`.
    fn move_servo(&mut self, servo: Servo, position: f64) -> Result<(), ActuatorError>;

    /// Stop everything and release the hardware. Called exactly once, at teardown.
    fn shutdown(&mut self) -> Result<(), ActuatorError>;
}

impl<A: Actuators + ?Sized> Actuators for Box<A> {
    fn drive(&mut self, speed: f64, direction: f64) -> Result<(), ActuatorError> {
        (**self).drive(speed, direction)
    }

    fn move_servo(&mut self, servo: Servo, position: f64) -> Result<(), ActuatorError> {
        (**self).move_servo(servo, position)
    }

    fn shutdown(&mut self) -> Result<(), ActuatorError> {
        (**self).shutdown()
    }
}

/// Dry-run backend: logs every command instead of moving hardware.
#[derive(Debug, Default)]
pub struct LoggingActuators {
    stopped: bool,
}

impl LoggingActuators {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Actuators for LoggingActuators {
    fn drive(&mut self, speed: f64, direction: f64) -> Result<(), ActuatorError> {
        if self.stopped {
            return Err(ActuatorError::Drive {
                speed,
                direction,
                reason: "actuators already shut down".to_string(),
            });
        }
        info!("🚗 drive(speed={:.3}, direction={:.3})", speed, direction);
        Ok(())
    }

    fn move_servo(&mut self, servo: Servo, position: f64) -> Result<(), ActuatorError> {
        if self.stopped {
            return Err(ActuatorError::Servo {
                servo,
                position,
                reason: "actuators already shut down".to_string(),
            });
        }
        info!("🦾 {} servo -> {:.3}", servo, position);
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), ActuatorError> {
        info!("🛑 Stopping drivetrain and releasing servos");
        self.stopped = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_actuators_refuse_after_shutdown() {
        let mut actuators = LoggingActuators::new();
        assert!(actuators.drive(0.5, 0.0).is_ok());
        assert!(actuators.move_servo(Servo::Arm, 0.1).is_ok());

        actuators.shutdown().unwrap();

        assert!(matches!(
            actuators.drive(0.5, 0.0),
            Err(ActuatorError::Drive { .. })
        ));
        assert!(matches!(
            actuators.move_servo(Servo::Gripper, 1.0),
            Err(ActuatorError::Servo {
                servo: Servo::Gripper,
                ..
            })
        ));
    }

    #[test]
    fn test_boxed_actuators_forward() {
        let mut boxed: Box<dyn Actuators> = Box::new(LoggingActuators::new());
        assert!(boxed.drive(0.0, 0.0).is_ok());
        boxed.shutdown().unwrap();
        assert!(boxed.move_servo(Servo::Sorter, 0.0).is_err());
    }

    #[test]
    fn test_servo_names() {
        let names: Vec<_> = [Servo::Arm, Servo::Sorter, Servo::Gripper]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, vec!["arm", "sorter", "gripper"]);
    }
}
