//! # Packet Dispatch
//!
//! Turns decoded [`ControlPacket`]s into actuator commands.
//!
//! The drivetrain is re-commanded on every packet. Each servo is change-gated:
//! it is only commanded when it has never been commanded before, or when the new
//! position differs from the last commanded one by more than the sensitivity
//! threshold.

use log::{debug, warn};

use crate::common::messages::ControlPacket;
use crate::server::actuators::{Actuators, Servo};

/// Last-commanded position of one servo.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ServoGate {
    last: Option<f64>,
}

impl ServoGate {
    /// `None` until the servo has been commanded successfully once.
    pub fn last(&self) -> Option<f64> {
        self.last
    }

    /// Whether `value` warrants a new command under `sensitivity`.
    pub fn is_dirty(&self, value: f64, sensitivity: f64) -> bool {
        match self.last {
            None => true,
            Some(previous) => (value - previous).abs() > sensitivity,
        }
    }

    pub fn commit(&mut self, value: f64) {
        self.last = Some(value);
    }
}

/// What one call to [`Dispatcher::dispatch`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// The drivetrain command succeeded.
    pub drove: bool,
    pub servo_commands: usize,
    pub actuator_errors: usize,
}

/// Change-detection state for the three servos.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    sensitivity: f64,
    arm: ServoGate,
    sorter: ServoGate,
    gripper: ServoGate,
}

impl Dispatcher {
    /// All servos start out as never commanded.
    pub fn new(sensitivity: f64) -> Self {
        Self {
            sensitivity,
            arm: ServoGate::default(),
            sorter: ServoGate::default(),
            gripper: ServoGate::default(),
        }
    }

    pub fn gate(&self, servo: Servo) -> &ServoGate {
        match servo {
            Servo::Arm => &self.arm,
            Servo::Sorter => &self.sorter,
            Servo::Gripper => &self.gripper,
        }
    }

    fn gate_mut(&mut self, servo: Servo) -> &mut ServoGate {
        match servo {
            Servo::Arm => &mut self.arm,
            Servo::Sorter => &mut self.sorter,
            Servo::Gripper => &mut self.gripper,
        }
    }

    /// Apply one packet to the actuators.
    ///
    /// 1. Compute dirty flags for arm, sorter and gripper
    /// 2. Command the drivetrain with the packet's speed and direction
    /// 3. Command each dirty servo and record its new position
    ///
    /// A failed command is logged and counted; it never aborts the rest of the
    /// packet. A servo whose command failed keeps its previous position, so the
    /// next packet tries it again.
    pub fn dispatch<A>(&mut self, packet: &ControlPacket, actuators: &mut A) -> DispatchOutcome
    where
        A: Actuators + ?Sized,
    {
        let mut outcome = DispatchOutcome::default();

        let targets = [
            (Servo::Arm, packet.arm),
            (Servo::Sorter, packet.sorter),
            (Servo::Gripper, packet.gripper),
        ];
        let mut dirty = [false; 3];
        for (flag, (servo, value)) in dirty.iter_mut().zip(targets) {
            *flag = self.gate(servo).is_dirty(value, self.sensitivity);
        }

        match actuators.drive(packet.speed, packet.direction) {
            Ok(()) => outcome.drove = true,
            Err(e) => {
                warn!("⚠️  {}", e);
                outcome.actuator_errors += 1;
            }
        }

        for (is_dirty, (servo, value)) in dirty.into_iter().zip(targets) {
            if !is_dirty {
                continue;
            }
            match actuators.move_servo(servo, value) {
                Ok(()) => {
                    debug!("{} servo commanded to {}", servo, value);
                    self.gate_mut(servo).commit(value);
                    outcome.servo_commands += 1;
                }
                Err(e) => {
                    warn!("⚠️  {}", e);
                    outcome.actuator_errors += 1;
                }
            }
        }

        outcome
    }
}
