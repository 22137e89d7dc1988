//! # Joystick Sampler
//!
//! Holds the client's view of the five control values and decides what to send.
//!
//! For each axis event on a mapped axis:
//! 1. The held value is replaced only if it moved by more than the sensitivity
//! 2. Speed and direction inside the dead zone are snapped to exactly zero
//! 3. The full current state is returned as a packet to send
//!
//! Servo fields are not dead-zoned; a servo position near zero is a real position.

use crate::client::config::{AxisMap, ClientConfig};
use crate::client::input::InputEvent;
use crate::common::messages::ControlPacket;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Speed,
    Direction,
    Arm,
    Sorter,
    Gripper,
}

#[derive(Debug, Clone)]
pub struct Sampler {
    axes: AxisMap,
    sensitivity: f64,
    dead_zone: f64,
    state: ControlPacket,
}

impl Sampler {
    /// Every field starts at `0.0`.
    pub fn new(axes: AxisMap, sensitivity: f64, dead_zone: f64) -> Self {
        Self {
            axes,
            sensitivity,
            dead_zone,
            state: ControlPacket::default(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(
            config.axes,
            config.control.sensitivity,
            config.control.dead_zone,
        )
    }

    /// The values that would be sent right now.
    pub fn state(&self) -> ControlPacket {
        self.state
    }

    fn field_for(&self, axis: u8) -> Option<Field> {
        let axes = &self.axes;
        if axis == axes.speed {
            Some(Field::Speed)
        } else if axis == axes.direction {
            Some(Field::Direction)
        } else if axis == axes.arm {
            Some(Field::Arm)
        } else if axis == axes.sorter {
            Some(Field::Sorter)
        } else if axis == axes.gripper {
            Some(Field::Gripper)
        } else {
            None
        }
    }

    fn slot(&mut self, field: Field) -> &mut f64 {
        match field {
            Field::Speed => &mut self.state.speed,
            Field::Direction => &mut self.state.direction,
            Field::Arm => &mut self.state.arm,
            Field::Sorter => &mut self.state.sorter,
            Field::Gripper => &mut self.state.gripper,
        }
    }

    /// Feed one event; returns the packet to send, if the event was for a mapped axis.
    pub fn handle(&mut self, event: &InputEvent) -> Option<ControlPacket> {
        let (axis, value) = match *event {
            InputEvent::Axis { axis, value } => (axis, value),
            InputEvent::Button { .. } | InputEvent::Other => return None,
        };
        let field = self.field_for(axis)?;

        let sensitivity = self.sensitivity;
        let held = self.slot(field);
        if (value - *held).abs() > sensitivity {
            *held = value;
        }

        if self.state.speed.abs() < self.dead_zone {
            self.state.speed = 0.0;
        }
        if self.state.direction.abs() < self.dead_zone {
            self.state.direction = 0.0;
        }

        Some(self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sampler() -> Sampler {
        Sampler::new(AxisMap::default(), 0.1, 0.2)
    }

    fn axis(axis: u8, value: f64) -> InputEvent {
        InputEvent::Axis { axis, value }
    }

    #[test]
    fn test_speed_and_direction_axes() {
        let mut s = sampler();
        let packet = s.handle(&axis(1, -0.8)).unwrap();
        assert_eq!(packet.speed, -0.8);
        assert_eq!(packet.direction, 0.0);

        let packet = s.handle(&axis(0, 0.5)).unwrap();
        assert_eq!(packet.speed, -0.8);
        assert_eq!(packet.direction, 0.5);
    }

    #[test]
    fn test_small_moves_are_ignored_but_still_sent() {
        let mut s = sampler();
        s.handle(&axis(1, 0.5));

        let packet = s.handle(&axis(1, 0.55)).unwrap();
        assert_eq!(packet.speed, 0.5);
    }

    #[test]
    fn test_dead_zone_snaps_drivetrain_to_zero() {
        let mut s = sampler();
        s.handle(&axis(1, 0.9));

        let packet = s.handle(&axis(1, 0.15)).unwrap();
        assert_eq!(packet.speed, 0.0);

        let packet = s.handle(&axis(0, -0.19)).unwrap();
        assert_eq!(packet.direction, 0.0);
    }

    #[test]
    fn test_dead_zone_does_not_touch_servos() {
        let mut s = sampler();
        let packet = s.handle(&axis(2, 0.15)).unwrap();
        assert_eq!(packet.arm, 0.15);
    }

    #[test]
    fn test_servo_axes_fill_their_fields() {
        let mut s = sampler();
        s.handle(&axis(2, 0.3));
        s.handle(&axis(3, -0.6));
        let packet = s.handle(&axis(4, 1.0)).unwrap();

        assert_eq!(
            packet,
            ControlPacket {
                speed: 0.0,
                direction: 0.0,
                arm: 0.3,
                sorter: -0.6,
                gripper: 1.0,
            }
        );
    }

    #[test]
    fn test_unmapped_and_non_axis_events_send_nothing() {
        let mut s = sampler();
        assert_eq!(s.handle(&axis(7, 1.0)), None);
        assert_eq!(
            s.handle(&InputEvent::Button {
                code: 3,
                pressed: true
            }),
            None
        );
        assert_eq!(s.handle(&InputEvent::Other), None);
        assert_eq!(s.state(), ControlPacket::default());
    }

    #[test]
    fn test_custom_axis_map() {
        let axes = AxisMap {
            speed: 3,
            direction: 2,
            arm: 0,
            sorter: 1,
            gripper: 5,
        };
        let mut s = Sampler::new(axes, 0.1, 0.2);

        let packet = s.handle(&axis(3, 1.0)).unwrap();
        assert_eq!(packet.speed, 1.0);
        let packet = s.handle(&axis(0, -1.0)).unwrap();
        assert_eq!(packet.arm, -1.0);
        assert_eq!(s.handle(&axis(4, 1.0)), None);
    }
}
