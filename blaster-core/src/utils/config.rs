//! Pin assignments and default speeds for the blaster board.
//!
//! Everything here is plain construction-time data. Defaults match the stock
//! wiring: pusher on 7/12/11, accelerator on 8/10/9.

use serde::{Deserialize, Serialize};

use crate::utils::io::{Duty, PinId};

/// Darts fired per trigger pull in burst mode. Read by the fire-control
/// sequencing layer, not by the drivers.
pub const BURST_COUNT: u8 = 3;

pub const MOTOR_ACCEL_SPEED: Duty = Duty::new(32);
/// Pusher speed a driver starts with.
pub const MOTOR_PUSH_SPEED_SLOW: Duty = Duty::new(32);
/// Pusher speed the sequencing layer switches to with `set_speed` for
/// full-auto fire.
pub const MOTOR_PUSH_SPEED_FAST: Duty = Duty::new(32);

/// The three lines of one H-bridge channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorPins {
    /// Direction line A (HIGH while driving).
    pub a: PinId,
    /// Direction line B.
    pub b: PinId,
    pub pwm: PinId,
}

impl MotorPins {
    pub const PUSHER: MotorPins = MotorPins {
        a: 7,
        b: 12,
        pwm: 11,
    };
    pub const ACCEL: MotorPins = MotorPins {
        a: 8,
        b: 10,
        pwm: 9,
    };

    pub fn contains(
        &self,
        pin: PinId,
    ) -> bool {
        pin == self.a || pin == self.b || pin == self.pwm
    }

    /// True when no line is shared with `other`.
    pub fn is_disjoint(
        &self,
        other: &MotorPins,
    ) -> bool {
        [other.a, other.b, other.pwm]
            .iter()
            .all(|&pin| !self.contains(pin))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorConfig {
    pub pins: MotorPins,
    /// Speed used by `drive()` until changed with `set_speed`.
    pub speed: Duty,
}

/// Both motors of the blaster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlasterConfig {
    pub pusher: MotorConfig,
    pub accel: MotorConfig,
}

impl Default for BlasterConfig {
    fn default() -> Self {
        BlasterConfig {
            pusher: MotorConfig {
                pins: MotorPins::PUSHER,
                speed: MOTOR_PUSH_SPEED_SLOW,
            },
            accel: MotorConfig {
                pins: MotorPins::ACCEL,
                speed: MOTOR_ACCEL_SPEED,
            },
        }
    }
}

impl BlasterConfig {
    /// Check that the two motors were given separate lines.
    pub fn pins_disjoint(&self) -> bool {
        self.pusher.pins.is_disjoint(&self.accel.pins)
    }
}
