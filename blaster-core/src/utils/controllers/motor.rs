//! H-bridge motor driver.
//!
//! One `MotorDriver` owns the two direction lines and the PWM line of a single
//! bridge channel. Legal configurations:
//!
//! | State     | A    | B   | PWM          |
//! |-----------|------|-----|--------------|
//! | Freewheel | LOW  | LOW | 0            |
//! | Driving   | HIGH | LOW | speed        |
//! | Braking   | LOW  | LOW | `Duty::BRAKE`|
//!
//! A and B are never HIGH together. Within a transition the line ending LOW is
//! written before the line ending HIGH.
//!
//! Commands are guarded by the coarse state only: `drive_at` while already
//! driving does not re-apply the new duty.
//!
//! A transition marks the driver `Fault` before its first write and only
//! records the target state once every write succeeded. After a failed write
//! the lines may hold any mix of the two pairings, so neither guard applies and
//! the next `brake` or `drive` rewrites all three lines.

use serde::{Deserialize, Serialize};

use crate::utils::{
    config::{MotorConfig, MotorPins},
    io::{DigitalIo, Duty, PinState},
};

/// Electrical configuration of the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotorState {
    /// Coasting. Only seen before `initialize`.
    Freewheel,
    Driving,
    Braking,
    /// A transition failed partway; the lines are in an unknown configuration.
    Fault,
}

pub struct MotorDriver<IO> {
    io: IO,
    pins: MotorPins,
    speed: Duty,
    state: MotorState,
}

impl<IO> MotorDriver<IO>
where
    IO: DigitalIo,
{
    /// Create a driver without touching any line.
    pub fn new(
        io: IO,
        pins: MotorPins,
        speed: Duty,
    ) -> Self {
        Self {
            io,
            pins,
            speed,
            state: MotorState::Freewheel,
        }
    }

    pub fn from_config(
        io: IO,
        config: MotorConfig,
    ) -> Self {
        Self::new(io, config.pins, config.speed)
    }

    /// Configure the three lines as outputs and brake.
    ///
    /// Call once, after the platform I/O is up and before any other command.
    pub fn initialize(&mut self) -> Result<(), IO::Error> {
        self.io.configure_output(self.pins.a)?;
        self.io.configure_output(self.pins.b)?;
        self.io.configure_output(self.pins.pwm)?;
        tracing::info!(
            a = self.pins.a,
            b = self.pins.b,
            pwm = self.pins.pwm,
            "motor lines configured"
        );
        self.brake()
    }

    /// Drive forward at the stored speed.
    pub fn drive(&mut self) -> Result<(), IO::Error> {
        self.drive_at(self.speed)
    }

    /// Drive forward at `speed` without storing it.
    ///
    /// No-op when already driving, even if `speed` differs from the applied duty.
    pub fn drive_at(
        &mut self,
        speed: Duty,
    ) -> Result<(), IO::Error> {
        if self.state == MotorState::Driving {
            tracing::trace!(pwm = self.pins.pwm, "already driving");
            return Ok(());
        }
        self.state = MotorState::Fault;
        self.io.write_level(self.pins.b, PinState::Low)?;
        self.io.write_level(self.pins.a, PinState::High)?;
        self.io.write_duty(self.pins.pwm, speed)?;
        self.state = MotorState::Driving;
        tracing::debug!(pwm = self.pins.pwm, duty = speed.get(), "motor driving");
        Ok(())
    }

    /// Short both motor terminals and hold PWM at `Duty::BRAKE`.
    ///
    /// No-op when already braking.
    pub fn brake(&mut self) -> Result<(), IO::Error> {
        if self.state == MotorState::Braking {
            tracing::trace!(pwm = self.pins.pwm, "already braking");
            return Ok(());
        }
        self.state = MotorState::Fault;
        self.io.write_level(self.pins.a, PinState::Low)?;
        self.io.write_level(self.pins.b, PinState::Low)?;
        self.io.write_duty(self.pins.pwm, Duty::BRAKE)?;
        self.state = MotorState::Braking;
        tracing::debug!(pwm = self.pins.pwm, "motor braking");
        Ok(())
    }

    /// Store the speed used by later [`drive`](Self::drive) calls. Writes nothing.
    pub fn set_speed(
        &mut self,
        speed: Duty,
    ) {
        self.speed = speed;
    }

    pub fn speed(&self) -> Duty {
        self.speed
    }

    pub fn state(&self) -> MotorState {
        self.state
    }

    pub fn is_driving(&self) -> bool {
        self.state == MotorState::Driving
    }

    pub fn is_freewheeling(&self) -> bool {
        self.state == MotorState::Freewheel
    }

    pub fn is_braking(&self) -> bool {
        self.state == MotorState::Braking
    }

    pub fn is_faulted(&self) -> bool {
        self.state == MotorState::Fault
    }

    pub fn pins(&self) -> MotorPins {
        self.pins
    }
}
