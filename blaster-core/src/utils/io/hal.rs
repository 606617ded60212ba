//! embedded-hal adapter for a single H-bridge channel.
//!
//! HAL pin types are already configured as outputs by the time they exist, so
//! `configure_output` only checks that the line belongs to this channel.

use embedded_hal::{
    digital::{self, Error as _, OutputPin, PinState},
    pwm::{self, Error as _, SetDutyCycle},
};

use super::{DigitalIo, Duty, PinId};
use crate::utils::config::MotorPins;

/// Errors raised by a [`HalChannel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelError {
    Digital(digital::ErrorKind),
    Pwm(pwm::ErrorKind),
    /// The line is not one of the three this channel owns.
    UnknownPin(PinId),
}

/// Two direction pins and one PWM output, addressed by the ids in `pins`.
pub struct HalChannel<A, B, P> {
    pins: MotorPins,
    dir_a: A,
    dir_b: B,
    pwm: P,
}

impl<A, B, P> HalChannel<A, B, P>
where
    A: OutputPin,
    B: OutputPin,
    P: SetDutyCycle,
{
    pub fn new(
        pins: MotorPins,
        dir_a: A,
        dir_b: B,
        pwm: P,
    ) -> Self {
        Self {
            pins,
            dir_a,
            dir_b,
            pwm,
        }
    }

    pub fn pins(&self) -> MotorPins {
        self.pins
    }

    /// Hand the HAL pins back.
    pub fn release(self) -> (A, B, P) {
        (self.dir_a, self.dir_b, self.pwm)
    }
}

impl<A, B, P> DigitalIo for HalChannel<A, B, P>
where
    A: OutputPin,
    B: OutputPin,
    P: SetDutyCycle,
{
    type Error = ChannelError;

    fn configure_output(
        &mut self,
        pin: PinId,
    ) -> Result<(), Self::Error> {
        if self.pins.contains(pin) {
            tracing::trace!(pin, "HAL line already configured as output");
            Ok(())
        } else {
            Err(ChannelError::UnknownPin(pin))
        }
    }

    fn write_level(
        &mut self,
        pin: PinId,
        level: PinState,
    ) -> Result<(), Self::Error> {
        if pin == self.pins.a {
            self.dir_a
                .set_state(level)
                .map_err(|e| ChannelError::Digital(e.kind()))
        } else if pin == self.pins.b {
            self.dir_b
                .set_state(level)
                .map_err(|e| ChannelError::Digital(e.kind()))
        } else {
            Err(ChannelError::UnknownPin(pin))
        }
    }

    fn write_duty(
        &mut self,
        pin: PinId,
        duty: Duty,
    ) -> Result<(), Self::Error> {
        if pin != self.pins.pwm {
            return Err(ChannelError::UnknownPin(pin));
        }
        self.pwm
            .set_duty_cycle_fraction(u16::from(duty.get()), u16::from(Duty::MAX.get()))
            .map_err(|e| ChannelError::Pwm(e.kind()))
    }
}
