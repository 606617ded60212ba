//! Digital I/O capability handed to motor drivers.
//!
//! A driver never touches hardware registers directly. It is given something
//! implementing [`DigitalIo`] at construction and addresses its lines by
//! [`PinId`]. Two implementations ship with the crate:
//!
//! - [`hal::HalChannel`]: one H-bridge channel built from embedded-hal pins
//! - [`sim::SimPort`]: a simulated board that records the state of every line

pub mod hal;
pub mod sim;

use core::cell::RefCell;

pub use embedded_hal::digital::PinState;
use serde::{Deserialize, Serialize};

pub use hal::{ChannelError, HalChannel};
pub use sim::{SimError, SimPort};

/// Platform line number.
pub type PinId = u8;

/// Duty-cycle value written to a PWM line.
///
/// The full range of the inner `u8` is legal: `0` is off, `255` is fully on.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Duty(u8);

impl Duty {
    /// PWM held low.
    pub const OFF: Duty = Duty(0);
    /// PWM held fully on.
    pub const MAX: Duty = Duty(u8::MAX);
    /// Duty applied to the PWM line while braking.
    pub const BRAKE: Duty = Duty::MAX;

    pub const fn new(value: u8) -> Self {
        Duty(value)
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

impl From<u8> for Duty {
    fn from(value: u8) -> Self {
        Duty(value)
    }
}

impl From<Duty> for u8 {
    fn from(duty: Duty) -> Self {
        duty.0
    }
}

/// Output operations a hosting platform provides to a motor driver.
///
/// Calls are synchronous and return as soon as the line is set.
pub trait DigitalIo {
    type Error: core::fmt::Debug;

    /// Configure `pin` as an output line.
    fn configure_output(
        &mut self,
        pin: PinId,
    ) -> Result<(), Self::Error>;

    /// Drive a digital line HIGH or LOW.
    fn write_level(
        &mut self,
        pin: PinId,
        level: PinState,
    ) -> Result<(), Self::Error>;

    /// Write a duty-cycle value to a PWM line.
    fn write_duty(
        &mut self,
        pin: PinId,
        duty: Duty,
    ) -> Result<(), Self::Error>;
}

/// Share one port between several drivers, e.g. both blaster motors on the
/// same board.
impl<T> DigitalIo for &RefCell<T>
where
    T: DigitalIo,
{
    type Error = T::Error;

    fn configure_output(
        &mut self,
        pin: PinId,
    ) -> Result<(), Self::Error> {
        self.borrow_mut().configure_output(pin)
    }

    fn write_level(
        &mut self,
        pin: PinId,
        level: PinState,
    ) -> Result<(), Self::Error> {
        self.borrow_mut().write_level(pin, level)
    }

    fn write_duty(
        &mut self,
        pin: PinId,
        duty: Duty,
    ) -> Result<(), Self::Error> {
        self.borrow_mut().write_duty(pin, duty)
    }
}
