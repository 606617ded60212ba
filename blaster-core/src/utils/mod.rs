//! Utility re-exports for the dart blaster controller.
//!
//! - `io`: the digital I/O capability a motor driver is handed, plus the
//!   embedded-hal adapter and a simulated board
//! - `controllers`: the H-bridge `MotorDriver` and the two-motor
//!   `BlasterController` fed by `MOTOR_CHANNEL`
//! - `config`: pin assignments and default speeds

pub mod config;
pub mod controllers;
pub mod io;

pub use config::BlasterConfig;
pub use controllers::{BlasterController, MotorDriver, MotorState, MOTOR_CHANNEL};
pub use io::{DigitalIo, Duty, PinId};
