//! Motor control for the blaster.
//!
//! - `motor`: the H-bridge `MotorDriver` state machine
//!
//! Interrupt handlers and other producers never touch a driver directly. They
//! queue a [`MotorRequest`] on [`MOTOR_CHANNEL`] and the task running
//! [`BlasterController::run`] applies it, so each driver has a single writer.

pub mod motor;

use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Channel};
use serde::{Deserialize, Serialize};

pub use motor::{MotorDriver, MotorState};

use crate::utils::io::{DigitalIo, Duty};

/// Channel used to receive motor requests (`MotorRequest` messages).
pub static MOTOR_CHANNEL: Channel<CriticalSectionRawMutex, MotorRequest, 16> = Channel::new();

/// Queue a request without waiting. Safe to call from interrupt context.
///
/// Returns `false` when the channel is full and the request was dropped.
pub fn try_submit(request: MotorRequest) -> bool {
    match MOTOR_CHANNEL.try_send(request) {
        Ok(()) => true,
        Err(_) => {
            tracing::warn!("motor channel full, dropped {:?}", request);
            false
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotorId {
    Pusher,
    Accel,
}

/// Command for a single motor.
///
/// Serialized as JSON with tag `"mc"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mc", rename_all = "snake_case")]
pub enum MotorCommand {
    /// Drive at the stored speed.
    Drive,
    /// Drive at `s` without storing it.
    DriveAt { s: Duty },
    Brake,
    /// Store a new speed for later `Drive` commands.
    SetSpeed { s: Duty },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorRequest {
    pub m: MotorId,
    pub c: MotorCommand,
}

impl MotorRequest {
    pub fn new(
        motor: MotorId,
        command: MotorCommand,
    ) -> Self {
        Self { m: motor, c: command }
    }
}

impl<IO> MotorDriver<IO>
where
    IO: DigitalIo,
{
    /// Apply one command and report the resulting state.
    pub fn execute(
        &mut self,
        command: MotorCommand,
    ) -> Result<MotorState, IO::Error> {
        match command {
            MotorCommand::Drive => self.drive()?,
            MotorCommand::DriveAt { s } => self.drive_at(s)?,
            MotorCommand::Brake => self.brake()?,
            MotorCommand::SetSpeed { s } => self.set_speed(s),
        }
        Ok(self.state())
    }
}

/// Errors from a [`BlasterController`], tagged with the motor that failed.
#[derive(Debug)]
pub enum ControllerError<PE, AE> {
    Pusher(PE),
    Accel(AE),
}

/// The pusher and accelerator motors of one blaster.
pub struct BlasterController<P, A> {
    pusher: MotorDriver<P>,
    accel: MotorDriver<A>,
}

impl<P, A> BlasterController<P, A>
where
    P: DigitalIo,
    A: DigitalIo,
{
    /// Compose two drivers. No line is touched until [`initialize`](Self::initialize).
    pub fn new(
        pusher: MotorDriver<P>,
        accel: MotorDriver<A>,
    ) -> Self {
        if !pusher.pins().is_disjoint(&accel.pins()) {
            tracing::warn!(
                "pusher {:?} and accel {:?} share lines",
                pusher.pins(),
                accel.pins()
            );
        }
        Self { pusher, accel }
    }

    /// Initialize the pusher, then the accelerator. Both end up braking.
    pub fn initialize(&mut self) -> Result<(), ControllerError<P::Error, A::Error>> {
        self.pusher.initialize().map_err(ControllerError::Pusher)?;
        self.accel.initialize().map_err(ControllerError::Accel)?;
        tracing::info!("blaster motors initialized");
        Ok(())
    }

    pub fn execute(
        &mut self,
        request: MotorRequest,
    ) -> Result<MotorState, ControllerError<P::Error, A::Error>> {
        match request.m {
            MotorId::Pusher => self
                .pusher
                .execute(request.c)
                .map_err(ControllerError::Pusher),
            MotorId::Accel => self
                .accel
                .execute(request.c)
                .map_err(ControllerError::Accel),
        }
    }

    /// Brake both motors. The accelerator is still braked if the pusher fails.
    pub fn brake_all(&mut self) -> Result<(), ControllerError<P::Error, A::Error>> {
        let pusher = self.pusher.brake().map_err(ControllerError::Pusher);
        let accel = self.accel.brake().map_err(ControllerError::Accel);
        pusher.and(accel)
    }

    pub fn state_of(
        &self,
        motor: MotorId,
    ) -> MotorState {
        match motor {
            MotorId::Pusher => self.pusher.state(),
            MotorId::Accel => self.accel.state(),
        }
    }

    pub fn pusher(&self) -> &MotorDriver<P> {
        &self.pusher
    }

    pub fn accel(&self) -> &MotorDriver<A> {
        &self.accel
    }

    /// Consume `MOTOR_CHANNEL` forever.
    pub async fn run(&mut self) -> ! {
        loop {
            let request = MOTOR_CHANNEL.receiver().receive().await;
            tracing::info!("Received motor request: {:?}", request);
            match self.execute(request) {
                Ok(state) => tracing::debug!(?state, "motor request applied"),
                Err(e) => tracing::error!("motor request failed: {:?}", e),
            }
        }
    }
}
