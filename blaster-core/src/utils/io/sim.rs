//! Simulated board for host runs and tests.
//!
//! Keeps the last value written to every line and counts writes, so callers
//! can check both the electrical configuration and whether a command touched
//! hardware at all.

use super::{DigitalIo, Duty, PinId, PinState};

/// Number of lines on the simulated board.
pub const LINE_COUNT: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimError {
    /// Line id beyond [`LINE_COUNT`].
    OutOfRange(PinId),
    /// Write to a line that was never configured as an output.
    NotOutput(PinId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Line {
    output: bool,
    level: PinState,
    duty: Duty,
}

impl Line {
    const RESET: Line = Line {
        output: false,
        level: PinState::Low,
        duty: Duty::OFF,
    };
}

/// A board whose lines power up as unconfigured inputs.
#[derive(Debug)]
pub struct SimPort {
    lines: [Line; LINE_COUNT],
    writes: u32,
}

impl Default for SimPort {
    fn default() -> Self {
        Self::new()
    }
}

impl SimPort {
    pub const fn new() -> Self {
        Self {
            lines: [Line::RESET; LINE_COUNT],
            writes: 0,
        }
    }

    pub fn is_output(
        &self,
        pin: PinId,
    ) -> bool {
        self.line(pin).is_some_and(|l| l.output)
    }

    /// Last level written to `pin`, `None` for unknown lines.
    pub fn level(
        &self,
        pin: PinId,
    ) -> Option<PinState> {
        self.line(pin).map(|l| l.level)
    }

    /// Last duty written to `pin`, `None` for unknown lines.
    pub fn duty(
        &self,
        pin: PinId,
    ) -> Option<Duty> {
        self.line(pin).map(|l| l.duty)
    }

    /// Level and duty writes accepted so far, wrapping at `u32::MAX`.
    /// Configuration is not counted.
    pub fn writes(&self) -> u32 {
        self.writes
    }

    fn line(
        &self,
        pin: PinId,
    ) -> Option<&Line> {
        self.lines.get(usize::from(pin))
    }

    fn output_line(
        &mut self,
        pin: PinId,
    ) -> Result<&mut Line, SimError> {
        let line = self
            .lines
            .get_mut(usize::from(pin))
            .ok_or(SimError::OutOfRange(pin))?;
        if !line.output {
            return Err(SimError::NotOutput(pin));
        }
        Ok(line)
    }
}

impl DigitalIo for SimPort {
    type Error = SimError;

    fn configure_output(
        &mut self,
        pin: PinId,
    ) -> Result<(), Self::Error> {
        let line = self
            .lines
            .get_mut(usize::from(pin))
            .ok_or(SimError::OutOfRange(pin))?;
        line.output = true;
        tracing::trace!(pin, "sim: configured as output");
        Ok(())
    }

    fn write_level(
        &mut self,
        pin: PinId,
        level: PinState,
    ) -> Result<(), Self::Error> {
        self.output_line(pin)?.level = level;
        self.writes = self.writes.wrapping_add(1);
        tracing::trace!(pin, high = (level == PinState::High), "sim: level write");
        Ok(())
    }

    fn write_duty(
        &mut self,
        pin: PinId,
        duty: Duty,
    ) -> Result<(), Self::Error> {
        self.output_line(pin)?.duty = duty;
        self.writes = self.writes.wrapping_add(1);
        tracing::trace!(pin, duty = duty.get(), "sim: duty write");
        Ok(())
    }
}
