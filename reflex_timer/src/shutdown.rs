//! Safe-state restoration for every owned line.
//!
//! Sequence: blank the display through a full latch frame, drive the LED
//! low, then switch data, clock, latch, button and LED to input so nothing
//! is actively driven. Only absolute writes are issued, so running the
//! sequence again from any state converges on the same pin state.

use crate::segment::BLANK;
use crate::shift_register::ShiftRegister;
use reflex_common::config::PinAssignment;
use reflex_common::gpio::{GpioDriver, GpioError, Level, PinMode};
use tracing::{debug, warn};

/// Cleanup handler for the display, LED and button lines.
#[derive(Debug, Clone, Copy)]
pub struct SafeShutdown {
    register: ShiftRegister,
    pins: PinAssignment,
}

impl SafeShutdown {
    pub fn new(register: ShiftRegister, pins: PinAssignment) -> Self {
        Self { register, pins }
    }

    /// Restore the safe state.
    ///
    /// Every step is attempted even when an earlier one fails; the first
    /// failure is returned.
    pub fn cleanup<G: GpioDriver + ?Sized>(&self, gpio: &mut G) -> Result<(), GpioError> {
        let mut first_err: Option<GpioError> = None;
        let mut note = |step: &str, res: Result<(), GpioError>| {
            if let Err(e) = res {
                warn!("cleanup step '{}' failed: {}", step, e);
                first_err.get_or_insert(e);
            }
        };

        note("blank display", self.register.write_frame(gpio, BLANK));
        note("led off", gpio.write(self.pins.led, Level::Low));
        for pin in self.pins.all() {
            note("release pin", gpio.configure_pin(pin, PinMode::Input));
        }

        match first_err {
            None => {
                debug!("cleanup complete, all lines released");
                Ok(())
            }
            Some(e) => Err(e),
        }
    }
}
