//! 3-wire shift register driver (74HC595 class).
//!
//! A display update is one latch frame:
//!
//! ```text
//! latch  ‾‾\_________________________________/‾‾‾‾\____
//! clock  ______/‾\_/‾\_/‾\_/‾\_/‾\_/‾\_/‾\_/‾\______________
//! data   ----<b0 ><b1 ><b2 >  ...        <b7 >-------------
//! ```
//!
//! Register outputs change only on the latch rising edge, so an interrupted
//! frame leaves the previous byte on display.

use reflex_common::config::{PinAssignment, TimingConfig};
use reflex_common::gpio::{BitOrder, GpioDriver, GpioError, Level, Pin};
use tracing::trace;

/// Data/clock/latch lines plus pulse timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftRegister {
    data: Pin,
    clock: Pin,
    latch: Pin,
    bit_order: BitOrder,
    clock_pulse_us: u32,
    latch_pulse_us: u32,
}

impl ShiftRegister {
    pub fn new(pins: &PinAssignment, timing: &TimingConfig, bit_order: BitOrder) -> Self {
        Self {
            data: pins.data,
            clock: pins.clock,
            latch: pins.latch,
            bit_order,
            clock_pulse_us: timing.clock_pulse_us,
            latch_pulse_us: timing.latch_pulse_us,
        }
    }

    /// Clock the 8 bits of `byte` onto the data line in `order`.
    ///
    /// Each bit: data = bit, clock high, hold, clock low, hold. The holds
    /// are always issued, whatever the speed of the backend.
    pub fn shift_out<G: GpioDriver + ?Sized>(
        &self,
        gpio: &mut G,
        byte: u8,
        order: BitOrder,
    ) -> Result<(), GpioError> {
        for i in 0..8 {
            let bit = Level::of_bit(byte, order.bit_at(i));
            gpio.write(self.data, bit)?;
            gpio.write(self.clock, Level::High)?;
            gpio.delay_us(self.clock_pulse_us);
            gpio.write(self.clock, Level::Low)?;
            gpio.delay_us(self.clock_pulse_us);
        }
        Ok(())
    }

    /// Commit `byte` to the register outputs with one full latch frame.
    pub fn write_frame<G: GpioDriver + ?Sized>(
        &self,
        gpio: &mut G,
        byte: u8,
    ) -> Result<(), GpioError> {
        trace!("frame 0x{:02X} ({:?})", byte, self.bit_order);
        gpio.write(self.latch, Level::Low)?;
        self.shift_out(gpio, byte, self.bit_order)?;
        gpio.write(self.latch, Level::High)?;
        gpio.delay_us(self.latch_pulse_us);
        gpio.write(self.latch, Level::Low)?;
        Ok(())
    }
}
