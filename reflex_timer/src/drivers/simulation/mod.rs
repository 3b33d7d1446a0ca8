//! Simulation driver module.
//!
//! Software GPIO for development and testing without physical hardware.

mod clock;
mod driver;
mod io;

pub use clock::SimClock;
pub use driver::SimulatedGpio;
pub use io::{CommittedFrame, LinkedInput, PinBank, PinEvent, PinState};

use reflex_common::config::ReflexConfig;
use reflex_common::gpio::{GpioDriver, Level};

/// Pin history kept by drivers built for the binary, per record.
pub const HISTORY_LIMIT: usize = 4096;

/// Build the simulation driver described by `config`.
///
/// The simulated board carries a shift register on the display lines and,
/// when `auto_press` is set, an operator who presses the button
/// `press_after_ms` after the LED lights and releases it `hold_ms` later.
/// Pin history is capped at [`HISTORY_LIMIT`] entries per record.
pub fn build(config: &ReflexConfig) -> SimulatedGpio {
    let clock = if config.simulation.virtual_time {
        SimClock::virtual_clock()
    } else {
        SimClock::wall_clock()
    };
    let pins = &config.pins;
    let pressed = config.button.pressed_level;

    let mut sim = SimulatedGpio::with_clock(clock)
        .with_history_limit(HISTORY_LIMIT)
        .with_shift_register(pins.data, pins.clock, pins.latch);

    if config.simulation.auto_press {
        let press_after_ms = config.simulation.press_after_ms;
        sim = sim
            .with_linked_input(LinkedInput {
                trigger: pins.led,
                on: Level::High,
                input: pins.button,
                to: pressed,
                delay_ms: press_after_ms,
            })
            .with_linked_input(LinkedInput {
                trigger: pins.led,
                on: Level::High,
                input: pins.button,
                to: !pressed,
                delay_ms: press_after_ms.saturating_add(config.simulation.hold_ms),
            });
    }
    sim
}

/// Factory function to create a simulation driver instance.
pub fn create_driver(config: &ReflexConfig) -> Box<dyn GpioDriver> {
    Box::new(build(config))
}
