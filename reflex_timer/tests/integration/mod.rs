//! Shared fixtures for the integration scenarios.

mod countdown;
mod measurement;
mod shutdown;

use reflex_common::config::ReflexConfig;
use reflex_common::gpio::Level;
use reflex_timer::drivers::simulation::{LinkedInput, SimulatedGpio};
use reflex_timer::{ReactionTimer, RunFlag};

/// Simulated board with the shift register on the display lines.
pub fn board(config: &ReflexConfig) -> SimulatedGpio {
    let pins = &config.pins;
    SimulatedGpio::new().with_shift_register(pins.data, pins.clock, pins.latch)
}

/// Operator pressing the button `after_ms` after the LED lights.
pub fn operator(config: &ReflexConfig, after_ms: u32) -> LinkedInput {
    LinkedInput {
        trigger: config.pins.led,
        on: Level::High,
        input: config.pins.button,
        to: config.button.pressed_level,
        delay_ms: after_ms,
    }
}

/// Timer initialized and set up on `sim`, history cleared.
pub fn ready_timer(sim: SimulatedGpio, config: &ReflexConfig) -> ReactionTimer<SimulatedGpio> {
    let mut timer = ReactionTimer::new(sim, config, RunFlag::new());
    timer.init().expect("init failed");
    timer.setup().expect("setup failed");
    timer.driver_mut().io_mut().clear_history();
    timer
}
