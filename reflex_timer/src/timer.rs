//! Reaction timer state machine.
//!
//! One cycle walks the phases in order:
//!
//! ```text
//! Countdown ──► Armed ──► Measuring ──► Reporting ──► Resting ──┐
//!     ▲                       │                                 │
//!     └───────────────────────┼─────────────────────────────────┘
//!                             └──(run flag cleared)──► Stopped
//! ```
//!
//! - **Countdown**: digits N..1, one latch frame each, dwell between.
//! - **Armed**: LED on, start timestamp captured, "0" shown.
//! - **Measuring**: button polled every `poll_interval_ms` until the first
//!   accepted press or the run flag clears.
//! - **Reporting**: end timestamp, LED off, result emitted.
//! - **Resting**: fixed pause before the next cycle.
//!
//! The run flag is checked at the top of each cycle, after every countdown
//! digit and on every measuring iteration. When it clears mid-cycle the
//! rest of the cycle is abandoned (LED off, nothing reported, no rest).
//! Delays are never cut short.

use crate::button::{ButtonEvent, DebouncedButton};
use crate::error::TimerError;
use crate::run_flag::RunFlag;
use crate::segment;
use crate::shift_register::ShiftRegister;
use crate::shutdown::SafeShutdown;
use core::fmt;
use reflex_common::config::{ButtonConfig, PinAssignment, ReflexConfig, TimingConfig};
use reflex_common::gpio::{GpioDriver, GpioError, Level, PinMode, Pull};
use tracing::{debug, info, warn};

/// Digit shown while the LED is lit.
const ARMED_DIGIT: u8 = 0;

/// Phase of the measurement cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Pins not configured yet.
    Idle,
    Countdown,
    Armed,
    Measuring,
    Reporting,
    Resting,
    /// Run flag observed cleared; the loop has exited.
    Stopped,
}

/// One measured reaction. `millis()` timestamps, wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reaction {
    pub start_ms: u32,
    pub end_ms: u32,
}

impl Reaction {
    /// Elapsed time, correct across a clock wrap.
    #[inline]
    pub const fn elapsed_ms(&self) -> u32 {
        self.end_ms.wrapping_sub(self.start_ms)
    }
}

impl fmt::Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reaction time of {}", self.elapsed_ms())
    }
}

/// How a cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Measured(Reaction),
    /// Run flag cleared before a press was accepted.
    Interrupted,
}

/// The reaction timer: owns the GPIO driver and every line on it.
pub struct ReactionTimer<G: GpioDriver> {
    gpio: G,
    pins: PinAssignment,
    timing: TimingConfig,
    button_cfg: ButtonConfig,
    register: ShiftRegister,
    button: DebouncedButton,
    safe_state: SafeShutdown,
    run: RunFlag,
    phase: Phase,
    cycles: u64,
}

impl<G: GpioDriver> ReactionTimer<G> {
    pub fn new(gpio: G, config: &ReflexConfig, run: RunFlag) -> Self {
        let register = ShiftRegister::new(&config.pins, &config.timing, config.display.bit_order);
        Self {
            gpio,
            pins: config.pins,
            timing: config.timing,
            button_cfg: config.button,
            register,
            button: DebouncedButton::new(config.pins.button, &config.button, &config.timing),
            safe_state: SafeShutdown::new(register, config.pins),
            run,
            phase: Phase::Idle,
            cycles: 0,
        }
    }

    /// Acquire the GPIO backend. Nothing is claimed if this fails.
    pub fn init(&mut self) -> Result<(), TimerError> {
        self.gpio.init().map_err(TimerError::Init)?;
        info!(
            "GPIO driver '{}' v{} ready",
            self.gpio.name(),
            self.gpio.version()
        );
        Ok(())
    }

    /// Configure every line, blank the display and turn the LED off.
    pub fn setup(&mut self) -> Result<(), TimerError> {
        let pins = self.pins;
        self.gpio.configure_pin(pins.led, PinMode::Output)?;
        self.gpio.configure_pin(pins.button, PinMode::Input)?;
        self.apply_button_pull()?;
        for pin in [pins.data, pins.clock, pins.latch] {
            self.gpio.configure_pin(pin, PinMode::Output)?;
        }

        self.register.write_frame(&mut self.gpio, segment::BLANK)?;
        self.gpio.write(pins.led, Level::Low)?;
        debug!(
            "pins configured: data={} clock={} latch={} button={} led={}",
            pins.data, pins.clock, pins.latch, pins.button, pins.led
        );
        Ok(())
    }

    fn apply_button_pull(&mut self) -> Result<(), GpioError> {
        let pull = self.button_cfg.pull;
        match self.gpio.set_pull(self.pins.button, pull) {
            Err(GpioError::Unsupported(msg)) if pull != Pull::Off => {
                warn!("{msg}; button needs an external or firmware-configured pull resistor");
                Ok(())
            }
            other => other,
        }
    }

    /// Run cycles until the run flag clears. Returns the number of
    /// completed measurements.
    pub fn run<F: FnMut(&Reaction)>(&mut self, mut on_reaction: F) -> Result<u64, TimerError> {
        info!("Entering measurement loop");
        while self.run.is_running() {
            if let CycleOutcome::Interrupted = self.run_cycle(&mut on_reaction)? {
                break;
            }
        }
        self.enter(Phase::Stopped);
        info!("Measurement loop stopped after {} cycles", self.cycles);
        Ok(self.cycles)
    }

    /// Run one full cycle, reporting a measurement through `on_reaction`
    /// before the rest period starts.
    pub fn run_cycle<F: FnMut(&Reaction)>(
        &mut self,
        on_reaction: &mut F,
    ) -> Result<CycleOutcome, TimerError> {
        if !self.countdown()? {
            return Ok(CycleOutcome::Interrupted);
        }

        let start_ms = self.arm()?;

        self.enter(Phase::Measuring);
        let Some(end_ms) = self.measure()? else {
            self.gpio.write(self.pins.led, Level::Low)?;
            debug!("measurement abandoned");
            return Ok(CycleOutcome::Interrupted);
        };

        self.enter(Phase::Reporting);
        let reaction = Reaction { start_ms, end_ms };
        self.gpio.write(self.pins.led, Level::Low)?;
        self.cycles += 1;
        info!(
            cycle = self.cycles,
            elapsed_ms = reaction.elapsed_ms(),
            "reaction measured"
        );
        on_reaction(&reaction);

        if self.run.is_running() {
            self.enter(Phase::Resting);
            self.gpio.delay_ms(self.timing.rest_ms);
        }
        Ok(CycleOutcome::Measured(reaction))
    }

    /// Show N..1. Returns `false` if the run flag cleared.
    fn countdown(&mut self) -> Result<bool, TimerError> {
        self.enter(Phase::Countdown);
        for digit in (1..=self.timing.countdown_digits).rev() {
            if !self.run.is_running() {
                return Ok(false);
            }
            debug!("countdown {}", digit);
            self.register.write_frame(&mut self.gpio, segment::pattern(digit))?;
            self.gpio.delay_ms(self.timing.countdown_dwell_ms);
        }
        Ok(self.run.is_running())
    }

    /// LED on, start captured, armed digit shown. Returns the start time.
    fn arm(&mut self) -> Result<u32, TimerError> {
        self.enter(Phase::Armed);
        self.gpio.write(self.pins.led, Level::High)?;
        let start_ms = self.gpio.millis();
        self.register
            .write_frame(&mut self.gpio, segment::pattern(ARMED_DIGIT))?;
        Ok(start_ms)
    }

    /// Poll until the first accepted press. `None` if the run flag cleared.
    fn measure(&mut self) -> Result<Option<u32>, TimerError> {
        loop {
            if let ButtonEvent::Pressed { at_ms } = self.button.poll(&mut self.gpio)? {
                return Ok(Some(at_ms));
            }
            if !self.run.is_running() {
                return Ok(None);
            }
            self.gpio.delay_ms(self.timing.poll_interval_ms);
        }
    }

    /// Restore the safe pin state. Safe to call any number of times.
    pub fn shutdown(&mut self) -> Result<(), TimerError> {
        info!("Releasing all lines");
        self.safe_state.cleanup(&mut self.gpio)?;
        Ok(())
    }

    fn enter(&mut self, phase: Phase) {
        if self.phase != phase {
            debug!("phase {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Completed measurements so far.
    #[inline]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn run_flag(&self) -> RunFlag {
        self.run.clone()
    }

    pub fn driver(&self) -> &G {
        &self.gpio
    }

    pub fn driver_mut(&mut self) -> &mut G {
        &mut self.gpio
    }
}
