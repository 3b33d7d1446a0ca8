//! Simulation driver implementation.
//!
//! The `SimulatedGpio` implements the `GpioDriver` trait on top of a
//! `PinBank` and a `SimClock`, for development and testing without
//! physical hardware.

use super::clock::SimClock;
use super::io::{LinkedInput, PinBank};
use crate::run_flag::RunFlag;
use reflex_common::gpio::{GpioDriver, GpioError, Level, Pin, PinMode, Pull};
use tracing::{debug, info};

/// Run flag stop scheduled at a point in simulated time.
#[derive(Debug, Clone)]
struct ScheduledStop {
    at_us: u64,
    flag: RunFlag,
}

/// Simulation driver implementing the GpioDriver trait.
#[derive(Debug)]
pub struct SimulatedGpio {
    clock: SimClock,
    io: PinBank,
    /// Value reported by `millis()` at clock zero.
    epoch_ms: u32,
    initialized: bool,
    fail_init: Option<String>,
    stops: Vec<ScheduledStop>,
}

impl SimulatedGpio {
    /// Driver on a virtual clock starting at t=0.
    pub fn new() -> Self {
        Self::with_clock(SimClock::virtual_clock())
    }

    pub fn with_clock(clock: SimClock) -> Self {
        Self {
            clock,
            io: PinBank::new(),
            epoch_ms: 0,
            initialized: false,
            fail_init: None,
            stops: Vec::new(),
        }
    }

    /// Make `millis()` start at `epoch_ms` instead of 0.
    pub fn with_epoch_ms(mut self, epoch_ms: u32) -> Self {
        self.epoch_ms = epoch_ms;
        self
    }

    /// Make `init()` fail with `reason`.
    pub fn failing_init(mut self, reason: &str) -> Self {
        self.fail_init = Some(reason.to_string());
        self
    }

    /// Attach a 74HC595 model to the given lines.
    pub fn with_shift_register(mut self, data: Pin, clock: Pin, latch: Pin) -> Self {
        self.io.attach_shift_register(data, clock, latch);
        self
    }

    /// Cap the recorded pin history; unbounded otherwise.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.io.set_history_limit(limit);
        self
    }

    pub fn with_linked_input(mut self, link: LinkedInput) -> Self {
        self.io.add_linked_input(link);
        self
    }

    /// Drive `pin` to `level` from outside at `at_ms` of simulated time.
    pub fn schedule_input(&mut self, at_ms: u64, pin: Pin, level: Level) {
        self.io.schedule_external(at_ms * 1000, pin, level);
    }

    /// Drive `pin` to `level` from outside, effective now.
    pub fn set_input(&mut self, pin: Pin, level: Level) {
        self.io.set_external(pin, level);
    }

    /// Clear `flag` once simulated time reaches `at_ms`, as an interrupt
    /// arriving from outside would.
    pub fn schedule_stop(&mut self, at_ms: u64, flag: RunFlag) {
        self.stops.push(ScheduledStop {
            at_us: at_ms * 1000,
            flag,
        });
    }

    /// Let `us` microseconds of simulated time pass.
    pub fn advance_us(&mut self, us: u64) {
        self.clock.advance(us);
        self.tick();
    }

    /// Simulated time since start [µs].
    pub fn now_us(&self) -> u64 {
        self.clock.now_us()
    }

    /// Simulated time since start [ms].
    pub fn now_ms(&self) -> u64 {
        self.clock.now_us() / 1000
    }

    pub fn io(&self) -> &PinBank {
        &self.io
    }

    pub fn io_mut(&mut self) -> &mut PinBank {
        &mut self.io
    }

    fn tick(&mut self) {
        let now = self.clock.now_us();
        self.io.process_pending(now);
        self.stops.retain(|stop| {
            if stop.at_us <= now {
                debug!("t={}us simulated interrupt", now);
                stop.flag.stop();
                false
            } else {
                true
            }
        });
    }

    fn ensure_init(&self, pin: Pin) -> Result<(), GpioError> {
        if self.initialized {
            Ok(())
        } else {
            Err(GpioError::NotConfigured(pin))
        }
    }
}

impl Default for SimulatedGpio {
    fn default() -> Self {
        Self::new()
    }
}

impl GpioDriver for SimulatedGpio {
    fn name(&self) -> &'static str {
        "simulation"
    }

    fn init(&mut self) -> Result<(), GpioError> {
        if let Some(reason) = &self.fail_init {
            return Err(GpioError::InitFailed(reason.clone()));
        }
        self.initialized = true;
        info!("Simulation GPIO initialized ({:?})", self.clock);
        Ok(())
    }

    fn configure_pin(&mut self, pin: Pin, mode: PinMode) -> Result<(), GpioError> {
        self.ensure_init(pin)?;
        self.io.configure(pin, mode);
        Ok(())
    }

    fn set_pull(&mut self, pin: Pin, pull: Pull) -> Result<(), GpioError> {
        self.ensure_init(pin)?;
        self.io.set_pull(pin, pull);
        Ok(())
    }

    fn write(&mut self, pin: Pin, level: Level) -> Result<(), GpioError> {
        self.ensure_init(pin)?;
        let now = self.clock.now_us();
        self.io.write(pin, level, now);
        Ok(())
    }

    fn read(&mut self, pin: Pin) -> Result<Level, GpioError> {
        self.ensure_init(pin)?;
        let now = self.clock.now_us();
        Ok(self.io.read(pin, now))
    }

    fn delay_ms(&mut self, ms: u32) {
        self.advance_us(u64::from(ms) * 1000);
    }

    fn delay_us(&mut self, us: u32) {
        self.advance_us(u64::from(us));
    }

    fn millis(&mut self) -> u32 {
        self.tick();
        // Truncation is the wrap.
        self.epoch_ms.wrapping_add(self.now_ms() as u32)
    }
}
