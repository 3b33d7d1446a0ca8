//! Debounced push button.
//!
//! A time-window filter, not an edge detector: a press is accepted whenever
//! the input is at the pressed level and strictly more than the debounce
//! window has passed since the last accepted press. A button held down
//! therefore re-triggers once per window; callers wanting a single event
//! stop polling after the first one.

use reflex_common::config::{ButtonConfig, TimingConfig};
use reflex_common::gpio::{GpioDriver, GpioError, Level, Pin};
use tracing::debug;

/// Result of one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    /// Press accepted at the given `millis()` timestamp.
    Pressed { at_ms: u32 },
    /// Not pressed, or still inside the window.
    None,
}

impl ButtonEvent {
    #[inline]
    pub const fn is_pressed(&self) -> bool {
        matches!(self, Self::Pressed { .. })
    }
}

/// Filter phase, derived from the last accepted press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebouncePhase {
    /// No accepted press within the window.
    Idle,
    /// Within the window of the last accepted press.
    Cooldown,
}

/// Button reader owning its debounce state.
#[derive(Debug, Clone)]
pub struct DebouncedButton {
    pin: Pin,
    pressed_level: Level,
    window_ms: u32,
    /// `millis()` of the last accepted press, 0 before the first one.
    last_accepted_ms: u32,
}

impl DebouncedButton {
    pub fn new(pin: Pin, button: &ButtonConfig, timing: &TimingConfig) -> Self {
        Self {
            pin,
            pressed_level: button.pressed_level,
            window_ms: timing.debounce_ms,
            last_accepted_ms: 0,
        }
    }

    #[inline]
    pub const fn last_accepted_ms(&self) -> u32 {
        self.last_accepted_ms
    }

    /// Phase of the filter at `now_ms`.
    pub fn phase(&self, now_ms: u32) -> DebouncePhase {
        if now_ms.wrapping_sub(self.last_accepted_ms) > self.window_ms {
            DebouncePhase::Idle
        } else {
            DebouncePhase::Cooldown
        }
    }

    /// Sample the input once.
    pub fn poll<G: GpioDriver + ?Sized>(
        &mut self,
        gpio: &mut G,
    ) -> Result<ButtonEvent, GpioError> {
        let level = gpio.read(self.pin)?;
        if level != self.pressed_level {
            return Ok(ButtonEvent::None);
        }

        let now = gpio.millis();
        if self.phase(now) == DebouncePhase::Cooldown {
            return Ok(ButtonEvent::None);
        }

        debug!("button {} accepted at {}ms", self.pin, now);
        self.last_accepted_ms = now;
        Ok(ButtonEvent::Pressed { at_ms: now })
    }
}
