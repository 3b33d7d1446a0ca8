//! GPIO driver trait and pin-level types.
//!
//! This module defines:
//! - `GpioDriver` trait - Interface for pluggable GPIO backends
//! - `GpioError` enum - Error types for GPIO operations
//! - `DriverFactory` type alias - Factory function type
//! - `Pin`, `Level`, `PinMode`, `Pull`, `BitOrder` - wire-level vocabulary

use crate::config::ReflexConfig;
use core::fmt;
use core::ops::Not;
use serde::{Deserialize, Serialize};
use static_assertions::const_assert_eq;
use thiserror::Error;

/// Physical pin identifier, numbered the way the active driver numbers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pin(pub u8);

const_assert_eq!(core::mem::size_of::<Pin>(), 1);

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GPIO{}", self.0)
    }
}

/// Digital signal level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[default]
    Low,
    High,
}

impl Level {
    /// Level of bit `n` of `byte`.
    #[inline]
    pub const fn of_bit(byte: u8, n: u32) -> Self {
        if (byte >> n) & 0x01 == 1 {
            Self::High
        } else {
            Self::Low
        }
    }

    #[inline]
    pub const fn is_high(self) -> bool {
        matches!(self, Self::High)
    }
}

impl From<bool> for Level {
    fn from(value: bool) -> Self {
        if value { Self::High } else { Self::Low }
    }
}

impl Not for Level {
    type Output = Self;

    fn not(self) -> Self {
        match self {
            Self::Low => Self::High,
            Self::High => Self::Low,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Pin direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PinMode {
    /// High impedance, no active drive. The safe state.
    #[default]
    Input,
    Output,
}

/// Internal pull resistor selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Pull {
    #[default]
    #[serde(alias = "none")]
    Off,
    Down,
    Up,
}

/// Order in which a byte is clocked out on a serial data line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BitOrder {
    /// Bit 7 first, bit 0 last.
    #[default]
    MsbFirst,
    /// Bit 0 first, bit 7 last.
    LsbFirst,
}

impl BitOrder {
    /// Bit index transmitted at position `i` (0..8).
    #[inline]
    pub const fn bit_at(self, i: u32) -> u32 {
        match self {
            Self::MsbFirst => 7 - i,
            Self::LsbFirst => i,
        }
    }
}

/// Error types for GPIO operations.
#[derive(Debug, Clone, Error)]
pub enum GpioError {
    /// Driver initialization failed
    #[error("Initialization failed: {0}")]
    InitFailed(String),

    /// Driver not found
    #[error("Driver not found: {0}")]
    DriverNotFound(String),

    /// Pin-level I/O failed
    #[error("I/O error on {pin}: {msg}")]
    Io { pin: Pin, msg: String },

    /// Operation not available on this backend
    #[error("Unsupported by driver: {0}")]
    Unsupported(String),

    /// Pin operation before `init()` or on an unconfigured pin
    #[error("Pin {0} not configured")]
    NotConfigured(Pin),
}

/// Factory function type for creating driver instances.
pub type DriverFactory = fn(&ReflexConfig) -> Box<dyn GpioDriver>;

/// Trait defining the platform GPIO layer consumed by the reaction timer.
///
/// # Lifecycle
///
/// 1. `init()` - Called once before any pin operation
/// 2. pin/delay/clock operations - Called from the control loop
///
/// # Timing Contracts
///
/// | Operation | Guarantee |
/// |-----------|-----------|
/// | `delay_us(n)` | blocks for **at least** `n` microseconds |
/// | `delay_ms(n)` | blocks for **at least** `n` milliseconds |
/// | `millis()` | monotonic, wraps at `u32::MAX` |
pub trait GpioDriver: Send {
    /// Returns the driver's unique identifier (e.g., "sysfs", "simulation").
    fn name(&self) -> &'static str;

    /// Returns the driver's semantic version.
    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    /// Acquire the GPIO backend.
    ///
    /// # Errors
    /// Return `GpioError::InitFailed` if the backend is unavailable. Callers
    /// treat this as fatal.
    fn init(&mut self) -> Result<(), GpioError>;

    /// Set the direction of `pin`.
    fn configure_pin(&mut self, pin: Pin, mode: PinMode) -> Result<(), GpioError>;

    /// Select the internal pull resistor of `pin`.
    fn set_pull(&mut self, pin: Pin, pull: Pull) -> Result<(), GpioError>;

    /// Drive `pin` to `level`.
    fn write(&mut self, pin: Pin, level: Level) -> Result<(), GpioError>;

    /// Sample the current level of `pin`.
    fn read(&mut self, pin: Pin) -> Result<Level, GpioError>;

    /// Block for at least `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);

    /// Block for at least `us` microseconds.
    fn delay_us(&mut self, us: u32);

    /// Monotonic milliseconds since the driver started, wrapping.
    fn millis(&mut self) -> u32;
}

impl<T: GpioDriver + ?Sized> GpioDriver for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn version(&self) -> &'static str {
        (**self).version()
    }

    fn init(&mut self) -> Result<(), GpioError> {
        (**self).init()
    }

    fn configure_pin(&mut self, pin: Pin, mode: PinMode) -> Result<(), GpioError> {
        (**self).configure_pin(pin, mode)
    }

    fn set_pull(&mut self, pin: Pin, pull: Pull) -> Result<(), GpioError> {
        (**self).set_pull(pin, pull)
    }

    fn write(&mut self, pin: Pin, level: Level) -> Result<(), GpioError> {
        (**self).write(pin, level)
    }

    fn read(&mut self, pin: Pin) -> Result<Level, GpioError> {
        (**self).read(pin)
    }

    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms)
    }

    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us)
    }

    fn millis(&mut self) -> u32 {
        (**self).millis()
    }
}
