//! Prelude module for common re-exports.
//!
//! ```rust
//! use reflex_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{
    ButtonConfig, ConfigError, ConfigLoader, DisplayConfig, LogLevel, PinAssignment, PinNumbering,
    ReflexConfig, SharedConfig, SimulationConfig, SysfsConfig, TimingConfig,
};

// ─── GPIO ───────────────────────────────────────────────────────────
pub use crate::gpio::{BitOrder, DriverFactory, GpioDriver, GpioError, Level, Pin, PinMode, Pull};

// ─── Constants ──────────────────────────────────────────────────────
pub use crate::consts::*;
