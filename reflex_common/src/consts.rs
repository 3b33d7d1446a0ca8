//! Default wiring and timing constants for the Reflex workspace.
//!
//! Single source of truth for every default that the configuration layer
//! falls back to. Pin numbers follow the reference board wiring.

/// Shift register serial data input (DS).
pub const DEFAULT_DATA_PIN: u8 = 0;

/// Shift register clock (SH_CP).
pub const DEFAULT_CLOCK_PIN: u8 = 2;

/// Storage register clock / latch (ST_CP).
pub const DEFAULT_LATCH_PIN: u8 = 3;

/// Push button input.
pub const DEFAULT_BUTTON_PIN: u8 = 6;

/// Indicator LED output.
pub const DEFAULT_LED_PIN: u8 = 26;

/// Debounce window in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u32 = 50;

/// Display dwell per countdown digit in milliseconds.
pub const DEFAULT_COUNTDOWN_DWELL_MS: u32 = 1000;

/// Number of countdown digits shown before the LED lights.
pub const DEFAULT_COUNTDOWN_DIGITS: u8 = 3;

/// Pause between measurement cycles in milliseconds.
pub const DEFAULT_REST_MS: u32 = 3000;

/// Button polling interval while measuring, in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 10;

/// Shift register clock pulse width in microseconds.
pub const DEFAULT_CLOCK_PULSE_US: u32 = 10;

/// Latch pulse width in microseconds.
pub const DEFAULT_LATCH_PULSE_US: u32 = 10;

/// Lower bound for clock and latch pulse widths (74HC595 class parts).
pub const MIN_PULSE_US: u32 = 10;

/// Highest digit the segment table can render.
pub const MAX_DIGIT: u8 = 9;

/// Default sysfs GPIO root.
pub const DEFAULT_SYSFS_ROOT: &str = "/sys/class/gpio";

/// Default service name reported in logs.
pub const DEFAULT_SERVICE_NAME: &str = "reflex";
