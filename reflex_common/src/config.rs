//! Configuration loading traits and types.
//!
//! Every field has a default matching the reference wiring, so the binary
//! runs without a configuration file. A TOML file may override any subset.
//!
//! # Usage
//!
//! ```rust,no_run
//! use reflex_common::config::{ConfigError, ReflexConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = ReflexConfig::load_validated(Path::new("reflex.toml"))?;
//!     println!("LED on {}", config.pins.led);
//!     Ok(())
//! }
//! ```
//!
//! # TOML Example
//!
//! ```toml
//! [shared]
//! log_level = "debug"
//!
//! [pins]
//! led = 17
//!
//! [timing]
//! countdown_digits = 5
//! rest_ms = 2000
//! ```

use crate::consts::*;
use crate::gpio::{BitOrder, Level, Pin, Pull};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for application logging.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, bit-level shift register tracing.
    Trace,
    /// State transitions and display frames.
    Debug,
    /// General information about application operation.
    #[default]
    Info,
    /// Warning messages for potentially problematic situations.
    Warn,
    /// Error messages for serious problems.
    Error,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`.
    pub const fn as_directive(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Common configuration fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Application instance identifier.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

fn default_service_name() -> String {
    DEFAULT_SERVICE_NAME.to_string()
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            service_name: default_service_name(),
        }
    }
}

impl SharedConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if `service_name` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Logical pin roles. Fixed for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PinAssignment {
    /// Shift register serial data (DS).
    pub data: Pin,
    /// Shift register clock (SH_CP).
    pub clock: Pin,
    /// Storage register latch (ST_CP).
    pub latch: Pin,
    /// Push button input.
    pub button: Pin,
    /// Indicator LED.
    pub led: Pin,
}

impl Default for PinAssignment {
    fn default() -> Self {
        Self {
            data: Pin(DEFAULT_DATA_PIN),
            clock: Pin(DEFAULT_CLOCK_PIN),
            latch: Pin(DEFAULT_LATCH_PIN),
            button: Pin(DEFAULT_BUTTON_PIN),
            led: Pin(DEFAULT_LED_PIN),
        }
    }
}

impl PinAssignment {
    /// Every owned pin, in cleanup order.
    pub const fn all(&self) -> [Pin; 5] {
        [self.data, self.clock, self.latch, self.button, self.led]
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let pins = self.all();
        for (i, a) in pins.iter().enumerate() {
            if pins[i + 1..].contains(a) {
                return Err(ConfigError::ValidationError(format!(
                    "{a} assigned to more than one role"
                )));
            }
        }
        Ok(())
    }
}

/// Timing constants of the measurement cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct TimingConfig {
    /// Debounce window [ms]. A press is accepted only when strictly more
    /// than this has elapsed since the last accepted press.
    pub debounce_ms: u32,
    /// Dwell per countdown digit [ms].
    pub countdown_dwell_ms: u32,
    /// Number of countdown digits (counts N..1).
    pub countdown_digits: u8,
    /// Pause between cycles [ms].
    pub rest_ms: u32,
    /// Button polling interval while measuring [ms].
    pub poll_interval_ms: u32,
    /// Shift register clock high/low hold [µs].
    pub clock_pulse_us: u32,
    /// Latch high hold [µs].
    pub latch_pulse_us: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            countdown_dwell_ms: DEFAULT_COUNTDOWN_DWELL_MS,
            countdown_digits: DEFAULT_COUNTDOWN_DIGITS,
            rest_ms: DEFAULT_REST_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            clock_pulse_us: DEFAULT_CLOCK_PULSE_US,
            latch_pulse_us: DEFAULT_LATCH_PULSE_US,
        }
    }
}

impl TimingConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.countdown_digits == 0 || self.countdown_digits > MAX_DIGIT {
            return Err(ConfigError::ValidationError(format!(
                "countdown_digits must be in 1..={MAX_DIGIT}, got {}",
                self.countdown_digits
            )));
        }
        if self.clock_pulse_us < MIN_PULSE_US {
            return Err(ConfigError::ValidationError(format!(
                "clock_pulse_us must be >= {MIN_PULSE_US}, got {}",
                self.clock_pulse_us
            )));
        }
        if self.latch_pulse_us < MIN_PULSE_US {
            return Err(ConfigError::ValidationError(format!(
                "latch_pulse_us must be >= {MIN_PULSE_US}, got {}",
                self.latch_pulse_us
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "poll_interval_ms must be > 0".to_string(),
            ));
        }
        if self.debounce_ms == 0 {
            return Err(ConfigError::ValidationError(
                "debounce_ms must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Display wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields, default)]
pub struct DisplayConfig {
    /// Order in which segment bytes are clocked into the register.
    pub bit_order: BitOrder,
}

/// Button wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ButtonConfig {
    /// Level read while the button is held down.
    pub pressed_level: Level,
    /// Pull resistor applied to the button input.
    pub pull: Pull,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        // Button to ground, internal pull-up.
        Self {
            pressed_level: Level::Low,
            pull: Pull::Up,
        }
    }
}

/// How `[pins]` numbers are interpreted by the sysfs driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PinNumbering {
    /// wiringPi numbering (reference wiring), translated to kernel GPIOs.
    #[default]
    WiringPi,
    /// Kernel (BCM) GPIO numbers, used as-is.
    Kernel,
}

/// wiringPi pin → BCM GPIO for 40-pin Raspberry Pi boards.
const WIRINGPI_TO_BCM: [u8; 32] = [
    17, 18, 27, 22, 23, 24, 25, 4, 2, 3, 8, 7, 10, 9, 11, 14, 15, 28, 29, 30, 31, 5, 6, 13, 19,
    26, 12, 16, 20, 21, 0, 1,
];

impl PinNumbering {
    /// Kernel GPIO number for `pin`, `None` if it has no mapping.
    pub fn kernel_gpio(self, pin: Pin) -> Option<u32> {
        match self {
            Self::WiringPi => WIRINGPI_TO_BCM.get(usize::from(pin.0)).map(|&n| u32::from(n)),
            Self::Kernel => Some(u32::from(pin.0)),
        }
    }
}

/// Settings for the sysfs GPIO driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SysfsConfig {
    /// Root of the sysfs GPIO class directory.
    pub root: PathBuf,
    /// Numbering scheme of `[pins]`.
    pub numbering: PinNumbering,
}

impl Default for SysfsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_SYSFS_ROOT),
            numbering: PinNumbering::default(),
        }
    }
}

/// Settings for the simulation driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SimulationConfig {
    /// Simulate an operator pressing the button after each LED turn-on.
    pub auto_press: bool,
    /// Simulated operator reaction: button goes to the pressed level this
    /// long after the LED turns on [ms].
    pub press_after_ms: u32,
    /// How long the simulated operator holds the button [ms].
    pub hold_ms: u32,
    /// Use a virtual clock instead of sleeping in real time.
    pub virtual_time: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            auto_press: true,
            press_after_ms: 250,
            hold_ms: 120,
            virtual_time: false,
        }
    }
}

/// Complete Reflex configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields, default)]
pub struct ReflexConfig {
    pub shared: SharedConfig,
    pub pins: PinAssignment,
    pub timing: TimingConfig,
    pub display: DisplayConfig,
    pub button: ButtonConfig,
    pub sysfs: SysfsConfig,
    pub simulation: SimulationConfig,
}

impl ReflexConfig {
    /// Validate all sections.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` on the first violated rule.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.pins.validate()?;
        self.timing.validate()?;
        Ok(())
    }

    /// Load from `path` and validate.
    pub fn load_validated(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }
}

/// Trait for loading configuration from TOML files.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

// Blanket implementation for all types that implement DeserializeOwned.
impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}
