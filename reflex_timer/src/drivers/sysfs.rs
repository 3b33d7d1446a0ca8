//! Linux sysfs GPIO driver.
//!
//! Drives pins through `/sys/class/gpio`: a pin is exported by writing its
//! kernel number to `export`, then controlled through `gpioN/direction` and
//! `gpioN/value`. The interface has no pull resistor control; pulls must be
//! set up by the device tree or firmware, so `set_pull` reports
//! `GpioError::Unsupported` for anything other than `Pull::Off`.

use reflex_common::config::{PinNumbering, ReflexConfig, SysfsConfig};
use reflex_common::gpio::{GpioDriver, GpioError, Level, Pin, PinMode, Pull};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// sysfs-backed GPIO driver.
#[derive(Debug)]
pub struct SysfsGpio {
    root: PathBuf,
    numbering: PinNumbering,
    /// Pins exported so far, with their kernel GPIO number.
    exported: BTreeMap<Pin, u32>,
    start: Option<Instant>,
}

impl SysfsGpio {
    pub fn new(config: &SysfsConfig) -> Self {
        Self {
            root: config.root.clone(),
            numbering: config.numbering,
            exported: BTreeMap::new(),
            start: None,
        }
    }

    fn io_err(pin: Pin, what: &str, e: impl std::fmt::Display) -> GpioError {
        GpioError::Io {
            pin,
            msg: format!("{what}: {e}"),
        }
    }

    /// Directory of `pin`, exporting it first if needed.
    fn pin_dir(&mut self, pin: Pin) -> Result<PathBuf, GpioError> {
        if self.start.is_none() {
            return Err(GpioError::NotConfigured(pin));
        }
        if let Some(gpio) = self.exported.get(&pin) {
            return Ok(self.root.join(format!("gpio{gpio}")));
        }

        let numbering = self.numbering;
        let gpio = numbering
            .kernel_gpio(pin)
            .ok_or_else(|| Self::io_err(pin, "no kernel mapping", format!("{numbering:?}")))?;
        let dir = self.root.join(format!("gpio{gpio}"));
        if !dir.exists() {
            debug!("Exporting {} as gpio{}", pin, gpio);
            fs::write(self.root.join("export"), gpio.to_string())
                .map_err(|e| Self::io_err(pin, "export", e))?;
        }
        self.exported.insert(pin, gpio);
        Ok(dir)
    }
}

impl GpioDriver for SysfsGpio {
    fn name(&self) -> &'static str {
        "sysfs"
    }

    fn init(&mut self) -> Result<(), GpioError> {
        if !self.root.join("export").exists() {
            return Err(GpioError::InitFailed(format!(
                "sysfs GPIO interface not available at {}",
                self.root.display()
            )));
        }
        self.start = Some(Instant::now());
        info!("sysfs GPIO initialized at {}", self.root.display());
        Ok(())
    }

    fn configure_pin(&mut self, pin: Pin, mode: PinMode) -> Result<(), GpioError> {
        let dir = self.pin_dir(pin)?;
        let direction = match mode {
            PinMode::Input => "in",
            PinMode::Output => "out",
        };
        fs::write(dir.join("direction"), direction).map_err(|e| Self::io_err(pin, "direction", e))
    }

    fn set_pull(&mut self, pin: Pin, pull: Pull) -> Result<(), GpioError> {
        self.pin_dir(pin)?;
        match pull {
            Pull::Off => Ok(()),
            Pull::Up | Pull::Down => Err(GpioError::Unsupported(format!(
                "pull {pull:?} on {pin}: sysfs has no bias control"
            ))),
        }
    }

    fn write(&mut self, pin: Pin, level: Level) -> Result<(), GpioError> {
        let dir = self.pin_dir(pin)?;
        let value = if level.is_high() { "1" } else { "0" };
        fs::write(dir.join("value"), value).map_err(|e| Self::io_err(pin, "value", e))
    }

    fn read(&mut self, pin: Pin) -> Result<Level, GpioError> {
        let dir = self.pin_dir(pin)?;
        let raw = fs::read_to_string(dir.join("value")).map_err(|e| Self::io_err(pin, "value", e))?;
        match raw.trim() {
            "0" => Ok(Level::Low),
            "1" => Ok(Level::High),
            other => Err(Self::io_err(pin, "value", format!("unexpected {other:?}"))),
        }
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(u64::from(ms)));
    }

    fn delay_us(&mut self, us: u32) {
        std::thread::sleep(Duration::from_micros(u64::from(us)));
    }

    fn millis(&mut self) -> u32 {
        // Truncation is the wrap.
        self.start.map_or(0, |s| s.elapsed().as_millis() as u32)
    }
}

/// Factory function to create a sysfs driver instance.
pub fn create_driver(config: &ReflexConfig) -> Box<dyn GpioDriver> {
    Box::new(SysfsGpio::new(&config.sysfs))
}
