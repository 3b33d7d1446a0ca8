//! Error type of the reaction timer.

use reflex_common::config::ConfigError;
use reflex_common::gpio::GpioError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimerError {
    /// The GPIO backend could not be acquired. No pin was touched.
    #[error("GPIO setup failed: {0}")]
    Init(#[source] GpioError),

    /// Pin I/O failed after initialization.
    #[error(transparent)]
    Gpio(#[from] GpioError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
