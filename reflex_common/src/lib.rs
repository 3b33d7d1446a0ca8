//! Reflex Common Library
//!
//! Shared constants, the GPIO driver contract and configuration loading
//! for the Reflex workspace crates.
//!
//! # Module Structure
//!
//! - [`consts`] - Default pin wiring and timing constants
//! - [`gpio`] - GPIO driver trait, pin types and `GpioError`
//! - [`config`] - Configuration loading traits and types
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use reflex_common::prelude::*;
//!
//! let config = ReflexConfig::default();
//! assert_eq!(config.timing.debounce_ms, DEFAULT_DEBOUNCE_MS);
//! ```

pub mod config;
pub mod consts;
pub mod gpio;
pub mod prelude;
