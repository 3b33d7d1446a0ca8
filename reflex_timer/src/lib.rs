//! # Reflex Timer Library
//!
//! Reaction-time tester: counts down on a shift-register driven 7-segment
//! display, lights an LED, and measures the time until a debounced button
//! press.
//!
//! # Module Structure
//!
//! - [`segment`] - Common-anode digit patterns
//! - [`shift_register`] - Bit-serial transmission and latch frames
//! - [`button`] - Time-window debounced button reader
//! - [`timer`] - Countdown / measure / report / rest state machine
//! - [`shutdown`] - Safe-state restoration of every owned line
//! - [`console`] - Banner, result and stop lines for the operator
//! - [`run_flag`] - Terminal run flag shared with the interrupt handler
//! - [`driver_registry`] - Driver factory registration
//! - [`drivers`] - GPIO driver implementations
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                   reflex_timer (single crate)                 │
//! │  ┌──────────┐    ┌─────────────────┐    ┌──────────────────┐  │
//! │  │ RunFlag  │───►│  ReactionTimer  │◄──►│ Driver Registry  │  │
//! │  │ (SIGINT) │    │  (control loop) │    │                  │  │
//! │  └──────────┘    └───────┬─────────┘    └──────────────────┘  │
//! │          ShiftRegister ◄─┼─► DebouncedButton                  │
//! │                          ▼                                    │
//! │                 ┌────────────────┐                            │
//! │                 │  GpioDriver    │ (sysfs / simulation)       │
//! │                 └────────────────┘                            │
//! └───────────────────────────────────────────────────────────────┘
//! ```

pub mod button;
pub mod console;
pub mod driver_registry;
pub mod drivers;
pub mod error;
pub mod run_flag;
pub mod segment;
pub mod shift_register;
pub mod shutdown;
pub mod timer;

// Re-export key types for convenience
pub use crate::console::Console;
pub use crate::driver_registry::DriverRegistry;
pub use crate::error::TimerError;
pub use crate::run_flag::RunFlag;
pub use crate::timer::{CycleOutcome, Phase, Reaction, ReactionTimer};
