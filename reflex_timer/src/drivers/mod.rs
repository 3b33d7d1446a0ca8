//! GPIO driver implementations.
//!
//! - [`sysfs`] - Linux `/sys/class/gpio` backend for real boards
//! - [`simulation`] - Software pin bank for development and testing
//!
//! # Adding New Drivers
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement the `GpioDriver` trait from `reflex_common::gpio`
//! 3. Register the driver in [`register_all_drivers`]

pub mod simulation;
pub mod sysfs;

use crate::driver_registry::DriverRegistry;

/// Register all built-in drivers.
pub fn register_all_drivers(registry: &mut DriverRegistry) {
    registry.register("sysfs", sysfs::create_driver);
    registry.register("simulation", simulation::create_driver);
}
