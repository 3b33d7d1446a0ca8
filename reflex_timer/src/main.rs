//! # Reflex Timer Binary
//!
//! Reaction-time tester: countdown on a 7-segment display, LED on, measure
//! the time to a button press, print it, repeat until Ctrl-C.
//!
//! # Usage
//!
//! ```bash
//! # Reference wiring, sysfs GPIO, built-in timing
//! reflex_timer
//!
//! # Custom wiring / timing
//! reflex_timer --config /etc/reflex/reflex.toml
//!
//! # No hardware: simulated board with a simulated operator
//! reflex_timer --driver simulation -v
//!
//! # Show the effective configuration
//! reflex_timer --print-config
//! ```

#![deny(warnings)]

use clap::Parser;
use reflex_common::config::{ConfigLoader, LogLevel, ReflexConfig};
use reflex_timer::{Console, DriverRegistry, ReactionTimer, RunFlag, TimerError};
use std::path::PathBuf;
use std::process;
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

/// Reflex - reaction-time tester
#[derive(Parser, Debug)]
#[command(name = "reflex_timer")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Reaction-time tester on a shift-register 7-segment display")]
#[command(long_about = None)]
struct Args {
    /// Path to a TOML configuration file. Built-in defaults when omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// GPIO driver to use ("sysfs" or "simulation").
    #[arg(short, long, default_value = "sysfs")]
    driver: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

fn main() {
    let args = Args::parse();

    let loaded = load_config(&args);
    let log_level = loaded
        .as_ref()
        .map(|c| c.shared.log_level)
        .unwrap_or_default();
    setup_tracing(&args, log_level);

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            error!("FATAL: {e}");
            process::exit(1);
        }
    };

    if args.print_config {
        match toml::to_string_pretty(&config) {
            Ok(text) => print!("{text}"),
            Err(e) => {
                error!("FATAL: cannot render configuration: {e}");
                process::exit(1);
            }
        }
        return;
    }

    if let Err(e) = run(&args, &config) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Reflex shutdown complete");
}

fn run(args: &Args, config: &ReflexConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        "{} v{} starting (driver '{}')",
        config.shared.service_name,
        env!("CARGO_PKG_VERSION"),
        args.driver
    );

    let registry = DriverRegistry::with_builtin_drivers();
    let driver = registry.create_driver(&args.driver, config)?;

    let run_flag = RunFlag::new();
    let mut timer = ReactionTimer::new(driver, config, run_flag.clone());

    // Nothing is claimed yet; no cleanup on failure.
    timer.init()?;

    if let Err(e) = timer.setup() {
        release(&mut timer);
        return Err(e.into());
    }

    let handler_flag = run_flag.clone();
    let handler = ctrlc::set_handler(move || {
        if handler_flag.stop() {
            info!("Received shutdown signal");
        }
    });
    if let Err(e) = handler {
        release(&mut timer);
        return Err(e.into());
    }

    let mut console = Console::new(std::io::stdout());
    if let Err(e) = console.banner() {
        release(&mut timer);
        return Err(e.into());
    }

    let result = timer.run(|reaction| {
        if let Err(e) = console.reaction(reaction) {
            warn!("Cannot print result: {e}");
        }
    });
    if result.is_ok() {
        if let Err(e) = console.stopped() {
            warn!("Cannot print stop message: {e}");
        }
    }
    release(&mut timer);

    result?;
    Ok(())
}

/// Best-effort cleanup; failures are logged, never fatal.
fn release<G: reflex_common::gpio::GpioDriver>(timer: &mut ReactionTimer<G>) {
    if let Err(e) = timer.shutdown() {
        warn!("Cleanup incomplete: {e}");
    }
}

/// Load the configuration file if one was given, defaults otherwise.
fn load_config(args: &Args) -> Result<ReflexConfig, TimerError> {
    let config = match &args.config {
        Some(path) => ReflexConfig::load(path)?,
        None => ReflexConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

/// Setup tracing subscriber based on CLI arguments and configured level.
fn setup_tracing(args: &Args, log_level: LogLevel) {
    let filter = if args.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(log_level.as_directive()))
    };

    // Logs go to stderr; stdout carries the banner and measurements.
    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
