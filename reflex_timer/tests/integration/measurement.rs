//! Integration test: reaction measurement, debounce and clock wrap.

use super::{board, operator, ready_timer};
use reflex_common::config::ReflexConfig;
use reflex_common::gpio::{GpioDriver, Level, PinMode};
use reflex_timer::drivers::simulation;
use reflex_timer::{CycleOutcome, DriverRegistry, Phase, Reaction, ReactionTimer, RunFlag};

fn fine_polling() -> ReflexConfig {
    let mut config = ReflexConfig::default();
    config.timing.poll_interval_ms = 1;
    config
}

fn measure_once(timer: &mut ReactionTimer<simulation::SimulatedGpio>) -> Reaction {
    let mut reported = Vec::new();
    let outcome = timer
        .run_cycle(&mut |r: &Reaction| reported.push(*r))
        .unwrap();
    let CycleOutcome::Measured(reaction) = outcome else {
        panic!("cycle interrupted");
    };
    assert_eq!(reported, vec![reaction]);
    reaction
}

#[test]
fn press_237ms_after_led_reports_237() {
    let config = fine_polling();
    let sim = board(&config).with_linked_input(operator(&config, 237));
    let mut timer = ready_timer(sim, &config);

    let reaction = measure_once(&mut timer);
    assert_eq!(reaction.elapsed_ms(), 237);
    assert_eq!(reaction.to_string(), "Reaction time of 237");
}

#[test]
fn coarse_polling_rounds_up_to_next_poll() {
    let config = ReflexConfig::default();
    let sim = board(&config).with_linked_input(operator(&config, 237));
    let mut timer = ready_timer(sim, &config);

    let elapsed = measure_once(&mut timer).elapsed_ms();
    assert!((237..247).contains(&elapsed), "elapsed {elapsed}");
}

#[test]
fn led_off_and_rest_after_report() {
    let config = fine_polling();
    let sim = board(&config).with_linked_input(operator(&config, 237));
    let mut timer = ready_timer(sim, &config);
    measure_once(&mut timer);

    let led = config.pins.led;
    assert_eq!(timer.driver().io().pin_state(led).level, Level::Low);
    assert_eq!(timer.phase(), Phase::Resting);
    // Countdown, reaction, then the full rest period.
    assert!(timer.driver().now_ms() >= 3_000 + 237 + 3_000);
    assert_eq!(timer.cycles(), 1);
}

#[test]
fn button_held_through_arming_reports_zero() {
    let config = ReflexConfig::default();
    let mut timer = ready_timer(board(&config), &config);
    timer
        .driver_mut()
        .set_input(config.pins.button, config.button.pressed_level);

    let reaction = measure_once(&mut timer);
    assert_eq!(reaction.elapsed_ms(), 0);
}

#[test]
fn held_button_retriggers_once_per_window() {
    use reflex_timer::button::{ButtonEvent, DebouncedButton};

    let config = ReflexConfig::default();
    let mut sim = board(&config);
    sim.init().unwrap();
    sim.configure_pin(config.pins.button, PinMode::Input)
        .unwrap();
    sim.set_input(config.pins.button, Level::Low);
    sim.delay_ms(1_000);

    let mut button = DebouncedButton::new(config.pins.button, &config.button, &config.timing);
    let mut accepted = Vec::new();
    for _ in 0..20 {
        if let ButtonEvent::Pressed { at_ms } = button.poll(&mut sim).unwrap() {
            accepted.push(at_ms);
        }
        sim.delay_ms(10);
    }
    assert_eq!(accepted, vec![1_000, 1_060, 1_120, 1_180]);
}

#[test]
fn reaction_across_millis_wrap() {
    let config = fine_polling();
    // millis() wraps 100 ms after the LED lights.
    let sim = board(&config)
        .with_epoch_ms(u32::MAX - 3_100)
        .with_linked_input(operator(&config, 237));
    let mut timer = ready_timer(sim, &config);

    let reaction = measure_once(&mut timer);
    assert!(reaction.end_ms < reaction.start_ms);
    assert_eq!(reaction.elapsed_ms(), 237);
}

#[test]
fn run_loop_measures_until_stopped() {
    let mut config = ReflexConfig::default();
    config.simulation.press_after_ms = 200;
    config.simulation.virtual_time = true;

    let mut sim = simulation::build(&config);
    let run = RunFlag::new();
    // Second cycle's rest period.
    sim.schedule_stop(12_000, run.clone());

    let mut timer = ReactionTimer::new(sim, &config, run);
    timer.init().unwrap();
    timer.setup().unwrap();

    let mut lines = Vec::new();
    let cycles = timer.run(|r| lines.push(r.to_string())).unwrap();

    assert_eq!(cycles, 2);
    assert_eq!(lines.len(), 2);
    for line in &lines {
        let ms: u32 = line
            .strip_prefix("Reaction time of ")
            .and_then(|n| n.parse().ok())
            .unwrap_or_else(|| panic!("bad line {line:?}"));
        assert!((200..210).contains(&ms), "{line}");
    }
    assert_eq!(timer.phase(), Phase::Stopped);
}

#[test]
fn registry_driver_runs_the_loop() {
    let mut config = ReflexConfig::default();
    config.simulation.virtual_time = true;
    config.simulation.press_after_ms = 150;

    let registry = DriverRegistry::with_builtin_drivers();
    let driver = registry.create_driver("simulation", &config).unwrap();
    let run = RunFlag::new();
    let mut timer = ReactionTimer::new(driver, &config, run.clone());
    timer.init().unwrap();
    timer.setup().unwrap();

    let mut seen = Vec::new();
    let outcome = timer
        .run_cycle(&mut |r: &Reaction| {
            seen.push(r.elapsed_ms());
            run.stop();
        })
        .unwrap();

    assert!(matches!(outcome, CycleOutcome::Measured(_)));
    assert_eq!(seen.len(), 1);
    // Stop during reporting skips the rest period.
    assert_ne!(timer.phase(), Phase::Resting);
    assert_eq!(timer.run(|_| {}).unwrap(), 1);
}

#[test]
fn unknown_driver_is_rejected() {
    let registry = DriverRegistry::with_builtin_drivers();
    let err = registry
        .create_driver("gpiomem", &ReflexConfig::default())
        .err()
        .map(|e| e.to_string());
    assert!(err.is_some_and(|e| e.contains("gpiomem")));
}

#[test]
fn other_pins_untouched_by_cycle() {
    let config = fine_polling();
    let sim = board(&config).with_linked_input(operator(&config, 100));
    let mut timer = ready_timer(sim, &config);
    measure_once(&mut timer);

    let owned = config.pins.all();
    for event in timer.driver().io().events() {
        assert!(owned.contains(&event.pin), "unexpected write to {}", event.pin);
    }
}
