//! Integration test: interrupt handling and safe-state cleanup.

use super::{board, ready_timer};
use reflex_common::config::ReflexConfig;
use reflex_common::gpio::{Level, PinMode};
use reflex_timer::segment::BLANK;
use reflex_timer::{CycleOutcome, Phase, Reaction, ReactionTimer, RunFlag, TimerError};

fn assert_safe_state(timer: &ReactionTimer<reflex_timer::drivers::simulation::SimulatedGpio>) {
    let config = ReflexConfig::default();
    let io = timer.driver().io();
    assert_eq!(io.displayed(), Some(BLANK));
    assert_eq!(io.pin_state(config.pins.led).level, Level::Low);
    for pin in config.pins.all() {
        assert_eq!(io.pin_state(pin).mode, PinMode::Input, "{pin} still driven");
    }
}

#[test]
fn interrupt_while_measuring_exits_within_one_poll() {
    let config = ReflexConfig::default();
    let mut timer = ready_timer(board(&config), &config);
    let run = timer.run_flag();
    // LED lights at ~3000 ms; nobody presses.
    timer.driver_mut().schedule_stop(4_000, run);

    let mut reported = 0;
    let cycles = timer.run(|_| reported += 1).unwrap();

    assert_eq!(cycles, 0);
    assert_eq!(reported, 0);
    assert_eq!(timer.phase(), Phase::Stopped);
    let exited_at = timer.driver().now_ms();
    assert!(
        (4_000..=4_000 + u64::from(config.timing.poll_interval_ms)).contains(&exited_at),
        "exited at {exited_at} ms"
    );
    // LED dropped when the measurement was abandoned.
    assert_eq!(
        timer.driver().io().pin_state(config.pins.led).level,
        Level::Low
    );

    timer.shutdown().unwrap();
    assert_safe_state(&timer);
}

#[test]
fn interrupt_during_countdown_never_arms() {
    let config = ReflexConfig::default();
    let mut timer = ready_timer(board(&config), &config);
    let run = timer.run_flag();
    timer.driver_mut().schedule_stop(2_500, run);

    let outcome = timer.run_cycle(&mut |_: &Reaction| {}).unwrap();
    assert_eq!(outcome, CycleOutcome::Interrupted);

    let io = timer.driver().io();
    assert!(!io.frames().iter().any(|f| f.byte == 0xC0));
    assert!(
        !io.events()
            .iter()
            .any(|e| e.pin == config.pins.led && e.level == Level::High)
    );
    // The dwell in progress is not cut short.
    assert!(timer.driver().now_ms() >= 3_000);
}

#[test]
fn interrupt_during_rest_finishes_rest_then_stops() {
    let config = ReflexConfig::default();
    let sim = board(&config).with_linked_input(super::operator(&config, 200));
    let mut timer = ready_timer(sim, &config);
    let run = timer.run_flag();
    timer.driver_mut().schedule_stop(4_000, run);

    let cycles = timer.run(|_| {}).unwrap();
    assert_eq!(cycles, 1);
    assert!(timer.driver().now_ms() >= 3_200 + 3_000);
    // No second countdown started.
    assert_eq!(timer.driver().io().frames().len(), 4);
}

#[test]
fn flag_cleared_before_loop_runs_nothing() {
    let config = ReflexConfig::default();
    let mut timer = ready_timer(board(&config), &config);
    timer.run_flag().stop();

    assert_eq!(timer.run(|_| {}).unwrap(), 0);
    assert!(timer.driver().io().frames().is_empty());
    assert_eq!(timer.phase(), Phase::Stopped);
}

#[test]
fn repeated_interrupts_keep_flag_stopped() {
    let run = RunFlag::new();
    assert!(run.stop());
    assert!(!run.stop());
    assert!(!run.is_running());
}

#[test]
fn cleanup_twice_is_same_as_once() {
    let config = ReflexConfig::default();
    let mut once = ready_timer(board(&config), &config);
    once.shutdown().unwrap();

    let mut twice = ready_timer(board(&config), &config);
    twice.shutdown().unwrap();
    assert!(twice.shutdown().is_ok());

    assert_eq!(
        once.driver().io().pin_states(),
        twice.driver().io().pin_states()
    );
    assert_safe_state(&twice);
}

#[test]
fn init_failure_touches_no_pin() {
    let config = ReflexConfig::default();
    let sim = board(&config).failing_init("/sys/class/gpio/export missing");
    let mut timer = ReactionTimer::new(sim, &config, RunFlag::new());

    let err = timer.init().unwrap_err();
    assert!(matches!(err, TimerError::Init(_)));
    assert!(err.to_string().starts_with("GPIO setup failed"));
    assert!(timer.driver().io().events().is_empty());
    assert!(timer.driver().io().pin_states().is_empty());
}
