//! Integration test: countdown sequence and armed display.

use super::{board, operator, ready_timer};
use reflex_common::config::ReflexConfig;
use reflex_common::gpio::{BitOrder, Level};
use reflex_timer::segment::{self, BLANK};
use reflex_timer::{CycleOutcome, Phase, Reaction};

#[test]
fn countdown_shows_three_two_one_then_zero() {
    let config = ReflexConfig::default();
    let sim = board(&config).with_linked_input(operator(&config, 300));
    let mut timer = ready_timer(sim, &config);

    let outcome = timer.run_cycle(&mut |_: &Reaction| {}).unwrap();
    assert!(matches!(outcome, CycleOutcome::Measured(_)));

    let frames = timer.driver().io().frames();
    let bytes: Vec<u8> = frames.iter().map(|f| f.byte).collect();
    assert_eq!(bytes, vec![0xB0, 0xA4, 0xF9, 0xC0]);

    // One dwell plus one frame transfer between countdown digits.
    for pair in frames[..3].windows(2) {
        let gap = pair[1].at_us - pair[0].at_us;
        assert!((1_000_000..1_001_000).contains(&gap), "gap {gap}us");
    }
}

#[test]
fn led_lights_only_after_last_dwell() {
    let config = ReflexConfig::default();
    let sim = board(&config).with_linked_input(operator(&config, 300));
    let mut timer = ready_timer(sim, &config);
    timer.run_cycle(&mut |_: &Reaction| {}).unwrap();

    let io = timer.driver().io();
    let last_digit_at = io.frames()[2].at_us;
    let led_on: Vec<u64> = io
        .events()
        .iter()
        .filter(|e| e.pin == config.pins.led && e.level == Level::High)
        .map(|e| e.at_us)
        .collect();

    assert_eq!(led_on.len(), 1);
    assert!(led_on[0] >= last_digit_at + 1_000_000);
    // Armed frame follows the LED, it does not precede it.
    assert!(io.frames()[3].at_us > led_on[0]);
}

#[test]
fn configured_digit_count_is_honored() {
    let mut config = ReflexConfig::default();
    config.timing.countdown_digits = 5;
    config.timing.countdown_dwell_ms = 200;
    let sim = board(&config).with_linked_input(operator(&config, 100));
    let mut timer = ready_timer(sim, &config);
    timer.run_cycle(&mut |_: &Reaction| {}).unwrap();

    let bytes: Vec<u8> = timer.driver().io().frames().iter().map(|f| f.byte).collect();
    let expected: Vec<u8> = [5, 4, 3, 2, 1, 0].into_iter().map(segment::pattern).collect();
    assert_eq!(bytes, expected);
}

#[test]
fn lsb_first_wiring_latches_reversed_patterns() {
    let mut config = ReflexConfig::default();
    config.display.bit_order = BitOrder::LsbFirst;
    let sim = board(&config).with_linked_input(operator(&config, 100));
    let mut timer = ready_timer(sim, &config);
    timer.run_cycle(&mut |_: &Reaction| {}).unwrap();

    // The model shifts toward Q7, so LSB-first wiring latches each
    // pattern bit-reversed.
    let bytes: Vec<u8> = timer.driver().io().frames().iter().map(|f| f.byte).collect();
    let expected: Vec<u8> = [0xB0u8, 0xA4, 0xF9, 0xC0]
        .into_iter()
        .map(u8::reverse_bits)
        .collect();
    assert_eq!(bytes, expected);
}

#[test]
fn setup_leaves_display_blank_and_timer_idle() {
    let config = ReflexConfig::default();
    let timer = ready_timer(board(&config), &config);
    assert_eq!(timer.driver().io().displayed(), Some(BLANK));
    assert_eq!(timer.phase(), Phase::Idle);
    assert_eq!(timer.cycles(), 0);
}
