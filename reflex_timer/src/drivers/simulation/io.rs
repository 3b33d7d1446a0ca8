//! Pin bank simulator.
//!
//! The `PinBank` manages:
//! - Per-pin mode, pull resistor and driven level
//! - Externally driven input levels (scripted or set directly)
//! - Linked input reactions (an output edge triggers a delayed input change)
//! - A 74HC595 model attached to the data/clock/latch pins, recording every
//!   clocked bit and every committed (latched) frame
//!
//! Recorded history is unbounded unless a limit is set. With a limit of `n`
//! each record keeps at least its newest `n` entries and never more than
//! `2 * n`.

use reflex_common::gpio::{Level, Pin, PinMode, Pull};
use std::collections::{BTreeMap, VecDeque};
use tracing::{debug, trace};

/// Observable state of one pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PinState {
    pub mode: PinMode,
    pub pull: Pull,
    /// Last level written to the pin's output latch.
    pub level: Level,
}

/// One `write()` as seen on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinEvent {
    pub at_us: u64,
    pub pin: Pin,
    pub level: Level,
}

/// A byte transferred to the register outputs on a latch rising edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommittedFrame {
    pub at_us: u64,
    pub byte: u8,
}

/// Delayed input reaction to an output edge.
///
/// Models whatever sits on the other side of the board: e.g. an operator
/// who presses the button some time after the LED lights up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkedInput {
    /// Output pin whose edge triggers the reaction.
    pub trigger: Pin,
    /// Edge direction (new level of `trigger`).
    pub on: Level,
    /// Input pin that changes.
    pub input: Pin,
    /// Level the input changes to.
    pub to: Level,
    /// Reaction delay [ms].
    pub delay_ms: u32,
}

/// Pending input change queued by a linked reaction or a script.
#[derive(Debug, Clone, Copy)]
struct PendingInputChange {
    at_us: u64,
    pin: Pin,
    level: Level,
}

/// Serial-in, parallel-out register model.
#[derive(Debug, Clone)]
struct ShiftRegisterModel {
    data: Pin,
    clock: Pin,
    latch: Pin,
    shift: u8,
    outputs: Option<u8>,
    clocked_bits: Vec<Level>,
    frames: Vec<CommittedFrame>,
}

/// Simulated GPIO pin bank.
#[derive(Debug, Clone, Default)]
pub struct PinBank {
    pins: BTreeMap<Pin, PinState>,
    /// Levels driven onto input pins from outside the chip.
    external: BTreeMap<Pin, Level>,
    events: Vec<PinEvent>,
    linked: Vec<LinkedInput>,
    pending: VecDeque<PendingInputChange>,
    register: Option<ShiftRegisterModel>,
    history_limit: Option<usize>,
}

/// Drop the oldest entries once `record` holds twice the limit.
fn trim<T>(record: &mut Vec<T>, limit: Option<usize>) {
    if let Some(limit) = limit {
        if record.len() > limit.saturating_mul(2) {
            record.drain(..record.len() - limit);
        }
    }
}

impl PinBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a shift register to the given lines.
    pub fn attach_shift_register(&mut self, data: Pin, clock: Pin, latch: Pin) {
        self.register = Some(ShiftRegisterModel {
            data,
            clock,
            latch,
            shift: 0,
            outputs: None,
            clocked_bits: Vec::new(),
            frames: Vec::new(),
        });
    }

    /// Cap every history record at `limit` entries (see module docs).
    pub fn set_history_limit(&mut self, limit: usize) {
        self.history_limit = Some(limit);
    }

    pub fn add_linked_input(&mut self, link: LinkedInput) {
        self.linked.push(link);
    }

    /// Drive `pin` from outside the chip, effective immediately.
    pub fn set_external(&mut self, pin: Pin, level: Level) {
        self.external.insert(pin, level);
    }

    /// Drive `pin` from outside the chip at `at_us`.
    pub fn schedule_external(&mut self, at_us: u64, pin: Pin, level: Level) {
        let change = PendingInputChange { at_us, pin, level };
        // Keep the queue ordered by time; scripts may be added out of order.
        let idx = self.pending.partition_point(|p| p.at_us <= at_us);
        self.pending.insert(idx, change);
    }

    pub fn configure(&mut self, pin: Pin, mode: PinMode) {
        self.pins.entry(pin).or_default().mode = mode;
    }

    pub fn set_pull(&mut self, pin: Pin, pull: Pull) {
        self.pins.entry(pin).or_default().pull = pull;
    }

    /// Write `level` to the output latch of `pin` at `now_us`.
    pub fn write(&mut self, pin: Pin, level: Level, now_us: u64) {
        let state = self.pins.entry(pin).or_default();
        let prev = state.level;
        let mode = state.mode;
        state.level = level;

        self.events.push(PinEvent {
            at_us: now_us,
            pin,
            level,
        });
        trim(&mut self.events, self.history_limit);

        if mode != PinMode::Output || prev == level {
            return;
        }

        self.on_output_edge(pin, level, now_us);
    }

    /// Level seen when sampling `pin` at `now_us`.
    pub fn read(&mut self, pin: Pin, now_us: u64) -> Level {
        self.process_pending(now_us);
        let state = self.pins.get(&pin).copied().unwrap_or_default();
        if state.mode == PinMode::Output {
            return state.level;
        }
        if let Some(level) = self.external.get(&pin) {
            return *level;
        }
        match state.pull {
            Pull::Up => Level::High,
            Pull::Down | Pull::Off => Level::Low,
        }
    }

    /// Apply every pending input change due at or before `now_us`.
    pub fn process_pending(&mut self, now_us: u64) {
        while let Some(front) = self.pending.front() {
            if front.at_us > now_us {
                break;
            }
            if let Some(change) = self.pending.pop_front() {
                trace!(
                    "t={}us external {} -> {}",
                    change.at_us, change.pin, change.level
                );
                self.external.insert(change.pin, change.level);
            }
        }
    }

    fn on_output_edge(&mut self, pin: Pin, level: Level, now_us: u64) {
        for link in self.linked.clone() {
            if link.trigger == pin && link.on == level {
                let at_us = now_us + u64::from(link.delay_ms) * 1000;
                debug!(
                    "{} {} -> queued {} = {} in {}ms",
                    pin, level, link.input, link.to, link.delay_ms
                );
                self.schedule_external(at_us, link.input, link.to);
            }
        }

        let Some(reg) = self.register.as_mut() else {
            return;
        };
        if level != Level::High {
            return;
        }
        if pin == reg.clock {
            let bit = self.pins.get(&reg.data).map(|s| s.level).unwrap_or_default();
            reg.shift = (reg.shift << 1) | u8::from(bit.is_high());
            reg.clocked_bits.push(bit);
            trim(&mut reg.clocked_bits, self.history_limit);
        } else if pin == reg.latch {
            reg.outputs = Some(reg.shift);
            reg.frames.push(CommittedFrame {
                at_us: now_us,
                byte: reg.shift,
            });
            trim(&mut reg.frames, self.history_limit);
            trace!("t={}us latched 0x{:02X}", now_us, reg.shift);
        }
    }

    /// State of `pin`, default if never touched.
    pub fn pin_state(&self, pin: Pin) -> PinState {
        self.pins.get(&pin).copied().unwrap_or_default()
    }

    /// Snapshot of every touched pin.
    pub fn pin_states(&self) -> BTreeMap<Pin, PinState> {
        self.pins.clone()
    }

    pub fn events(&self) -> &[PinEvent] {
        &self.events
    }

    /// Data line level at every clock rising edge, oldest first.
    pub fn clocked_bits(&self) -> &[Level] {
        self.register
            .as_ref()
            .map(|r| r.clocked_bits.as_slice())
            .unwrap_or(&[])
    }

    pub fn frames(&self) -> &[CommittedFrame] {
        self.register
            .as_ref()
            .map(|r| r.frames.as_slice())
            .unwrap_or(&[])
    }

    /// Byte currently shown on the register outputs.
    pub fn displayed(&self) -> Option<u8> {
        self.register.as_ref().and_then(|r| r.outputs)
    }

    /// Forget recorded events, bits and frames (pin states are kept).
    pub fn clear_history(&mut self) {
        self.events.clear();
        if let Some(reg) = self.register.as_mut() {
            reg.clocked_bits.clear();
            reg.frames.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DS: Pin = Pin(0);
    const SHCP: Pin = Pin(2);
    const STCP: Pin = Pin(3);

    fn bank_with_register() -> PinBank {
        let mut bank = PinBank::new();
        bank.attach_shift_register(DS, SHCP, STCP);
        for pin in [DS, SHCP, STCP] {
            bank.configure(pin, PinMode::Output);
        }
        bank
    }

    fn clock_in(bank: &mut PinBank, bits: &[Level]) {
        for &bit in bits {
            bank.write(DS, bit, 0);
            bank.write(SHCP, Level::High, 0);
            bank.write(SHCP, Level::Low, 0);
        }
    }

    #[test]
    fn register_latches_on_rising_edge_only() {
        let mut bank = bank_with_register();
        let bits: Vec<Level> = (0..8).map(|i| Level::of_bit(0xB0, 7 - i)).collect();
        clock_in(&mut bank, &bits);
        assert_eq!(bank.displayed(), None);

        bank.write(STCP, Level::High, 5);
        assert_eq!(bank.displayed(), Some(0xB0));
        bank.write(STCP, Level::Low, 6);
        assert_eq!(bank.frames().len(), 1);
        assert_eq!(bank.frames()[0].at_us, 5);
    }

    #[test]
    fn clock_on_input_pin_is_ignored() {
        let mut bank = bank_with_register();
        bank.configure(SHCP, PinMode::Input);
        clock_in(&mut bank, &[Level::High; 8]);
        assert!(bank.clocked_bits().is_empty());
        assert_eq!(bank.events().len(), 24);
    }

    #[test]
    fn input_follows_pull_then_external() {
        let mut bank = PinBank::new();
        let button = Pin(6);
        bank.configure(button, PinMode::Input);
        assert_eq!(bank.read(button, 0), Level::Low);
        bank.set_pull(button, Pull::Up);
        assert_eq!(bank.read(button, 0), Level::High);
        bank.set_external(button, Level::Low);
        assert_eq!(bank.read(button, 0), Level::Low);
    }

    #[test]
    fn scheduled_changes_apply_in_time_order() {
        let mut bank = PinBank::new();
        let button = Pin(6);
        bank.configure(button, PinMode::Input);
        bank.schedule_external(2_000, button, Level::High);
        bank.schedule_external(1_000, button, Level::Low);

        bank.process_pending(999);
        assert_eq!(bank.read(button, 999), Level::Low);
        bank.set_pull(button, Pull::Up);
        assert_eq!(bank.read(button, 999), Level::High);
        assert_eq!(bank.read(button, 1_000), Level::Low);
        assert_eq!(bank.read(button, 2_500), Level::High);
    }

    #[test]
    fn history_limit_keeps_newest_entries() {
        let mut bank = bank_with_register();
        bank.set_history_limit(8);
        for i in 0..100u64 {
            bank.write(DS, Level::from(i % 2 == 0), i);
        }
        assert!(bank.events().len() <= 16);
        assert!(bank.events().len() >= 8);
        assert_eq!(bank.events().last().map(|e| e.at_us), Some(99));

        clock_in(&mut bank, &[Level::High; 40]);
        assert!(bank.clocked_bits().len() <= 16);
    }

    #[test]
    fn history_unbounded_by_default() {
        let mut bank = bank_with_register();
        for i in 0..100u64 {
            bank.write(DS, Level::High, i);
        }
        assert_eq!(bank.events().len(), 100);
    }

    #[test]
    fn linked_input_reacts_to_output_edge() {
        let mut bank = PinBank::new();
        let led = Pin(26);
        let button = Pin(6);
        bank.configure(led, PinMode::Output);
        bank.configure(button, PinMode::Input);
        bank.set_pull(button, Pull::Up);
        bank.add_linked_input(LinkedInput {
            trigger: led,
            on: Level::High,
            input: button,
            to: Level::Low,
            delay_ms: 237,
        });

        bank.write(led, Level::High, 1_000);
        assert_eq!(bank.read(button, 1_000 + 236_999), Level::High);
        assert_eq!(bank.read(button, 1_000 + 237_000), Level::Low);
    }
}
