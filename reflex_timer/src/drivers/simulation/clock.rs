//! Time source for the simulation driver.
//!
//! `Virtual` advances only when a delay is requested, so tests run in
//! microseconds of wall time while reproducing exact millisecond
//! timelines. `Wall` sleeps for real and is used by the binary.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub enum SimClock {
    /// Deterministic clock, advanced by delays only.
    Virtual { now_us: u64 },
    /// Real time, measured from driver creation.
    Wall { start: Instant },
}

impl SimClock {
    pub fn virtual_clock() -> Self {
        Self::Virtual { now_us: 0 }
    }

    pub fn wall_clock() -> Self {
        Self::Wall {
            start: Instant::now(),
        }
    }

    /// Microseconds since the clock started.
    pub fn now_us(&self) -> u64 {
        match self {
            Self::Virtual { now_us } => *now_us,
            Self::Wall { start } => start.elapsed().as_micros() as u64,
        }
    }

    /// Let `us` microseconds pass.
    pub fn advance(&mut self, us: u64) {
        match self {
            Self::Virtual { now_us } => *now_us += us,
            Self::Wall { .. } => std::thread::sleep(Duration::from_micros(us)),
        }
    }
}
