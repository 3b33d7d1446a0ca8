//! Operator-facing output.
//!
//! Everything the operator reads goes through [`Console`]; diagnostics go
//! to the tracing subscriber on stderr. Each line is flushed as written so
//! results appear immediately when stdout is a pipe.

use crate::timer::Reaction;
use std::io::{self, Write};

/// Title line printed once at startup.
pub const BANNER_TITLE: &str = "Test Reaction Time";
/// Instruction line printed under the title.
pub const BANNER_PROMPT: &str = "Press Button when the LED lights up!";
/// Printed once after an interrupt ends the loop.
pub const STOPPED: &str = "Stopped Program";

/// Line writer for the banner, results and stop message.
pub struct Console<W: Write> {
    out: W,
}

impl<W: Write> Console<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn banner(&mut self) -> io::Result<()> {
        self.line(BANNER_TITLE)?;
        self.line(BANNER_PROMPT)
    }

    /// `Reaction time of <ms>`.
    pub fn reaction(&mut self, reaction: &Reaction) -> io::Result<()> {
        self.line(reaction)
    }

    pub fn stopped(&mut self) -> io::Result<()> {
        self.line(STOPPED)
    }

    fn line(&mut self, text: impl std::fmt::Display) -> io::Result<()> {
        writeln!(self.out, "{text}")?;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
