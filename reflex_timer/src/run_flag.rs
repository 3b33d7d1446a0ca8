//! Process-wide run flag.
//!
//! A one-way cancellation token shared between the control loop and the
//! interrupt handler. It starts out running and can only ever be stopped;
//! there is no operation that sets it running again.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Terminal run flag. Clones share the same underlying state.
#[derive(Debug, Clone)]
pub struct RunFlag {
    running: Arc<AtomicBool>,
}

impl RunFlag {
    /// Create a flag in the running state.
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Whether the loop should keep going.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Request shutdown. Returns `true` for the call that actually
    /// cleared the flag, `false` if it was already stopped.
    pub fn stop(&self) -> bool {
        self.running.swap(false, Ordering::SeqCst)
    }
}

impl Default for RunFlag {
    fn default() -> Self {
        Self::new()
    }
}
