//! Last-resort failure containment.
//!
//! Individual native-API failures are recoverable and handled at their
//! call sites. This guard watches for the catastrophic case — errors
//! arriving faster than the extension can plausibly limp along — and
//! escalates to an extension reload once a rolling window overflows.

use std::time::{Duration, Instant};

/// Default threshold: this many errors inside one window forces a reload.
pub const MAX_ERRORS: u32 = 10;
/// Default rolling-window length.
pub const RESET_WINDOW: Duration = Duration::from_secs(60);

/// What the caller should do after recording a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardAction {
    Continue,
    /// Too many failures too fast: ask the runtime to reload.
    Reload,
}

/// Rolling-window error counter.
#[derive(Debug)]
pub struct FailureGuard {
    max_errors: u32,
    window: Duration,
    count: u32,
    window_start: Option<Instant>,
}

impl FailureGuard {
    pub fn new(max_errors: u32, window: Duration) -> Self {
        Self {
            max_errors,
            window,
            count: 0,
            window_start: None,
        }
    }

    /// Records one failure. Returns `Reload` when the rolling window
    /// overflows; the counter resets either way once it fires.
    pub fn record_failure(&mut self) -> GuardAction {
        let now = Instant::now();
        match self.window_start {
            Some(start) if now.duration_since(start) < self.window => {}
            _ => {
                self.window_start = Some(now);
                self.count = 0;
            }
        }
        self.count += 1;
        if self.count >= self.max_errors {
            self.reset();
            GuardAction::Reload
        } else {
            GuardAction::Continue
        }
    }

    pub fn reset(&mut self) {
        self.count = 0;
        self.window_start = None;
    }

    pub fn error_count(&self) -> u32 {
        self.count
    }
}

impl Default for FailureGuard {
    fn default() -> Self {
        Self::new(MAX_ERRORS, RESET_WINDOW)
    }
}
