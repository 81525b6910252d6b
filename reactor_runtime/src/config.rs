//! Run configuration: the in-scope equivalent of `process_args()`'s global
//! state in the reference implementation.
//!
//! Parsing `--fast`/`--stop`/`--wait` into one of these lives in the
//! `reactor` binary crate's `runner` module, not here.

use reactor_core::Interval;

/// Configuration for a single scheduler run.
///
/// This is intentionally a plain data struct with no parsing logic: CLI
/// parsing (the `-fast`/`-stop`/`-wait` flags) lives in the `reactor`
/// binary crate, which builds one of these and hands it to
/// [`crate::Scheduler::new`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Run as fast as possible, ignoring physical time entirely.
    pub fast: bool,
    /// Wait for physical time even when there is nothing left to do but the
    /// logical stop time hasn't arrived (`-wait`). Has no effect unless
    /// `stop_duration` is set.
    pub wait: bool,
    /// Run for this long in logical time, then stop. `None` means run until
    /// the event queue is empty.
    pub stop_duration: Option<Interval>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fast: false,
            wait: false,
            stop_duration: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fast(mut self, fast: bool) -> Self {
        self.fast = fast;
        self
    }

    pub fn wait(mut self, wait: bool) -> Self {
        self.wait = wait;
        self
    }

    pub fn stop_after(mut self, duration: Interval) -> Self {
        self.stop_duration = Some(duration);
        self
    }
}
