//! The handle a running reaction uses to talk back to the scheduler.

use reactor_core::{Instant, Interval};

use crate::error::RuntimeError;
use crate::trigger::TriggerId;

/// Passed by `&mut` to every reaction body while it runs.
///
/// A reaction cannot hold a `&mut Scheduler` directly (it lives inside the
/// scheduler's own reaction table), so this context is the narrow interface
/// the scheduler lends it instead: schedule further events, mark an output
/// as produced, or request a clean shutdown.
pub struct ReactionContext<'a> {
    pub(crate) current_time: Instant,
    pub(crate) produced: &'a mut Vec<bool>,
    pub(crate) pending_schedule: &'a mut Vec<(TriggerId, Interval)>,
    pub(crate) stop_requested: &'a mut bool,
}

impl<'a> ReactionContext<'a> {
    /// The tag at which the currently running reaction was invoked.
    pub fn current_time(&self) -> Instant {
        self.current_time
    }

    /// Schedule `trigger` to fire `extra_delay` after its own offset, per
    /// the `__schedule` arithmetic: `current_time + trigger.offset + extra_delay`.
    ///
    /// The event isn't inserted into the event queue immediately: it is
    /// recorded here and applied by the scheduler once the reaction
    /// returns, so that a reaction scheduling several triggers doesn't
    /// observe a half-updated queue mid-body.
    pub fn schedule(&mut self, trigger: TriggerId, extra_delay: Interval) {
        self.pending_schedule.push((trigger, extra_delay));
    }

    /// Shorthand for `schedule(trigger, Interval::ZERO)`.
    pub fn schedule_now(&mut self, trigger: TriggerId) {
        self.schedule(trigger, Interval::ZERO);
    }

    /// Mark output slot `slot` of the running reaction as produced this tag,
    /// so its downstream reactions get enqueued.
    pub fn set_output(&mut self, slot: usize) {
        if slot >= self.produced.len() {
            self.produced.resize(slot + 1, false);
        }
        self.produced[slot] = true;
    }

    pub fn output_is_set(&self, slot: usize) -> bool {
        self.produced.get(slot).copied().unwrap_or(false)
    }

    /// Request that the scheduler stop after completing the current tag.
    pub fn request_stop(&mut self) {
        *self.stop_requested = true;
    }
}

/// Returned by a reaction body that wants to report a failure without
/// aborting the process; the scheduler logs it and continues.
pub type ReactionResult = Result<(), RuntimeError>;
