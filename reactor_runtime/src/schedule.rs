//! The `schedule`/`__schedule` primitive, split out from `scheduler.rs`
//! because the arithmetic deserves its own focused tests.
//!
//! `__schedule(trigger, extra_delay)` computes the event's tag as
//! `current_time + trigger.offset + extra_delay` and inserts it into the
//! event queue. [`crate::scheduler::Scheduler::rearm_if_periodic`] re-arms a
//! periodic timer through this same function with `extra_delay = period -
//! offset`, which cancels back to `tag + period`, rather than re-deriving
//! the `+ offset` term itself.

use reactor_core::Instant;
use reactor_core::Interval;

use crate::scheduler::Scheduler;
use crate::trigger::TriggerId;

impl Scheduler {
    /// Request that `trigger` fire `extra_delay` after its configured
    /// offset, relative to `now`. This is the engine behind both the
    /// public `schedule()` API called from a reaction body (via
    /// [`crate::context::ReactionContext::schedule`]) and the asynchronous
    /// path driven by an [`crate::scheduler::AsyncSender`].
    pub(crate) fn schedule_internal(&mut self, trigger: TriggerId, extra_delay: Interval, now: Instant) {
        let offset = self.table.trigger(trigger).offset;
        let tag = now.saturating_add(offset).saturating_add(extra_delay);
        self.insert_event(tag, trigger);
    }
}
