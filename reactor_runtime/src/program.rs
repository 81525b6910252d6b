//! The in-scope stand-in for the out-of-scope "generator": anything that
//! can hand the scheduler a built [`TriggerTable`] and take part in the two
//! startup hooks the reference implementation runs before the event loop.

use crate::trigger::TriggerTable;

/// A reactor program ready to run.
///
/// A real code generator would produce an implementation of this trait
/// mechanically from a higher-level reactor description; here it is
/// implemented by hand for each program in `demos/`.
pub trait ReactorProgram {
    /// Build the static trigger/reaction graph. Called once, before any
    /// other hook.
    fn build(&mut self) -> TriggerTable;

    /// Arm every timer trigger's first event. Corresponds to
    /// `__start_timers()`: called once, after `build`, before the event
    /// loop starts. The default implementation is supplied by
    /// [`crate::Scheduler::initialize`], which already knows how to walk
    /// `TriggerTable::timers()` — most programs never need to override
    /// this.
    fn start_timers(&mut self) {}

    /// Hook run once per logical tag, before its reactions are dispatched.
    /// Corresponds to `__start_time_step()`. The reference implementation
    /// uses this to clear each trigger's `is_present`/`output_produced`
    /// flags, which in our data model are reset generically by the
    /// scheduler itself (they live in `Scheduler`, not behind an opaque
    /// generator-owned pointer), so the default here is a no-op. Override
    /// only if a program needs additional bookkeeping at the start of a tag.
    fn start_time_step(&mut self) {}
}
