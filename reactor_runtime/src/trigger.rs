//! The statically-allocated trigger/reaction graph.
//!
//! Triggers and reactions are created once, by whatever implements
//! [`crate::ReactorProgram`], and never destroyed for the lifetime of a run.
//! This module only holds the *descriptors*; the mutable per-tag state
//! (which outputs fired this tag) lives in the scheduler, not here.

use std::any::Any;

use reactor_core::Interval;

use crate::context::ReactionContext;

/// Identifies a [`TriggerDescriptor`] within a [`TriggerTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TriggerId(pub(crate) usize);

/// Identifies a [`ReactionDescriptor`] within a [`TriggerTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReactionId(pub(crate) usize);

/// A statically allocated source of events.
#[derive(Debug)]
pub struct TriggerDescriptor {
    /// Default delay added by `schedule`.
    pub offset: Interval,
    /// `0` means one-shot, `>0` means periodic.
    pub period: Interval,
    /// Whether this trigger should be armed automatically at startup (a "timer").
    pub is_timer: bool,
    /// Reactions triggered by this event, in the order they should be
    /// inserted into the reaction queue.
    pub reactions: Vec<ReactionId>,
}

impl TriggerDescriptor {
    pub fn is_periodic(&self) -> bool {
        self.period.is_positive()
    }
}

/// One output slot of a reaction: the set of reactions transitively
/// triggered when this reaction produces this output at a tag.
#[derive(Debug, Default, Clone)]
pub struct OutputSlot {
    pub triggers: Vec<TriggerId>,
}

pub(crate) type ReactionBody = dyn FnMut(&mut dyn Any, &mut ReactionContext<'_>) + Send;

/// A statically allocated reaction body bound to a topological index.
pub struct ReactionDescriptor {
    /// Topological-sort rank; lower runs first within a tag.
    pub index: u32,
    /// Opaque reactor state, passed to `body` on every invocation.
    pub(crate) state: Box<dyn Any + Send>,
    /// The reaction body itself.
    pub(crate) body: Box<ReactionBody>,
    /// `0` means no deadline.
    pub deadline: Interval,
    /// Reactions to run, synchronously and before the body, if the deadline
    /// is violated.
    pub deadline_violation: Option<TriggerId>,
    /// This reaction's output manifest: for each output slot, the
    /// downstream triggers reachable through it.
    pub outputs: Vec<OutputSlot>,
}

impl std::fmt::Debug for ReactionDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReactionDescriptor")
            .field("index", &self.index)
            .field("deadline", &self.deadline)
            .field("deadline_violation", &self.deadline_violation)
            .field("outputs", &self.outputs.len())
            .finish()
    }
}

/// The complete, immutable-after-build trigger/reaction graph.
#[derive(Debug)]
pub struct TriggerTable {
    pub(crate) triggers: Vec<TriggerDescriptor>,
    pub(crate) reactions: Vec<ReactionDescriptor>,
}

impl TriggerTable {
    pub fn trigger(&self, id: TriggerId) -> &TriggerDescriptor {
        &self.triggers[id.0]
    }

    pub fn reaction(&self, id: ReactionId) -> &ReactionDescriptor {
        &self.reactions[id.0]
    }

    pub fn num_reactions(&self) -> usize {
        self.reactions.len()
    }

    /// The triggers flagged as timers, in declaration order.
    pub fn timers(&self) -> impl Iterator<Item = TriggerId> + '_ {
        self.triggers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_timer)
            .map(|(i, _)| TriggerId(i))
    }
}

/// Builds a [`TriggerTable`] by hand. This is the in-scope stand-in for the
/// out-of-scope build-time generator: a real generator would populate the
/// same structures mechanically from a higher-level description.
#[derive(Debug, Default)]
pub struct TriggerTableBuilder {
    triggers: Vec<TriggerDescriptor>,
    reactions: Vec<ReactionDescriptor>,
}

impl TriggerTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new trigger and return its id.
    pub fn add_trigger(&mut self, offset: Interval, period: Interval, is_timer: bool) -> TriggerId {
        let id = TriggerId(self.triggers.len());
        self.triggers.push(TriggerDescriptor {
            offset,
            period,
            is_timer,
            reactions: Vec::new(),
        });
        id
    }

    /// Register a new reaction with opaque state `S` and a body closure.
    pub fn add_reaction<S, F>(&mut self, index: u32, state: S, body: F) -> ReactionId
    where
        S: Any + Send,
        F: FnMut(&mut S, &mut ReactionContext<'_>) + Send + 'static,
    {
        let mut body = body;
        let erased_body = move |state: &mut dyn Any, ctx: &mut ReactionContext<'_>| {
            let state = state
                .downcast_mut::<S>()
                .expect("reaction state type mismatch");
            body(state, ctx);
        };
        let id = ReactionId(self.reactions.len());
        self.reactions.push(ReactionDescriptor {
            index,
            state: Box::new(state),
            body: Box::new(erased_body),
            deadline: Interval::ZERO,
            deadline_violation: None,
            outputs: Vec::new(),
        });
        id
    }

    /// Wire `trigger` so that firing it enqueues `reaction`.
    pub fn bind(&mut self, trigger: TriggerId, reaction: ReactionId) {
        self.triggers[trigger.0].reactions.push(reaction);
    }

    /// Attach a deadline and optional violation-handler trigger to a reaction.
    pub fn set_deadline(
        &mut self,
        reaction: ReactionId,
        deadline: Interval,
        violation: Option<TriggerId>,
    ) {
        self.reactions[reaction.0].deadline = deadline;
        self.reactions[reaction.0].deadline_violation = violation;
    }

    /// Add an output slot to `reaction` whose downstream is `triggers`, and
    /// return the slot's index (passed to [`ReactionContext::set_output`]).
    pub fn add_output(&mut self, reaction: ReactionId, triggers: Vec<TriggerId>) -> usize {
        let slot = self.reactions[reaction.0].outputs.len();
        self.reactions[reaction.0].outputs.push(OutputSlot { triggers });
        slot
    }

    pub fn build(self) -> TriggerTable {
        TriggerTable {
            triggers: self.triggers,
            reactions: self.reactions,
        }
    }
}
