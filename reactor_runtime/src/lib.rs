//! Tagged-time discrete-event scheduler.
//!
//! This crate implements the core loop of a Lingua-Franca-style reactor
//! runtime: a statically built trigger/reaction graph ([`trigger`]), a
//! min-heap event queue ([`pqueue`], [`event`]), a deterministic,
//! deduplicated reaction queue, and the `next()`/`wait_until()` loop that
//! ties logical time to physical time ([`scheduler`]).
//!
//! What it does not do is generate the trigger/reaction graph from a
//! higher-level reactor description — that's the job of whatever
//! implements [`ReactorProgram`], built by hand in this repository's
//! `demos/` crate.

mod clock;
mod config;
mod context;
mod error;
mod event;
mod pqueue;
mod program;
mod schedule;
mod scheduler;
mod trigger;

pub use clock::{Clock, SystemClock};
pub use config::Config;
pub use context::{ReactionContext, ReactionResult};
pub use error::RuntimeError;
pub use event::{Event, EventPool};
pub use pqueue::{Prioritized, PriorityQueue};
pub use program::ReactorProgram;
pub use scheduler::{AsyncSchedule, AsyncSender, Scheduler};
pub use trigger::{
    OutputSlot, ReactionDescriptor, ReactionId, TriggerDescriptor, TriggerId, TriggerTable,
    TriggerTableBuilder,
};

pub use reactor_core::{Instant, Interval, NegativeIntervalError};
