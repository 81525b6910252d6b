//! Core time types shared by the reactor scheduler.
//!
//! This crate intentionally contains no scheduling logic: it is the
//! leaf-level vocabulary ([`Instant`], [`Interval`]) that the scheduler,
//! the trigger/reaction graph, and the CLI all build on.

mod time;

pub use time::{Instant, Interval, NegativeIntervalError};
