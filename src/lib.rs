//! A tagged-time discrete-event reactor scheduler.
//!
//! This crate is a thin assembly of two lower-level crates:
//!
//! - [`reactor_core`] — the `Instant`/`Interval` time vocabulary.
//! - [`reactor_runtime`] — the event loop, priority queues, `schedule`
//!   primitive and clock synchronisation.
//!
//! Building the static trigger/reaction graph that a [`reactor_runtime::ReactorProgram`]
//! hands the scheduler is out of scope for this crate; see `demos/` for
//! hand-written examples.
//!
//! The `runner` feature (on by default) additionally provides [`runner`],
//! the command-line front end that parses `--fast`/`--stop`/`--wait` with
//! the same semantics as the reference implementation's `process_args`
//! (CLI parsing itself is an out-of-scope external collaborator per the
//! spec; see `DESIGN.md`).
#![doc = document_features::document_features!()]

pub use reactor_core as core;
pub use reactor_runtime as runtime;

#[cfg(feature = "runner")]
pub mod runner;
