//! Errors raised by the runtime crate.

/// Failures that can occur while building or running a reactor program.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// The physical clock could not be read.
    #[error("failed to read the system clock: {0}")]
    ClockUnavailable(String),

    /// An internal invariant was violated; this indicates a bug in the
    /// scheduler rather than a user error.
    #[error("internal scheduler invariant violated: {0}")]
    Invariant(String),
}
