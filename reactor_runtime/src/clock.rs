//! Abstraction over the physical clock, so tests can run without wall-clock
//! delay (`fast` mode) and so the scheduler doesn't depend on `std::time`
//! directly.

use std::time::SystemTime;

use reactor_core::Instant;

use crate::error::RuntimeError;

/// A source of physical time.
pub trait Clock: Send {
    /// The current physical time, in the same nanosecond epoch the
    /// scheduler was initialized with.
    fn now(&self) -> Result<Instant, RuntimeError>;
}

/// The real wall clock, backed by [`std::time::SystemTime`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Result<Instant, RuntimeError> {
        let nanos = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map_err(|e| RuntimeError::ClockUnavailable(e.to_string()))?
            .as_nanos();
        let nanos: i64 = nanos
            .try_into()
            .map_err(|_| RuntimeError::ClockUnavailable("current time overflows i64 nanos".into()))?;
        Ok(Instant::from_nanos(nanos))
    }
}
