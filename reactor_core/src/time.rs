use std::{fmt, time::Duration};

/// A point in logical or physical time, expressed as nanoseconds since the
/// epoch established when the scheduler is initialized.
///
/// A negative value is the [`Instant::NEVER`] sentinel meaning "not set".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Instant(i64);

impl Instant {
    /// Sentinel for "not set".
    pub const NEVER: Self = Self(-1);

    /// The largest representable instant; used to mean "wait forever".
    pub const MAX: Self = Self(i64::MAX);

    pub const fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    pub const fn as_nanos(self) -> i64 {
        self.0
    }

    pub fn is_set(self) -> bool {
        self.0 >= 0
    }

    /// `self + interval`, saturating at the representable bounds instead of overflowing.
    pub fn saturating_add(self, interval: Interval) -> Self {
        Self(self.0.saturating_add(interval.0))
    }

    /// `self + interval`, returning `None` on overflow.
    pub fn checked_add(self, interval: Interval) -> Option<Self> {
        self.0.checked_add(interval.0).map(Self)
    }

    /// The interval elapsed since `earlier`. May be negative if `earlier` is
    /// actually later than `self`.
    pub fn duration_since(self, earlier: Self) -> Interval {
        Interval(self.0.saturating_sub(earlier.0))
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_set() {
            write!(f, "NEVER")
        } else {
            write!(f, "{}ns", self.0)
        }
    }
}

impl std::ops::Add<Interval> for Instant {
    type Output = Instant;

    fn add(self, rhs: Interval) -> Instant {
        Instant(self.0 + rhs.0)
    }
}

impl std::ops::Sub<Instant> for Instant {
    type Output = Interval;

    fn sub(self, rhs: Instant) -> Interval {
        Interval(self.0 - rhs.0)
    }
}

/// A nanosecond duration. Unlike [`std::time::Duration`] this may be
/// negative, which is required by the internal `__schedule` primitive
/// (see the crate-level documentation of the scheduler).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Interval(i64);

impl Interval {
    pub const ZERO: Self = Self(0);

    pub const fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    pub const fn as_nanos(self) -> i64 {
        self.0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ns", self.0)
    }
}

impl From<Duration> for Interval {
    fn from(d: Duration) -> Self {
        Self(d.as_nanos().try_into().expect("duration too large to represent as a nanosecond Interval"))
    }
}

/// Fallible conversion back to [`std::time::Duration`]; fails for negative intervals,
/// which have no `Duration` representation.
impl TryFrom<Interval> for Duration {
    type Error = NegativeIntervalError;

    fn try_from(interval: Interval) -> Result<Self, Self::Error> {
        if interval.0 < 0 {
            Err(NegativeIntervalError(interval))
        } else {
            Ok(Duration::from_nanos(interval.0 as u64))
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("interval {0} is negative and has no Duration representation")]
pub struct NegativeIntervalError(Interval);

impl std::ops::Add for Interval {
    type Output = Interval;

    fn add(self, rhs: Interval) -> Interval {
        Interval(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Interval {
    type Output = Interval;

    fn sub(self, rhs: Interval) -> Interval {
        Interval(self.0 - rhs.0)
    }
}

impl std::ops::Neg for Interval {
    type Output = Interval;

    fn neg(self) -> Interval {
        Interval(-self.0)
    }
}

impl std::ops::Mul<i64> for Interval {
    type Output = Interval;

    fn mul(self, rhs: i64) -> Interval {
        Interval(self.0 * rhs)
    }
}
