// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Monotonic instants and durations.
//!
//! [`TimePoint`] is a point on the host's monotonic clock, expressed in
//! nanoseconds since an arbitrary, connection-independent epoch.
//! [`TimeDelta`] is a span of the same clock. Neither type carries any
//! wall-clock or timezone meaning; they exist so that scheduling math never
//! mixes instants with durations by accident.
//!
//! Arithmetic that can overflow is exposed in checked and saturating forms.
//! The plain operators are provided for the common cases and panic on
//! overflow in debug builds like the underlying integers do.

use core::fmt;
use core::ops::{Add, AddAssign, Sub};

const NANOS_PER_MICRO: u64 = 1_000;
const NANOS_PER_MILLI: u64 = 1_000_000;

/// A point on the monotonic clock, in nanoseconds.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimePoint(pub u64);

impl TimePoint {
    /// The clock epoch.
    pub const ZERO: Self = Self(0);

    /// Returns the raw nanosecond value.
    #[inline]
    #[must_use]
    pub const fn nanos(self) -> u64 {
        self.0
    }

    /// Creates a time point from milliseconds since the epoch.
    #[inline]
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis.saturating_mul(NANOS_PER_MILLI))
    }

    /// Returns the time elapsed since `earlier`, or zero if `earlier` is
    /// later than `self`.
    #[inline]
    #[must_use]
    pub const fn saturating_duration_since(self, earlier: Self) -> TimeDelta {
        TimeDelta(self.0.saturating_sub(earlier.0))
    }

    /// Checked addition of a delta.
    #[inline]
    #[must_use]
    pub const fn checked_add(self, delta: TimeDelta) -> Option<Self> {
        match self.0.checked_add(delta.0) {
            Some(t) => Some(Self(t)),
            None => None,
        }
    }

    /// Checked subtraction of a delta.
    #[inline]
    #[must_use]
    pub const fn checked_sub(self, delta: TimeDelta) -> Option<Self> {
        match self.0.checked_sub(delta.0) {
            Some(t) => Some(Self(t)),
            None => None,
        }
    }

    /// Saturating addition of a delta.
    #[inline]
    #[must_use]
    pub const fn saturating_add(self, delta: TimeDelta) -> Self {
        Self(self.0.saturating_add(delta.0))
    }

    /// Returns the smallest `self + k * step` (with `k >= 1`) that is
    /// strictly after `floor`.
    ///
    /// If `self` is already after `floor`, a single step is still taken.
    /// A zero `step` is treated as one nanosecond so the result always makes
    /// forward progress.
    #[must_use]
    pub const fn step_past(self, floor: Self, step: TimeDelta) -> Self {
        let step = if step.0 == 0 { 1 } else { step.0 };
        if self.0 > floor.0 {
            return Self(self.0.saturating_add(step));
        }
        let steps = (floor.0 - self.0) / step + 1;
        Self(self.0.saturating_add(steps.saturating_mul(step)))
    }
}

impl Add<TimeDelta> for TimePoint {
    type Output = Self;

    #[inline]
    fn add(self, rhs: TimeDelta) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign<TimeDelta> for TimePoint {
    #[inline]
    fn add_assign(&mut self, rhs: TimeDelta) {
        self.0 += rhs.0;
    }
}

impl Sub<TimeDelta> for TimePoint {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: TimeDelta) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Sub for TimePoint {
    type Output = TimeDelta;

    #[inline]
    fn sub(self, rhs: Self) -> TimeDelta {
        TimeDelta(self.0 - rhs.0)
    }
}

impl fmt::Debug for TimePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimePoint({}ns)", self.0)
    }
}

/// A span of monotonic time, in nanoseconds.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimeDelta(pub u64);

impl TimeDelta {
    /// A zero-length delta.
    pub const ZERO: Self = Self(0);

    /// Returns the raw nanosecond value.
    #[inline]
    #[must_use]
    pub const fn nanos(self) -> u64 {
        self.0
    }

    /// Creates a delta from microseconds.
    #[inline]
    #[must_use]
    pub const fn from_micros(micros: u64) -> Self {
        Self(micros.saturating_mul(NANOS_PER_MICRO))
    }

    /// Creates a delta from milliseconds.
    #[inline]
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis.saturating_mul(NANOS_PER_MILLI))
    }

    /// Returns the delta in (fractional) milliseconds.
    #[inline]
    #[must_use]
    pub fn as_millis_f64(self) -> f64 {
        self.0 as f64 / NANOS_PER_MILLI as f64
    }

    /// Saturating addition.
    #[inline]
    #[must_use]
    pub const fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    /// Saturating subtraction.
    #[inline]
    #[must_use]
    pub const fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// Returns `true` for a zero-length delta.
    #[inline]
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl Add for TimeDelta {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for TimeDelta {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl fmt::Debug for TimeDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimeDelta({}ns)", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_constructors() {
        assert_eq!(TimeDelta::from_millis(16).nanos(), 16_000_000);
        assert_eq!(TimeDelta::from_micros(250).nanos(), 250_000);
        assert_eq!(TimePoint::from_millis(3), TimePoint(3_000_000));
        assert!((TimeDelta::from_micros(16_500).as_millis_f64() - 16.5).abs() < 1e-9);
    }

    #[test]
    fn point_delta_ops() {
        let t = TimePoint(1000);
        let d = TimeDelta(200);
        assert_eq!((t + d).nanos(), 1200);
        assert_eq!((t - d).nanos(), 800);
        assert_eq!(TimePoint(1500) - t, TimeDelta(500));
        assert_eq!(t.saturating_duration_since(TimePoint(1500)), TimeDelta::ZERO);
        assert_eq!(t.checked_sub(TimeDelta(2000)), None);
        assert_eq!(TimePoint(u64::MAX).checked_add(TimeDelta(1)), None);
    }

    #[test]
    fn step_past_lands_strictly_after_floor() {
        let v = TimeDelta(16);
        // Behind the floor: jump by whole steps.
        assert_eq!(TimePoint(16).step_past(TimePoint(16), v), TimePoint(32));
        assert_eq!(TimePoint(0).step_past(TimePoint(40), v), TimePoint(48));
        // Exactly on a multiple of the floor.
        assert_eq!(TimePoint(0).step_past(TimePoint(32), v), TimePoint(48));
        // Already past the floor: one step.
        assert_eq!(TimePoint(50).step_past(TimePoint(40), v), TimePoint(66));
    }

    #[test]
    fn step_past_with_zero_step_still_advances() {
        assert_eq!(
            TimePoint(10).step_past(TimePoint(12), TimeDelta::ZERO),
            TimePoint(13)
        );
    }
}
