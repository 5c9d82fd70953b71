// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reading and sleeping on a POSIX clock in [`TimePoint`] units.

use cadence_core::time::TimePoint;
use rustix::io::{self, Errno};
use rustix::thread::clock_nanosleep_absolute;
use rustix::time::{ClockId, Timespec, clock_gettime};

const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// A POSIX clock the session's timestamps are taken from.
///
/// Compositors report latch points on a specific clock (usually
/// `CLOCK_MONOTONIC`); every `now` handed to a session must come from that
/// same clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HostClock {
    id: ClockId,
}

impl Default for HostClock {
    fn default() -> Self {
        Self::monotonic()
    }
}

impl HostClock {
    /// `CLOCK_MONOTONIC`.
    #[must_use]
    pub const fn monotonic() -> Self {
        Self::with_id(ClockId::Monotonic)
    }

    /// `CLOCK_BOOTTIME`, which keeps counting across suspend.
    #[must_use]
    pub const fn boottime() -> Self {
        Self::with_id(ClockId::Boottime)
    }

    /// A clock named by the compositor.
    #[must_use]
    pub const fn with_id(id: ClockId) -> Self {
        Self { id }
    }

    /// The underlying clock id.
    #[must_use]
    pub const fn id(self) -> ClockId {
        self.id
    }

    /// Reads the clock.
    #[must_use]
    pub fn now(self) -> TimePoint {
        from_timespec(clock_gettime(self.id))
    }

    /// Blocks until the clock reaches `deadline`, then returns the time read
    /// after waking.
    ///
    /// Returns immediately for deadlines in the past. Interrupted sleeps are
    /// resumed.
    pub fn sleep_until(self, deadline: TimePoint) -> io::Result<TimePoint> {
        let request = to_timespec(deadline);
        loop {
            match clock_nanosleep_absolute(self.id, &request) {
                Ok(()) => return Ok(self.now()),
                Err(Errno::INTR) => {}
                Err(err) => return Err(err),
            }
        }
    }
}

/// Negative times clamp to zero; times past `u64::MAX` nanoseconds saturate.
fn from_timespec(ts: Timespec) -> TimePoint {
    let Ok(secs) = u64::try_from(ts.tv_sec) else {
        return TimePoint::ZERO;
    };
    let nanos = u64::try_from(ts.tv_nsec)
        .unwrap_or(0)
        .min(NANOS_PER_SECOND - 1);
    TimePoint(
        secs.checked_mul(NANOS_PER_SECOND)
            .and_then(|n| n.checked_add(nanos))
            .unwrap_or(u64::MAX),
    )
}

fn to_timespec(t: TimePoint) -> Timespec {
    let nanos = t.nanos();
    Timespec {
        tv_sec: (nanos / NANOS_PER_SECOND).try_into().unwrap_or_default(),
        tv_nsec: (nanos % NANOS_PER_SECOND).try_into().unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::time::TimeDelta;

    #[test]
    fn readings_never_go_backwards() {
        let clock = HostClock::monotonic();
        let first = clock.now();
        let second = clock.now();
        assert!(first > TimePoint::ZERO);
        assert!(second >= first);
        assert_eq!(HostClock::default(), clock);
    }

    #[test]
    fn compositor_named_clock_is_readable() {
        let clock = HostClock::with_id(ClockId::Monotonic);
        assert_eq!(clock.id(), ClockId::Monotonic);
        assert!(clock.now() > TimePoint::ZERO);
    }

    #[test]
    fn sleeping_until_a_past_deadline_returns_at_once() {
        let clock = HostClock::monotonic();
        let before = clock.now();
        let woke = clock.sleep_until(TimePoint::ZERO).unwrap();
        assert!(woke >= before);
    }

    #[test]
    fn sleeping_reaches_the_deadline() {
        let clock = HostClock::monotonic();
        let deadline = clock.now().saturating_add(TimeDelta::from_millis(2));
        let woke = clock.sleep_until(deadline).unwrap();
        assert!(woke >= deadline);
    }

    #[test]
    fn timespec_split_keeps_every_nanosecond() {
        let t = TimePoint(12 * NANOS_PER_SECOND + 345_678_901);
        let ts = to_timespec(t);
        assert_eq!(ts.tv_sec, 12);
        assert_eq!(ts.tv_nsec, 345_678_901);
        assert_eq!(from_timespec(ts), t);
    }

    #[test]
    fn out_of_range_timespecs_clamp() {
        let huge = Timespec {
            tv_sec: i64::MAX,
            tv_nsec: 999_999_999,
        };
        assert_eq!(from_timespec(huge), TimePoint(u64::MAX));
        let negative = Timespec {
            tv_sec: -5,
            tv_nsec: 0,
        };
        assert_eq!(from_timespec(negative), TimePoint::ZERO);
    }
}
