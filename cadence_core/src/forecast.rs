// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compositor-reported vsync forecast.
//!
//! The compositor periodically reports a short list of upcoming
//! [`PresentationInterval`]s: moments at which it will latch new content,
//! each paired with the time that content is expected to reach the screen.
//! [`VsyncForecastTracker`] retains the freshest such list, keeps it ordered
//! and bounded, drops entries that have slipped into the past, and answers
//! "what is the next latch point at or after `t`?".
//!
//! When the window is empty or every entry is before the query time, the
//! tracker extrapolates on the vsync grid from the last latch point it ever
//! saw, so callers always get a deterministic answer.

use alloc::collections::VecDeque;

use crate::time::{TimeDelta, TimePoint};

/// A predicted opportunity to latch a frame and have it presented.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PresentationInterval {
    /// When the compositor will lock in submitted content.
    pub latch_point: TimePoint,
    /// When content latched at `latch_point` is expected on screen.
    pub expected_presentation_time: TimePoint,
}

impl PresentationInterval {
    /// Creates an interval from its two endpoints.
    #[inline]
    #[must_use]
    pub const fn new(latch_point: TimePoint, expected_presentation_time: TimePoint) -> Self {
        Self {
            latch_point,
            expected_presentation_time,
        }
    }
}

/// Bounded, ordered window of upcoming [`PresentationInterval`]s.
#[derive(Clone, Debug)]
pub struct VsyncForecastTracker {
    window: VecDeque<PresentationInterval>,
    capacity: usize,
    last_known_latch_point: Option<TimePoint>,
}

impl VsyncForecastTracker {
    /// Default number of retained intervals.
    pub const DEFAULT_CAPACITY: usize = 8;

    /// Creates an empty tracker retaining at most `capacity` intervals.
    ///
    /// `capacity == 0` is promoted to `1`.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
            last_known_latch_point: None,
        }
    }

    /// Replaces the retained window with a fresh report from the compositor.
    ///
    /// Entries whose latch point is before `now` are dropped. An entry that
    /// would break the ordering (either field earlier than its predecessor's)
    /// is skipped and logged; the remainder of the report is still used.
    /// Only the earliest `capacity` entries are kept.
    ///
    /// Returns the number of retained entries.
    pub fn update_forecast<I>(&mut self, new_intervals: I, now: TimePoint) -> usize
    where
        I: IntoIterator<Item = PresentationInterval>,
    {
        self.window.clear();
        for interval in new_intervals {
            if interval.latch_point < now {
                continue;
            }
            if let Some(prev) = self.window.back() {
                if interval.latch_point < prev.latch_point
                    || interval.expected_presentation_time < prev.expected_presentation_time
                {
                    log::warn!(
                        "forecast entry {interval:?} is out of order after {prev:?}; skipping"
                    );
                    continue;
                }
            }
            if self.window.len() == self.capacity {
                break;
            }
            self.window.push_back(interval);
        }
        if let Some(last) = self.window.back() {
            self.last_known_latch_point = Some(last.latch_point);
        }
        log::debug!(
            "forecast replaced: {} entries, next latch {:?}",
            self.window.len(),
            self.window.front().map(|i| i.latch_point)
        );
        self.window.len()
    }

    /// Drops retained entries whose latch point is strictly before `now`.
    pub fn prune(&mut self, now: TimePoint) {
        while self.window.front().is_some_and(|i| i.latch_point < now) {
            self.window.pop_front();
        }
    }

    /// Returns the earliest retained latch point at or after `t`.
    ///
    /// Falls back to the vsync grid when nothing retained qualifies:
    /// the last latch point ever reported plus one `vsync_interval`, stepped
    /// forward by whole intervals until it is at or after `t`. With no
    /// history at all the answer is `t + vsync_interval`.
    #[must_use]
    pub fn next_latch_point_at_or_after(
        &self,
        t: TimePoint,
        vsync_interval: TimeDelta,
    ) -> TimePoint {
        if let Some(interval) = self.window.iter().find(|i| i.latch_point >= t) {
            return interval.latch_point;
        }
        match self.last_known_latch_point {
            Some(last) => {
                let next = last.saturating_add(vsync_interval);
                if next >= t {
                    return next;
                }
                // Land on the grid at or after `t`.
                let step = vsync_interval.nanos().max(1);
                let steps = (t.nanos() - next.nanos()).div_ceil(step);
                TimePoint(next.nanos().saturating_add(steps.saturating_mul(step)))
            }
            None => t.saturating_add(vsync_interval),
        }
    }

    /// Returns the earliest retained latch point strictly after `t`, or
    /// `t + vsync_interval` if none is retained.
    #[must_use]
    pub fn next_latch_point_after(&self, t: TimePoint, vsync_interval: TimeDelta) -> TimePoint {
        self.retained_latch_point_after(t)
            .unwrap_or_else(|| t.step_past(t, vsync_interval))
    }

    /// Returns the earliest retained latch point strictly after `t`, without
    /// extrapolating.
    #[must_use]
    pub fn retained_latch_point_after(&self, t: TimePoint) -> Option<TimePoint> {
        self.window
            .iter()
            .find(|i| i.latch_point > t)
            .map(|i| i.latch_point)
    }

    /// Returns the expected presentation time for a retained latch point.
    #[must_use]
    pub fn presentation_time_for(&self, latch_point: TimePoint) -> Option<TimePoint> {
        self.window
            .iter()
            .find(|i| i.latch_point == latch_point)
            .map(|i| i.expected_presentation_time)
    }

    /// Returns the retained intervals, earliest first.
    pub fn intervals(&self) -> impl ExactSizeIterator<Item = &PresentationInterval> + '_ {
        self.window.iter()
    }

    /// Returns the number of retained intervals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.window.len()
    }

    /// Returns `true` when no intervals are retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// The latest latch point the compositor has ever reported, if any.
    #[must_use]
    pub fn last_known_latch_point(&self) -> Option<TimePoint> {
        self.last_known_latch_point
    }
}

impl Default for VsyncForecastTracker {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }
}
