// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Latch-point selection.
//!
//! [`compute_next_latch_point`] picks the compositor latch point a new frame
//! should target. It is a pure function of [`LatchInputs`] and the current
//! [`VsyncForecastTracker`]: it never reads a clock, so recorded forecast
//! traces can be replayed against it exactly.
//!
//! The choice balances two constraints:
//!
//! - **Forward progress.** A latch point that was already targeted by an
//!   earlier frame is never chosen again; the result is always strictly
//!   after [`LatchInputs::last_latch_point_targeted`].
//! - **Feasibility.** A latch point closer to `now` than the estimated frame
//!   build time would be missed anyway, so the next opportunity is chosen
//!   instead. This costs one vsync of latency but avoids visible jank.

use crate::forecast::VsyncForecastTracker;
use crate::time::{TimeDelta, TimePoint};

/// Inputs to [`compute_next_latch_point`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LatchInputs {
    /// When the frame was requested.
    pub present_requested_time: TimePoint,
    /// The current time.
    pub now: TimePoint,
    /// Latch point chosen for the previous frame.
    pub last_latch_point_targeted: TimePoint,
    /// How long building a frame is expected to take.
    pub frame_build_time_estimate: TimeDelta,
    /// Nominal display refresh interval.
    pub vsync_interval: TimeDelta,
}

/// Returns the latch point the next frame should target.
///
/// 1. Start from the first forecast latch point at or after the request
///    time (or `now`, if the request is already in the past).
/// 2. If that point was already targeted, move to the first forecast entry
///    after the last targeted point, or step forward by whole vsync
///    intervals when the forecast has none.
/// 3. If the remaining time before it is shorter than the build estimate,
///    move to the next forecast entry and re-check 2. Past the end of the
///    forecast, jump to the first vsync grid point that leaves enough time.
#[must_use]
pub fn compute_next_latch_point(
    inputs: &LatchInputs,
    forecast: &VsyncForecastTracker,
) -> TimePoint {
    let LatchInputs {
        present_requested_time,
        now,
        last_latch_point_targeted,
        frame_build_time_estimate,
        vsync_interval,
    } = *inputs;

    let anchor = present_requested_time.max(now);
    let mut candidate = forecast.next_latch_point_at_or_after(anchor, vsync_interval);

    loop {
        if candidate <= last_latch_point_targeted {
            candidate = forecast
                .retained_latch_point_after(last_latch_point_targeted)
                .unwrap_or_else(|| candidate.step_past(last_latch_point_targeted, vsync_interval));
        }
        if candidate.saturating_duration_since(now) >= frame_build_time_estimate {
            return candidate;
        }
        let next = match forecast.retained_latch_point_after(candidate) {
            Some(next) => next,
            // Past the forecast: the first grid point leaving room to build.
            None => {
                let earliest = now.saturating_add(frame_build_time_estimate);
                let floor = TimePoint(earliest.nanos().saturating_sub(1)).max(candidate);
                candidate.step_past(floor, vsync_interval)
            }
        };
        if next <= candidate {
            // Saturated at the end of time.
            return candidate;
        }
        candidate = next;
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::forecast::PresentationInterval;

    const MS: u64 = 1_000_000;
    const T: u64 = 1_000 * MS;

    fn inputs(now: u64, last: u64, build_ms: u64) -> LatchInputs {
        LatchInputs {
            present_requested_time: TimePoint(now),
            now: TimePoint(now),
            last_latch_point_targeted: TimePoint(last),
            frame_build_time_estimate: TimeDelta::from_millis(build_ms),
            vsync_interval: TimeDelta::from_millis(16),
        }
    }

    fn forecast(entries: &[(u64, u64)]) -> VsyncForecastTracker {
        let mut tracker = VsyncForecastTracker::default();
        tracker.update_forecast(
            entries
                .iter()
                .map(|&(l, p)| PresentationInterval::new(TimePoint(l), TimePoint(p))),
            TimePoint(0),
        );
        tracker
    }

    #[test]
    fn empty_forecast_targets_one_vsync_from_now() {
        let latch = compute_next_latch_point(&inputs(T, 0, 5), &VsyncForecastTracker::default());
        assert_eq!(latch, TimePoint(T + 16 * MS));
    }

    #[test]
    fn already_targeted_latch_point_is_skipped() {
        let f = forecast(&[(T + 16 * MS, T + 32 * MS), (T + 32 * MS, T + 48 * MS)]);
        let latch = compute_next_latch_point(&inputs(T, T + 16 * MS, 5), &f);
        assert_eq!(latch, TimePoint(T + 32 * MS));
    }

    #[test]
    fn already_targeted_snaps_to_forecast_not_nominal_interval() {
        let f = forecast(&[(T + 16 * MS, T + 32 * MS), (T + 32 * MS, T + 48 * MS)]);
        let mut i = inputs(T, T + 16 * MS, 5);
        i.vsync_interval = TimeDelta(16_666_667);
        assert_eq!(compute_next_latch_point(&i, &f), TimePoint(T + 32 * MS));
    }

    #[test]
    fn infeasible_latch_point_moves_to_next_forecast_entry() {
        // Next latch is 4ms away but a frame takes 5ms to build.
        let f = forecast(&[(T + 4 * MS, T + 20 * MS), (T + 20 * MS, T + 36 * MS)]);
        let latch = compute_next_latch_point(&inputs(T, 0, 5), &f);
        assert_eq!(latch, TimePoint(T + 20 * MS));
    }

    #[test]
    fn infeasible_with_exhausted_forecast_synthesizes_vsync_steps() {
        let f = forecast(&[(T + 4 * MS, T + 20 * MS)]);
        // Build takes 30ms: T+4 and T+20 are both too close, T+36 fits.
        let latch = compute_next_latch_point(&inputs(T, 0, 30), &f);
        assert_eq!(latch, TimePoint(T + 36 * MS));
    }

    #[test]
    fn long_build_past_the_forecast_lands_on_the_grid() {
        let f = VsyncForecastTracker::default();
        let latch = compute_next_latch_point(&inputs(T, 0, 10_000), &f);
        assert_eq!(latch, TimePoint(T + 10_000 * MS));
    }

    #[test]
    fn unbounded_build_estimate_saturates_instead_of_spinning() {
        let mut i = inputs(T, 0, 0);
        i.frame_build_time_estimate = TimeDelta(u64::MAX);
        let latch = compute_next_latch_point(&i, &VsyncForecastTracker::default());
        assert_eq!(latch, TimePoint(u64::MAX));

        i.last_latch_point_targeted = TimePoint(u64::MAX);
        let latch = compute_next_latch_point(&i, &VsyncForecastTracker::default());
        assert_eq!(latch, TimePoint(u64::MAX));
    }

    #[test]
    fn past_request_time_is_anchored_at_now() {
        let mut i = inputs(T, 0, 0);
        i.present_requested_time = TimePoint(T - 40 * MS);
        let latch = compute_next_latch_point(&i, &VsyncForecastTracker::default());
        assert_eq!(latch, TimePoint(T + 16 * MS));
    }

    #[test]
    fn deterministic_under_identical_inputs() {
        let f = forecast(&[(T + 7 * MS, T + 23 * MS), (T + 23 * MS, T + 39 * MS)]);
        let i = inputs(T, T + 7 * MS, 3);
        let first = compute_next_latch_point(&i, &f);
        for _ in 0..10 {
            assert_eq!(compute_next_latch_point(&i, &f), first);
        }
    }

    #[test]
    fn successive_latch_points_strictly_increase() {
        let f = forecast(&[
            (T + 16 * MS, T + 32 * MS),
            (T + 32 * MS, T + 48 * MS),
            (T + 48 * MS, T + 64 * MS),
        ]);
        let mut last = TimePoint::ZERO;
        let mut now = T;
        for step in 0..20_u64 {
            // Requests arrive faster than vsync, sometimes with no time passing.
            now += (step % 3) * MS;
            let latch = compute_next_latch_point(&inputs(now, last.nanos(), 2), &f);
            assert!(latch > last, "latch {latch:?} did not advance past {last:?}");
            last = latch;
        }
    }

    #[test]
    fn zero_vsync_interval_still_makes_progress() {
        let mut i = inputs(T, T + 10, 0);
        i.vsync_interval = TimeDelta::ZERO;
        let latch = compute_next_latch_point(&i, &VsyncForecastTracker::default());
        assert!(latch > TimePoint(T + 10), "must exceed the last target");
    }

    #[test]
    fn zero_build_time_targets_first_forecast_entry() {
        let mut tracker = VsyncForecastTracker::default();
        tracker.update_forecast(
            vec![PresentationInterval::new(TimePoint(T + MS), TimePoint(T + 17 * MS))],
            TimePoint(T),
        );
        assert_eq!(
            compute_next_latch_point(&inputs(T, 0, 0), &tracker),
            TimePoint(T + MS)
        );
    }
}
