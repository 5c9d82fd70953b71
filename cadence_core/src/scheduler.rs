// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame scheduling against compositor latch points.
//!
//! The [`FrameScheduler`] combines the three building blocks of presentation
//! pacing:
//!
//! - a [`VsyncForecastTracker`] fed by compositor acknowledgments,
//! - an [`InFlightBudget`] bounding unacknowledged frames,
//! - a [`PresentCoalescer`] keeping at most one present call outstanding.
//!
//! It owns no clock and performs no I/O. Callers pass the current time in
//! and act on the returned [`FramePlan`], [`SubmitDecision`] and
//! [`AckOutcome`] values. See the [`FrameScheduler`] struct docs for the
//! call sequence.

use alloc::collections::VecDeque;

use crate::budget::{FrameBudgetState, InFlightBudget};
use crate::coalesce::{CoalescerState, FlushDecision, PresentCoalescer};
use crate::forecast::{PresentationInterval, VsyncForecastTracker};
use crate::latch::{LatchInputs, compute_next_latch_point};
use crate::time::{TimeDelta, TimePoint};
use crate::timing::{
    AckOutcome, AcknowledgedPresent, FramePlan, FramePresentedInfo, PresentReceipt, PresentTicket,
    SubmitDecision,
};
use crate::trace::TraceCounters;

/// Configuration for the [`FrameScheduler`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SchedulerConfig {
    /// Upper bound on frames submitted but not yet acknowledged.
    pub max_frames_in_flight: u32,
    /// Nominal display refresh interval, used when the forecast runs out.
    pub vsync_interval: TimeDelta,
    /// Floor for the frame build-time estimate.
    pub initial_build_time: TimeDelta,
    /// EMA smoothing factor for observed build times (0.0–1.0).
    /// Smaller values = more smoothing.
    pub build_time_alpha: f32,
    /// Safety multiplier applied to the smoothed build time.
    pub build_time_multiplier: f32,
    /// Number of forecast intervals retained.
    pub forecast_capacity: usize,
}

impl SchedulerConfig {
    /// Default frames-in-flight ceiling.
    pub const DEFAULT_MAX_FRAMES_IN_FLIGHT: u32 = 3;

    /// Default configuration: three frames in flight on a 60 Hz display.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_frames_in_flight: Self::DEFAULT_MAX_FRAMES_IN_FLIGHT,
            // ~16.67ms.
            vsync_interval: TimeDelta(16_666_667),
            initial_build_time: TimeDelta::ZERO,
            build_time_alpha: 0.2,
            build_time_multiplier: 1.5,
            forecast_capacity: VsyncForecastTracker::DEFAULT_CAPACITY,
        }
    }

    /// Returns this configuration with a different frames-in-flight ceiling.
    #[must_use]
    pub const fn with_max_frames_in_flight(mut self, max_frames_in_flight: u32) -> Self {
        self.max_frames_in_flight = max_frames_in_flight;
        self
    }

    /// Returns this configuration with a different vsync interval.
    #[must_use]
    pub const fn with_vsync_interval(mut self, vsync_interval: TimeDelta) -> Self {
        self.vsync_interval = vsync_interval;
        self
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Exponential moving average tracker.
#[derive(Clone, Copy, Debug)]
struct Ema {
    value: f32,
    alpha: f32,
    initialized: bool,
}

impl Ema {
    const fn new(alpha: f32) -> Self {
        Self {
            value: 0.0,
            alpha,
            initialized: false,
        }
    }

    fn update(&mut self, sample: f32) {
        if self.initialized {
            self.value = self.alpha * sample + (1.0 - self.alpha) * self.value;
        } else {
            self.value = sample;
            self.initialized = true;
        }
    }

    const fn get(&self) -> Option<f32> {
        if self.initialized {
            Some(self.value)
        } else {
            None
        }
    }
}

/// Presentation scheduler for one compositor connection.
///
/// # Call sequence
///
/// ```rust,ignore
/// let plan = scheduler.request_frame(requested_at, now);
/// // ... build the frame for plan.latch_point ...
/// match scheduler.on_frame_ready() {
///     SubmitDecision::Deferred => { /* hold the frame */ }
///     SubmitDecision::Accepted { send: Some(ticket), .. } => transport.present(ticket),
///     SubmitDecision::Accepted { send: None, .. } => { /* coalesced */ }
/// }
/// // Later, on the owning thread:
/// if let Some(ticket) = scheduler.on_send_complete() { transport.present(ticket) }
/// let outcome = scheduler.on_frame_presented(&info, now);
/// if outcome.retry_deferred { /* resubmit the held frame */ }
/// ```
///
/// # Frame accounting
///
/// Every admitted frame holds one budget slot. Frames admitted while a send
/// is in transit ride along in the next [`PresentTicket`], which records how
/// many frames it carries. When the compositor acknowledges a present, the
/// slots of every frame in that ticket (and in any older ticket the
/// compositor squashed) are returned.
#[derive(Debug)]
pub struct FrameScheduler {
    config: SchedulerConfig,
    budget: InFlightBudget,
    coalescer: PresentCoalescer,
    forecast: VsyncForecastTracker,
    counters: TraceCounters,
    build_time: Ema,
    last_latch_point_targeted: TimePoint,
    present_requested_time: TimePoint,
    frame_index: u64,
    frames_awaiting_send: u32,
    outstanding: VecDeque<PresentTicket>,
    deferred: bool,
    initialized: bool,
}

impl FrameScheduler {
    /// Creates a scheduler with the given configuration.
    #[must_use]
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            budget: InFlightBudget::new(config.max_frames_in_flight),
            coalescer: PresentCoalescer::new(),
            forecast: VsyncForecastTracker::with_capacity(config.forecast_capacity),
            counters: TraceCounters::new(),
            build_time: Ema::new(config.build_time_alpha),
            last_latch_point_targeted: TimePoint::ZERO,
            present_requested_time: TimePoint::ZERO,
            frame_index: 0,
            frames_awaiting_send: 0,
            outstanding: VecDeque::new(),
            deferred: false,
            initialized: false,
            config,
        }
    }

    /// Chooses the latch point for a new frame requested at
    /// `present_requested_time`.
    ///
    /// The chosen point becomes the last targeted latch point, so every
    /// later plan targets a strictly later one.
    pub fn request_frame(
        &mut self,
        present_requested_time: TimePoint,
        now: TimePoint,
    ) -> FramePlan {
        self.present_requested_time = present_requested_time;
        self.forecast.prune(now);

        let build_time_estimate = self.build_time_estimate();
        let latch_point = compute_next_latch_point(
            &LatchInputs {
                present_requested_time,
                now,
                last_latch_point_targeted: self.last_latch_point_targeted,
                frame_build_time_estimate: build_time_estimate,
                vsync_interval: self.config.vsync_interval,
            },
            &self.forecast,
        );
        self.last_latch_point_targeted = latch_point;

        let plan = FramePlan {
            frame_index: self.frame_index,
            present_requested_time,
            latch_point,
            expected_presentation_time: self.forecast.presentation_time_for(latch_point),
            build_time_estimate,
        };
        self.frame_index += 1;
        plan
    }

    /// Submits a finished frame.
    ///
    /// Returns [`SubmitDecision::Deferred`] without side effects on the
    /// budget when too many frames are in flight. Otherwise the frame is
    /// admitted and, if no send is in transit, a [`PresentTicket`] is
    /// returned for the caller to transmit.
    pub fn on_frame_ready(&mut self) -> SubmitDecision {
        if !self.budget.try_acquire() {
            if !self.deferred {
                log::debug!(
                    "frame deferred: {} of {} frames in flight",
                    self.budget.frames_in_flight(),
                    self.budget.allowed()
                );
            }
            self.deferred = true;
            return SubmitDecision::Deferred;
        }
        self.deferred = false;

        let trace_id = self.counters.next_present_trace_id();
        self.frames_awaiting_send += 1;
        let send = match self.coalescer.request_flush() {
            FlushDecision::Send => Some(self.issue_ticket()),
            FlushDecision::Queued | FlushDecision::Merged => {
                log::debug!("frame {trace_id} coalesced behind the send in transit");
                None
            }
            FlushDecision::Idle => None,
        };
        SubmitDecision::Accepted { trace_id, send }
    }

    /// Records that the transport finished sending the last ticket.
    ///
    /// Returns the follow-up ticket when frames were coalesced while the
    /// send was in transit.
    pub fn on_send_complete(&mut self) -> Option<PresentTicket> {
        self.coalescer
            .on_send_complete()
            .is_send()
            .then(|| self.issue_ticket())
    }

    /// Processes an acknowledgment batch from the compositor.
    ///
    /// Releases the budget slots of every acknowledged present, applies any
    /// new present credit and forecast, and reports whether a deferred frame
    /// may now be retried. The retry is reported once per deferral.
    pub fn on_frame_presented(
        &mut self,
        info: &FramePresentedInfo,
        now: TimePoint,
    ) -> AckOutcome {
        let mut outcome = AckOutcome::default();
        for receipt in &info.presented {
            self.retire(receipt, &mut outcome);
        }

        if let Some(allowed) = info.presents_allowed {
            self.budget.set_allowed(allowed);
        }

        if info.future_presentations.is_empty() {
            self.forecast.prune(now);
        } else {
            self.forecast
                .update_forecast(info.future_presentations.iter().copied(), now);
        }

        if self.deferred && self.budget.has_capacity() {
            self.deferred = false;
            outcome.retry_deferred = true;
            log::debug!(
                "budget freed ({} in flight); retrying deferred frame",
                self.budget.frames_in_flight()
            );
        }
        outcome
    }

    /// Replaces the forecast outside of an acknowledgment, for example with
    /// the compositor's initial report. Returns the retained entry count.
    pub fn update_forecast<I>(&mut self, intervals: I, now: TimePoint) -> usize
    where
        I: IntoIterator<Item = PresentationInterval>,
    {
        self.forecast.update_forecast(intervals, now)
    }

    /// Feeds one measured frame build time into the estimate.
    pub fn observe_build_time(&mut self, build_time: TimeDelta) {
        self.build_time.update(build_time.nanos() as f32);
    }

    /// The build-time estimate used when choosing latch points.
    ///
    /// This is the smoothed observed build time times the safety multiplier,
    /// but never less than [`SchedulerConfig::initial_build_time`].
    #[must_use]
    pub fn build_time_estimate(&self) -> TimeDelta {
        let observed = self.build_time.get().map_or(TimeDelta::ZERO, |ema| {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "EMA-smoothed build time in nanoseconds fits in u64"
            )]
            let nanos = (ema * self.config.build_time_multiplier) as u64;
            TimeDelta(nanos)
        });
        observed.max(self.config.initial_build_time)
    }

    /// Latch point chosen for the most recent frame.
    #[must_use]
    pub fn last_latch_point_targeted(&self) -> TimePoint {
        self.last_latch_point_targeted
    }

    /// Request time of the most recent frame.
    #[must_use]
    pub fn present_requested_time(&self) -> TimePoint {
        self.present_requested_time
    }

    /// Frames submitted but not yet acknowledged.
    #[must_use]
    pub fn frames_in_flight(&self) -> u32 {
        self.budget.frames_in_flight()
    }

    /// Snapshot of the budget counters.
    #[must_use]
    pub fn budget_state(&self) -> FrameBudgetState {
        self.budget.state()
    }

    /// Current coalescer state.
    #[must_use]
    pub fn coalescer_state(&self) -> CoalescerState {
        self.coalescer.state()
    }

    /// Returns `true` while a frame is held for lack of budget.
    #[must_use]
    pub fn has_deferred_frame(&self) -> bool {
        self.deferred
    }

    /// Presents sent and not yet acknowledged, oldest first.
    pub fn outstanding_presents(&self) -> impl ExactSizeIterator<Item = &PresentTicket> + '_ {
        self.outstanding.iter()
    }

    /// The vsync forecast.
    #[must_use]
    pub fn forecast(&self) -> &VsyncForecastTracker {
        &self.forecast
    }

    /// Trace-correlation counters.
    #[must_use]
    pub fn counters(&self) -> &TraceCounters {
        &self.counters
    }

    /// The configuration this scheduler was created with.
    #[must_use]
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    fn issue_ticket(&mut self) -> PresentTicket {
        let ticket = PresentTicket {
            session_trace_id: self.counters.next_present_session_trace_id(),
            frames: core::mem::take(&mut self.frames_awaiting_send),
            target_latch_point: self.last_latch_point_targeted,
            clear_scene: !self.initialized,
        };
        self.initialized = true;
        self.outstanding.push_back(ticket);
        ticket
    }

    fn retire(&mut self, receipt: &PresentReceipt, outcome: &mut AckOutcome) {
        let id = receipt.session_trace_id;
        if id >= self.counters.present_session_trace_ids_issued() {
            log::warn!("acknowledgment for unknown present {id}; ignoring");
            outcome.violations += 1;
            return;
        }
        if !self.counters.mark_processed(id) {
            log::warn!("duplicate acknowledgment for present {id}; ignoring");
            outcome.violations += 1;
            return;
        }

        while self.outstanding.front().is_some_and(|t| t.session_trace_id <= id) {
            let Some(ticket) = self.outstanding.pop_front() else {
                break;
            };
            let mut frames_released = 0;
            for _ in 0..ticket.frames {
                if self.budget.release() {
                    frames_released += 1;
                }
            }
            let squashed = ticket.session_trace_id < id;
            if squashed {
                log::debug!(
                    "present {} squashed into {id}; releasing {frames_released} frames",
                    ticket.session_trace_id
                );
            }
            outcome.acknowledged.push(AcknowledgedPresent {
                session_trace_id: ticket.session_trace_id,
                frames_released,
                squashed,
            });
        }

        if receipt.latched_time > self.last_latch_point_targeted {
            log::debug!(
                "present {id} latched at {:?}, after last targeted {:?}; catching up",
                receipt.latched_time,
                self.last_latch_point_targeted
            );
            self.last_latch_point_targeted = receipt.latched_time;
        }
    }
}
