// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Values exchanged between the scheduler, its caller and the compositor.
//!
//! - [`FramePlan`] — the latch point a new frame should be built for.
//! - [`PresentTicket`] — one present request the transport must send.
//! - [`FramePresentedInfo`] — an acknowledgment batch from the compositor.
//!
//! # Data flow
//!
//! 1. The caller asks [`FrameScheduler::request_frame`] for a plan and builds
//!    the frame for [`FramePlan::latch_point`].
//! 2. [`FrameScheduler::on_frame_ready`] admits the frame against the budget
//!    and, when the transport is free, hands back a [`PresentTicket`].
//! 3. The compositor later reports [`FramePresentedInfo`], which
//!    [`FrameScheduler::on_frame_presented`] turns into budget releases and a
//!    refreshed forecast.
//!
//! [`FrameScheduler::request_frame`]: crate::scheduler::FrameScheduler::request_frame
//! [`FrameScheduler::on_frame_ready`]: crate::scheduler::FrameScheduler::on_frame_ready
//! [`FrameScheduler::on_frame_presented`]: crate::scheduler::FrameScheduler::on_frame_presented

use alloc::vec::Vec;

use crate::forecast::PresentationInterval;
use crate::time::{TimeDelta, TimePoint};

/// The schedule for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FramePlan {
    /// Monotonically increasing frame counter.
    pub frame_index: u64,
    /// When the frame was requested.
    pub present_requested_time: TimePoint,
    /// Latch point the frame should be ready for.
    pub latch_point: TimePoint,
    /// When the frame is expected on screen, if the forecast covers the
    /// latch point.
    pub expected_presentation_time: Option<TimePoint>,
    /// Build-time estimate used when choosing the latch point.
    pub build_time_estimate: TimeDelta,
}

/// A present request the caller must hand to the transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PresentTicket {
    /// Id the compositor will use for this present in its acknowledgment.
    pub session_trace_id: u64,
    /// Frames coalesced into this present.
    pub frames: u32,
    /// Latch point of the newest frame included.
    pub target_latch_point: TimePoint,
    /// Set on the first present of a connection so the compositor starts
    /// from an empty tree.
    pub clear_scene: bool,
}

/// Acknowledgment of one earlier present.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PresentReceipt {
    /// The [`PresentTicket::session_trace_id`] being acknowledged.
    pub session_trace_id: u64,
    /// When the compositor actually latched the present.
    pub latched_time: TimePoint,
}

/// An acknowledgment batch from the compositor.
///
/// One batch may acknowledge several earlier presents.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct FramePresentedInfo {
    /// When the newest acknowledged content reached the screen.
    pub actual_presentation_time: TimePoint,
    /// Presents covered by this batch, oldest first.
    pub presented: Vec<PresentReceipt>,
    /// Updated present credit, if the compositor changed it.
    pub presents_allowed: Option<u32>,
    /// Fresh forecast window. Empty means "no new forecast".
    pub future_presentations: Vec<PresentationInterval>,
}

/// Budget release caused by one acknowledged present.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AcknowledgedPresent {
    /// Compositor-side id of the present.
    pub session_trace_id: u64,
    /// Frames returned to the budget.
    pub frames_released: u32,
    /// `true` when this present was retired implicitly by a newer receipt.
    pub squashed: bool,
}

/// Result of processing a [`FramePresentedInfo`].
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct AckOutcome {
    /// Presents retired by the batch, oldest first.
    pub acknowledged: Vec<AcknowledgedPresent>,
    /// Receipts that were duplicates or referenced unknown presents.
    pub violations: u32,
    /// A frame was deferred for lack of budget and may now be retried.
    pub retry_deferred: bool,
}

impl AckOutcome {
    /// Total frames released from the budget.
    #[must_use]
    pub fn frames_released(&self) -> u32 {
        self.acknowledged.iter().map(|a| a.frames_released).sum()
    }
}

/// Result of [`FrameScheduler::on_frame_ready`](crate::scheduler::FrameScheduler::on_frame_ready).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[must_use]
pub enum SubmitDecision {
    /// The budget is exhausted. Hold the frame and retry once an
    /// acknowledgment reports [`AckOutcome::retry_deferred`].
    Deferred,
    /// The frame was admitted.
    Accepted {
        /// Local trace id assigned to the submission.
        trace_id: u64,
        /// A present to send now, or `None` if the frame was coalesced
        /// behind a send already in transit.
        send: Option<PresentTicket>,
    },
}
