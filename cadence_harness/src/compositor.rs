// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic in-process compositor.
//!
//! [`SimulatedCompositor`] is a cloneable handle. One clone is handed to a
//! [`SessionConnection`](cadence_core::session::SessionConnection) as its
//! transport; the driver keeps another and calls
//! [`advance_to`](SimulatedCompositor::advance_to) to move simulated time
//! forward. Advancing completes in-transit sends, latches received presents
//! on a fixed vsync grid, and posts the matching
//! [`SessionEvent`](cadence_core::mailbox::SessionEvent)s to the session's
//! mailbox.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use cadence_core::error::TransportError;
use cadence_core::forecast::PresentationInterval;
use cadence_core::mailbox::MailboxSender;
use cadence_core::time::{TimeDelta, TimePoint};
use cadence_core::timing::{FramePresentedInfo, PresentReceipt, PresentTicket};
use cadence_core::transport::{CompositorTransport, PresentRequest};

/// Timing behavior of a [`SimulatedCompositor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompositorModel {
    /// Distance between latch points.
    pub vsync_interval: TimeDelta,
    /// The first latch point.
    pub first_latch: TimePoint,
    /// Latch to on-screen delay.
    pub presentation_latency: TimeDelta,
    /// Present call to send-complete delay.
    pub send_latency: TimeDelta,
    /// Intervals reported with each acknowledgment.
    pub forecast_len: usize,
    /// Present credit reported with each acknowledgment.
    pub presents_allowed: Option<u32>,
    /// Acknowledge only the newest present of each latch, squashing older
    /// ones.
    pub squash: bool,
}

impl CompositorModel {
    /// A 60 Hz compositor presenting one vsync after latching.
    #[must_use]
    pub const fn vsync_60hz(first_latch: TimePoint) -> Self {
        let vsync = TimeDelta(16_666_667);
        Self {
            vsync_interval: vsync,
            first_latch,
            presentation_latency: vsync,
            send_latency: TimeDelta(500_000),
            forecast_len: 4,
            presents_allowed: None,
            squash: false,
        }
    }
}

/// One present as the compositor latched it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LatchedPresent {
    /// The present's metadata as sent.
    pub ticket: PresentTicket,
    /// When the present arrived.
    pub received_at: TimePoint,
    /// Latch point that picked it up.
    pub latched_at: TimePoint,
    /// When it reached the screen.
    pub presented_at: TimePoint,
}

impl LatchedPresent {
    /// Returns `true` if the present missed the latch point it targeted.
    #[must_use]
    pub fn missed_target(&self) -> bool {
        self.latched_at > self.ticket.target_latch_point
    }
}

#[derive(Debug)]
struct InTransit {
    ticket: PresentTicket,
    received_at: TimePoint,
    completes_at: TimePoint,
}

#[derive(Debug)]
struct State {
    model: CompositorModel,
    sender: MailboxSender,
    now: TimePoint,
    next_latch: TimePoint,
    in_transit: Option<InTransit>,
    received: Vec<(PresentTicket, TimePoint)>,
    latched: Vec<LatchedPresent>,
    updates_applied: usize,
    scene_clears: u64,
    protocol_violations: u64,
    reject_next: Option<TransportError>,
    disconnected: bool,
}

/// Shared handle to a simulated compositor.
#[derive(Clone, Debug)]
pub struct SimulatedCompositor {
    state: Rc<RefCell<State>>,
}

impl SimulatedCompositor {
    /// Creates a compositor that reports to `sender`.
    #[must_use]
    pub fn new(model: CompositorModel, sender: MailboxSender) -> Self {
        Self {
            state: Rc::new(RefCell::new(State {
                now: TimePoint::ZERO,
                next_latch: model.first_latch,
                model,
                sender,
                in_transit: None,
                received: Vec::new(),
                latched: Vec::new(),
                updates_applied: 0,
                scene_clears: 0,
                protocol_violations: 0,
                reject_next: None,
                disconnected: false,
            })),
        }
    }

    /// Moves simulated time to `now`, delivering every completion and
    /// acknowledgment due by then, in time order.
    pub fn advance_to(&self, now: TimePoint) {
        let mut state = self.state.borrow_mut();
        if state.disconnected {
            state.now = state.now.max(now);
            return;
        }
        loop {
            let completion = state.in_transit.as_ref().map(|t| t.completes_at);
            let latch = state.next_latch;
            match completion {
                Some(done) if done <= latch && done <= now => state.complete_send(),
                _ if latch <= now => state.latch(),
                _ => break,
            }
        }
        state.now = state.now.max(now);
    }

    /// Returns the forecast the compositor would report at `now`.
    #[must_use]
    pub fn forecast(&self, now: TimePoint) -> Vec<PresentationInterval> {
        let state = self.state.borrow();
        let mut first = state.next_latch;
        while first < now {
            first = first.saturating_add(state.model.vsync_interval);
        }
        state.forecast_from(first)
    }

    /// Makes the next present call fail with `err`.
    pub fn reject_next(&self, err: TransportError) {
        self.state.borrow_mut().reject_next = Some(err);
    }

    /// Drops the connection and tells the session.
    pub fn disconnect(&self) {
        let mut state = self.state.borrow_mut();
        state.disconnected = true;
        state.in_transit = None;
        state.received.clear();
        state.sender.disconnected();
    }

    /// Takes the log of latched presents, oldest first.
    #[must_use]
    pub fn take_latched(&self) -> Vec<LatchedPresent> {
        core::mem::take(&mut self.state.borrow_mut().latched)
    }

    /// Total scene updates received.
    #[must_use]
    pub fn updates_applied(&self) -> usize {
        self.state.borrow().updates_applied
    }

    /// Presents that asked for the scene to be cleared.
    #[must_use]
    pub fn scene_clears(&self) -> u64 {
        self.state.borrow().scene_clears
    }

    /// Present calls made while another was still in transit.
    #[must_use]
    pub fn protocol_violations(&self) -> u64 {
        self.state.borrow().protocol_violations
    }

    /// The next latch point.
    #[must_use]
    pub fn next_latch(&self) -> TimePoint {
        self.state.borrow().next_latch
    }
}

impl State {
    fn complete_send(&mut self) {
        if let Some(done) = self.in_transit.take() {
            self.received.push((done.ticket, done.received_at));
            self.sender.send_complete();
        }
    }

    fn latch(&mut self) {
        let latch = self.next_latch;
        self.next_latch = latch.saturating_add(self.model.vsync_interval);
        if self.received.is_empty() {
            return;
        }

        let presented_at = latch.saturating_add(self.model.presentation_latency);
        let mut receipts = Vec::with_capacity(self.received.len());
        for (ticket, received_at) in self.received.drain(..) {
            self.latched.push(LatchedPresent {
                ticket,
                received_at,
                latched_at: latch,
                presented_at,
            });
            receipts.push(PresentReceipt {
                session_trace_id: ticket.session_trace_id,
                latched_time: latch,
            });
        }
        if self.model.squash {
            receipts.drain(..receipts.len() - 1);
        }

        let info = FramePresentedInfo {
            actual_presentation_time: presented_at,
            presented: receipts,
            presents_allowed: self.model.presents_allowed,
            future_presentations: self.forecast_from(self.next_latch),
        };
        self.sender.frame_presented(info);
    }

    fn forecast_from(&self, first: TimePoint) -> Vec<PresentationInterval> {
        let vsync = self.model.vsync_interval;
        let mut latch = first;
        let mut out = Vec::with_capacity(self.model.forecast_len);
        for _ in 0..self.model.forecast_len {
            out.push(PresentationInterval::new(
                latch,
                latch.saturating_add(self.model.presentation_latency),
            ));
            latch = latch.saturating_add(vsync);
        }
        out
    }
}

impl<U> CompositorTransport<U> for SimulatedCompositor {
    fn present(&mut self, request: PresentRequest<U>) -> Result<(), TransportError> {
        let mut state = self.state.borrow_mut();
        if state.disconnected {
            return Err(TransportError::ChannelClosed);
        }
        if let Some(err) = state.reject_next.take() {
            return Err(err);
        }
        if state.in_transit.is_some() {
            state.protocol_violations += 1;
            log::warn!(
                "present {} arrived while another is in transit",
                request.ticket.session_trace_id
            );
        }
        state.updates_applied += request.updates.len();
        if request.ticket.clear_scene {
            state.scene_clears += 1;
        }
        let received_at = state.now;
        let completes_at = received_at.saturating_add(state.model.send_latency);
        state.in_transit = Some(InTransit {
            ticket: request.ticket,
            received_at,
            completes_at,
        });
        Ok(())
    }
}
