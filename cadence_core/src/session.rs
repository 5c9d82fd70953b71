// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A presentation session bound to one compositor view.
//!
//! [`SessionConnection`] owns everything needed to present to a compositor:
//! the [`FrameScheduler`], a [`CompositorTransport`], a [`PresentSignal`],
//! the surface producer that renders frames, the scene updates waiting for
//! the next present, and the [`Mailbox`] through which the transport reports
//! back. Callers drive it from a single thread:
//!
//! 1. [`request_frame`](SessionConnection::request_frame) when a new frame is
//!    wanted,
//! 2. [`enqueue_update`](SessionConnection::enqueue_update) for each scene
//!    update the frame produces,
//! 3. [`present`](SessionConnection::present) once the frame is built,
//! 4. [`pump`](SessionConnection::pump) whenever the transport has posted
//!    events.
//!
//! A transport disconnection or send failure closes the session: the error
//! callback runs once, the error is returned, and every later call returns
//! [`SessionError::Closed`].

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::error::SessionError;
use crate::forecast::PresentationInterval;
use crate::mailbox::{Mailbox, SessionEvent};
use crate::scheduler::{FrameScheduler, SchedulerConfig};
use crate::time::{TimeDelta, TimePoint};
use crate::timing::{FramePlan, FramePresentedInfo, PresentTicket, SubmitDecision};
use crate::trace::{
    AckEvent, ForecastEvent, LatchEvent, SendEvent, SignalEvent, SubmitEvent, TraceSink, Tracer,
};
use crate::transport::{CompositorTransport, PresentRequest, PresentSignal};
use crate::view::{ViewRefId, ViewToken};

/// Construction parameters for a [`SessionConnection`].
#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    /// Label prefixed to every log line of the session.
    pub debug_label: String,
    /// View the session renders into.
    pub view_token: ViewToken,
    /// Identity of that view.
    pub view_ref: ViewRefId,
    /// Scheduler configuration.
    pub scheduler: SchedulerConfig,
}

impl SessionConfig {
    /// Creates a configuration with default view ids and scheduler settings.
    #[must_use]
    pub fn new(debug_label: impl Into<String>) -> Self {
        Self {
            debug_label: debug_label.into(),
            view_token: ViewToken::default(),
            view_ref: ViewRefId::default(),
            scheduler: SchedulerConfig::new(),
        }
    }

    /// Returns this configuration bound to the given view.
    #[must_use]
    pub fn with_view(mut self, view_token: ViewToken, view_ref: ViewRefId) -> Self {
        self.view_token = view_token;
        self.view_ref = view_ref;
        self
    }

    /// Returns this configuration with different scheduler settings.
    #[must_use]
    pub fn with_scheduler(mut self, scheduler: SchedulerConfig) -> Self {
        self.scheduler = scheduler;
        self
    }
}

/// Closures invoked by a [`SessionConnection`].
pub struct SessionCallbacks {
    on_error: Box<dyn FnMut(&SessionError)>,
    on_frame_presented: Box<dyn FnMut(&FramePresentedInfo)>,
}

impl SessionCallbacks {
    /// Creates callbacks from two closures.
    ///
    /// `on_error` runs once, when the session closes. `on_frame_presented`
    /// runs after each acknowledgment batch has been applied.
    pub fn new(
        on_error: impl FnMut(&SessionError) + 'static,
        on_frame_presented: impl FnMut(&FramePresentedInfo) + 'static,
    ) -> Self {
        Self {
            on_error: Box::new(on_error),
            on_frame_presented: Box::new(on_frame_presented),
        }
    }
}

impl Default for SessionCallbacks {
    fn default() -> Self {
        Self::new(|_| {}, |_| {})
    }
}

impl fmt::Debug for SessionCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCallbacks").finish_non_exhaustive()
    }
}

/// Result of [`SessionConnection::present`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[must_use]
pub enum PresentStatus {
    /// The frame went to the transport in a new present.
    Sent {
        /// Local trace id of the frame.
        trace_id: u64,
        /// Compositor-side id of the present.
        session_trace_id: u64,
    },
    /// The frame will ride along with the next present.
    Coalesced {
        /// Local trace id of the frame.
        trace_id: u64,
    },
    /// Too many frames in flight. The updates stay queued and the frame is
    /// retried automatically by [`SessionConnection::pump`].
    Deferred,
}

/// What a [`SessionConnection::pump`] call did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PumpSummary {
    /// Events drained from the mailbox.
    pub events: usize,
    /// Frames returned to the budget.
    pub frames_released: u32,
    /// Acknowledgments ignored as duplicates or unknown.
    pub violations: u32,
    /// Outcome of the deferred-frame retry, if one happened.
    pub retried: Option<PresentStatus>,
}

/// A presentation session.
///
/// - `T`: transport to the compositor.
/// - `S`: "presentation in progress" signal.
/// - `P`: surface producer, owned here and lent out by borrow.
/// - `U`: scene update type carried by the transport.
pub struct SessionConnection<T, S, P, U> {
    debug_label: String,
    view_token: ViewToken,
    view_ref: ViewRefId,
    scheduler: FrameScheduler,
    transport: T,
    signal: S,
    signal_raised: bool,
    surface_producer: P,
    pending_updates: Vec<U>,
    /// Leading entries of `pending_updates` that belong to admitted frames.
    admitted_updates: usize,
    mailbox: Mailbox,
    callbacks: SessionCallbacks,
    sink: Option<Box<dyn TraceSink>>,
    closed: bool,
}

impl<T, S, P, U> fmt::Debug for SessionConnection<T, S, P, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConnection")
            .field("debug_label", &self.debug_label)
            .field("view_token", &self.view_token)
            .field("view_ref", &self.view_ref)
            .field("scheduler", &self.scheduler)
            .field("signal_raised", &self.signal_raised)
            .field("pending_updates", &self.pending_updates.len())
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl<T, S, P, U> SessionConnection<T, S, P, U>
where
    T: CompositorTransport<U>,
    S: PresentSignal,
{
    /// Creates a session.
    ///
    /// `mailbox` must be the receiving half of the mailbox whose sender the
    /// transport posts to.
    pub fn new(
        config: SessionConfig,
        transport: T,
        signal: S,
        surface_producer: P,
        mailbox: Mailbox,
        callbacks: SessionCallbacks,
    ) -> Self {
        log::debug!(
            "[{}] session created for {:?} ({:?})",
            config.debug_label,
            config.view_token,
            config.view_ref
        );
        Self {
            debug_label: config.debug_label,
            view_token: config.view_token,
            view_ref: config.view_ref,
            scheduler: FrameScheduler::new(config.scheduler),
            transport,
            signal,
            signal_raised: false,
            surface_producer,
            pending_updates: Vec::new(),
            admitted_updates: 0,
            mailbox,
            callbacks,
            sink: None,
            closed: false,
        }
    }

    /// Installs a trace sink, returning the previous one.
    ///
    /// Events only reach the sink when the `trace` feature is enabled.
    pub fn set_trace_sink(
        &mut self,
        sink: Option<Box<dyn TraceSink>>,
    ) -> Option<Box<dyn TraceSink>> {
        core::mem::replace(&mut self.sink, sink)
    }

    /// Schedules a new frame and returns its plan.
    pub fn request_frame(
        &mut self,
        present_requested_time: TimePoint,
        now: TimePoint,
    ) -> Result<FramePlan, SessionError> {
        self.ensure_open()?;
        let plan = self.scheduler.request_frame(present_requested_time, now);
        self.tracer().latch(&LatchEvent {
            frame_index: plan.frame_index,
            present_requested_time,
            now,
            latch_point: plan.latch_point,
            expected_presentation_time: plan.expected_presentation_time,
            build_time_estimate: plan.build_time_estimate,
        });
        Ok(plan)
    }

    /// Queues a scene update for the next present.
    pub fn enqueue_update(&mut self, update: U) -> Result<(), SessionError> {
        self.ensure_open()?;
        self.pending_updates.push(update);
        Ok(())
    }

    /// Submits the frame built from the queued updates.
    pub fn present(&mut self, now: TimePoint) -> Result<PresentStatus, SessionError> {
        self.ensure_open()?;
        let decision = self.scheduler.on_frame_ready();
        let budget = self.scheduler.budget_state();
        let trace_id = match decision {
            SubmitDecision::Accepted { trace_id, .. } => Some(trace_id),
            SubmitDecision::Deferred => None,
        };
        self.tracer().submit(&SubmitEvent {
            trace_id,
            at: now,
            frames_in_flight: budget.frames_in_flight,
            frames_in_flight_allowed: budget.frames_in_flight_allowed,
        });

        match decision {
            SubmitDecision::Deferred => {
                log::debug!(
                    "[{}] present deferred with {} updates held",
                    self.debug_label,
                    self.pending_updates.len()
                );
                Ok(PresentStatus::Deferred)
            }
            SubmitDecision::Accepted { trace_id, send } => {
                self.admitted_updates = self.pending_updates.len();
                self.set_signal(true, now);
                match send {
                    Some(ticket) => {
                        self.transmit(ticket, now)?;
                        Ok(PresentStatus::Sent {
                            trace_id,
                            session_trace_id: ticket.session_trace_id,
                        })
                    }
                    None => Ok(PresentStatus::Coalesced { trace_id }),
                }
            }
        }
    }

    /// Handles every event the transport has posted.
    pub fn pump(&mut self, now: TimePoint) -> Result<PumpSummary, SessionError> {
        self.ensure_open()?;
        let mut summary = PumpSummary::default();
        while let Some(event) = self.mailbox.pop() {
            summary.events += 1;
            match event {
                SessionEvent::SendComplete => {
                    if let Some(ticket) = self.scheduler.on_send_complete() {
                        self.transmit(ticket, now)?;
                    }
                }
                SessionEvent::FramePresented(info) => {
                    self.frame_presented(&info, now, &mut summary)?;
                }
                SessionEvent::Disconnected => {
                    return Err(self.fail(SessionError::Disconnected));
                }
            }
        }
        Ok(summary)
    }

    /// Merges presentation intervals obtained outside an acknowledgment,
    /// such as an explicit query made before the first present.
    ///
    /// Returns how many intervals were kept.
    pub fn update_forecast<I>(
        &mut self,
        intervals: I,
        now: TimePoint,
    ) -> Result<usize, SessionError>
    where
        I: IntoIterator<Item = PresentationInterval>,
    {
        self.ensure_open()?;
        let kept = self.scheduler.update_forecast(intervals, now);
        self.trace_forecast(now);
        Ok(kept)
    }

    /// Feeds a measured frame build time into the scheduler.
    pub fn observe_build_time(&mut self, build_time: TimeDelta) {
        self.scheduler.observe_build_time(build_time);
    }

    /// The session's debug label.
    #[must_use]
    pub fn debug_label(&self) -> &str {
        &self.debug_label
    }

    /// The view this session renders into.
    #[must_use]
    pub fn view_token(&self) -> ViewToken {
        self.view_token
    }

    /// Identity of the view.
    #[must_use]
    pub fn view_ref(&self) -> ViewRefId {
        self.view_ref
    }

    /// Borrows the surface producer.
    #[must_use]
    pub fn surface_producer(&self) -> &P {
        &self.surface_producer
    }

    /// Mutably borrows the surface producer.
    pub fn surface_producer_mut(&mut self) -> &mut P {
        &mut self.surface_producer
    }

    /// Read-only view of the scheduler.
    #[must_use]
    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    /// Borrows the transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Borrows the signal.
    #[must_use]
    pub fn signal(&self) -> &S {
        &self.signal
    }

    /// Returns `true` while the signal is raised.
    #[must_use]
    pub fn is_signal_raised(&self) -> bool {
        self.signal_raised
    }

    /// Number of queued updates, including those held by a deferred frame.
    #[must_use]
    pub fn pending_updates(&self) -> usize {
        self.pending_updates.len()
    }

    /// Returns `true` once the session has failed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn frame_presented(
        &mut self,
        info: &FramePresentedInfo,
        now: TimePoint,
        summary: &mut PumpSummary,
    ) -> Result<(), SessionError> {
        let outcome = self.scheduler.on_frame_presented(info, now);
        let frames_in_flight = self.scheduler.frames_in_flight();

        for acked in &outcome.acknowledged {
            self.tracer().ack(&AckEvent {
                session_trace_id: acked.session_trace_id,
                at: now,
                actual_presentation_time: info.actual_presentation_time,
                frames_released: acked.frames_released,
                frames_in_flight,
            });
        }
        if !info.future_presentations.is_empty() {
            self.trace_forecast(now);
        }
        if outcome.violations > 0 {
            log::warn!(
                "[{}] {} acknowledgments ignored",
                self.debug_label,
                outcome.violations
            );
        }

        summary.frames_released += outcome.frames_released();
        summary.violations += outcome.violations;

        if frames_in_flight == 0 {
            self.set_signal(false, now);
        }
        (self.callbacks.on_frame_presented)(info);

        if outcome.retry_deferred {
            let status = self.present(now)?;
            log::debug!("[{}] deferred frame retried: {status:?}", self.debug_label);
            summary.retried = Some(status);
        }
        Ok(())
    }

    fn transmit(&mut self, ticket: PresentTicket, now: TimePoint) -> Result<(), SessionError> {
        self.tracer().send(&SendEvent {
            session_trace_id: ticket.session_trace_id,
            at: now,
            frames: ticket.frames,
            target_latch_point: ticket.target_latch_point,
        });
        let admitted = core::mem::take(&mut self.admitted_updates);
        let request = PresentRequest {
            ticket,
            updates: self.pending_updates.drain(..admitted).collect(),
        };
        log::trace!(
            "[{}] present {} with {} updates, {} frames",
            self.debug_label,
            ticket.session_trace_id,
            request.updates.len(),
            ticket.frames
        );
        if let Err(err) = self.transport.present(request) {
            return Err(self.fail(err.into()));
        }
        Ok(())
    }

    fn set_signal(&mut self, raised: bool, now: TimePoint) {
        if self.signal_raised == raised {
            return;
        }
        self.signal_raised = raised;
        self.signal.set_raised(raised);
        self.tracer().signal(&SignalEvent { at: now, raised });
    }

    fn fail(&mut self, err: SessionError) -> SessionError {
        log::error!("[{}] session closed: {err}", self.debug_label);
        self.closed = true;
        self.pending_updates.clear();
        self.admitted_updates = 0;
        if self.signal_raised {
            self.signal_raised = false;
            self.signal.set_raised(false);
        }
        (self.callbacks.on_error)(&err);
        err
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        if self.closed {
            Err(SessionError::Closed)
        } else {
            Ok(())
        }
    }

    fn trace_forecast(&mut self, now: TimePoint) {
        let forecast = self.scheduler.forecast();
        let event = ForecastEvent {
            at: now,
            entries: u32::try_from(forecast.len()).unwrap_or(u32::MAX),
            next_latch_point: forecast.intervals().next().map(|i| i.latch_point),
        };
        self.tracer().forecast(&event);
    }

    fn tracer(&mut self) -> Tracer<'_> {
        match self.sink.as_deref_mut() {
            Some(sink) => Tracer::new(sink),
            None => Tracer::none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::Cell;

    use super::*;
    use crate::error::TransportError;
    use crate::mailbox::{MailboxSender, mailbox};
    use crate::timing::PresentReceipt;
    use crate::transport::LevelSignal;

    const MS: u64 = 1_000_000;
    const T: u64 = 1_000 * MS;

    #[derive(Debug, Default)]
    struct RecordingTransport {
        requests: Vec<PresentRequest<u32>>,
        fail_with: Option<TransportError>,
    }

    impl CompositorTransport<u32> for RecordingTransport {
        fn present(&mut self, request: PresentRequest<u32>) -> Result<(), TransportError> {
            if let Some(err) = self.fail_with {
                return Err(err);
            }
            self.requests.push(request);
            Ok(())
        }
    }

    #[derive(Debug, Default, PartialEq)]
    struct Producer {
        frames_rendered: u32,
    }

    type TestSession = SessionConnection<RecordingTransport, LevelSignal, Producer, u32>;

    struct Fixture {
        session: TestSession,
        tx: MailboxSender,
        errors: Rc<Cell<u32>>,
        acks: Rc<Cell<u32>>,
    }

    fn fixture(max_in_flight: u32) -> Fixture {
        let (tx, rx) = mailbox();
        let errors = Rc::new(Cell::new(0));
        let acks = Rc::new(Cell::new(0));
        let callbacks = {
            let errors = Rc::clone(&errors);
            let acks = Rc::clone(&acks);
            SessionCallbacks::new(
                move |_| errors.set(errors.get() + 1),
                move |_| acks.set(acks.get() + 1),
            )
        };
        let config = SessionConfig::new("test")
            .with_view(ViewToken(7), ViewRefId(8))
            .with_scheduler(SchedulerConfig::new().with_max_frames_in_flight(max_in_flight));
        let session = SessionConnection::new(
            config,
            RecordingTransport::default(),
            LevelSignal::new(),
            Producer::default(),
            rx,
            callbacks,
        );
        Fixture {
            session,
            tx,
            errors,
            acks,
        }
    }

    fn presented(ids: &[u64]) -> FramePresentedInfo {
        FramePresentedInfo {
            actual_presentation_time: TimePoint(T + 32 * MS),
            presented: ids
                .iter()
                .map(|&session_trace_id| PresentReceipt {
                    session_trace_id,
                    latched_time: TimePoint(T + 16 * MS),
                })
                .collect(),
            ..FramePresentedInfo::default()
        }
    }

    #[test]
    fn first_present_sends_updates_and_raises_signal() {
        let mut f = fixture(3);
        let plan = f.session.request_frame(TimePoint(T), TimePoint(T)).unwrap();
        f.session.enqueue_update(1).unwrap();
        f.session.enqueue_update(2).unwrap();

        let status = f.session.present(TimePoint(T)).unwrap();
        assert_eq!(
            status,
            PresentStatus::Sent {
                trace_id: 0,
                session_trace_id: 0
            }
        );
        assert!(f.session.is_signal_raised());
        assert!(f.session.signal().is_raised());

        let request = &f.session.transport().requests[0];
        assert_eq!(request.updates, vec![1, 2]);
        assert!(request.ticket.clear_scene);
        assert_eq!(request.ticket.target_latch_point, plan.latch_point);
        assert_eq!(f.session.pending_updates(), 0);
    }

    #[test]
    fn presents_during_send_are_coalesced_into_one_follow_up() {
        let mut f = fixture(3);
        f.session.enqueue_update(1).unwrap();
        let _ = f.session.present(TimePoint(T)).unwrap();
        f.session.enqueue_update(2).unwrap();
        assert_eq!(
            f.session.present(TimePoint(T)).unwrap(),
            PresentStatus::Coalesced { trace_id: 1 }
        );
        f.session.enqueue_update(3).unwrap();
        let _ = f.session.present(TimePoint(T)).unwrap();
        assert_eq!(f.session.transport().requests.len(), 1);

        f.tx.send_complete();
        f.session.pump(TimePoint(T + MS)).unwrap();

        let requests = &f.session.transport().requests;
        assert_eq!(requests.len(), 2, "exactly one follow-up send");
        assert_eq!(requests[1].updates, vec![2, 3]);
        assert_eq!(requests[1].ticket.frames, 2);
        assert!(!requests[1].ticket.clear_scene);
    }

    #[test]
    fn follow_up_send_leaves_deferred_updates_queued() {
        let mut f = fixture(2);
        f.session.enqueue_update(1).unwrap();
        assert!(matches!(
            f.session.present(TimePoint(T)).unwrap(),
            PresentStatus::Sent { .. }
        ));
        f.session.enqueue_update(2).unwrap();
        assert!(matches!(
            f.session.present(TimePoint(T)).unwrap(),
            PresentStatus::Coalesced { .. }
        ));
        f.session.enqueue_update(3).unwrap();
        assert_eq!(f.session.present(TimePoint(T)).unwrap(), PresentStatus::Deferred);

        f.tx.send_complete();
        f.session.pump(TimePoint(T + MS)).unwrap();

        let requests = &f.session.transport().requests;
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].updates, vec![2]);
        assert_eq!(requests[1].ticket.frames, 1);
        assert_eq!(f.session.pending_updates(), 1, "deferred frame keeps its update");

        // Both presents acknowledged: the retry carries the held update.
        f.tx.send_complete();
        f.tx.frame_presented(presented(&[0, 1]));
        let summary = f.session.pump(TimePoint(T + 40 * MS)).unwrap();
        assert!(matches!(summary.retried, Some(PresentStatus::Sent { .. })));
        assert_eq!(f.session.transport().requests[2].updates, vec![3]);
        assert_eq!(f.session.pending_updates(), 0);
    }

    #[test]
    fn acknowledgment_clears_signal_and_notifies() {
        let mut f = fixture(3);
        let _ = f.session.present(TimePoint(T)).unwrap();
        f.tx.send_complete();
        f.tx.frame_presented(presented(&[0]));

        let summary = f.session.pump(TimePoint(T + 40 * MS)).unwrap();
        assert_eq!(summary.events, 2);
        assert_eq!(summary.frames_released, 1);
        assert_eq!(f.session.scheduler().frames_in_flight(), 0);
        assert!(!f.session.is_signal_raised());
        assert_eq!(f.session.signal().toggles(), 2);
        assert_eq!(f.acks.get(), 1);
    }

    #[test]
    fn deferred_present_is_retried_on_acknowledgment() {
        let mut f = fixture(2);
        let _ = f.session.present(TimePoint(T)).unwrap();
        f.tx.send_complete();
        f.session.pump(TimePoint(T)).unwrap();
        let _ = f.session.present(TimePoint(T)).unwrap();
        f.tx.send_complete();
        f.session.pump(TimePoint(T)).unwrap();

        f.session.enqueue_update(9).unwrap();
        assert_eq!(f.session.present(TimePoint(T)).unwrap(), PresentStatus::Deferred);
        assert_eq!(f.session.pending_updates(), 1, "deferred frame keeps its updates");

        f.tx.frame_presented(presented(&[0, 1]));
        let summary = f.session.pump(TimePoint(T + 40 * MS)).unwrap();
        assert_eq!(summary.frames_released, 2);
        assert_eq!(
            summary.retried,
            Some(PresentStatus::Sent {
                trace_id: 2,
                session_trace_id: 2
            })
        );
        assert_eq!(f.session.scheduler().frames_in_flight(), 1);
        assert_eq!(f.session.transport().requests[2].updates, vec![9]);
        assert!(f.session.is_signal_raised());
    }

    #[test]
    fn disconnection_closes_the_session_once() {
        let mut f = fixture(3);
        let _ = f.session.present(TimePoint(T)).unwrap();
        f.tx.disconnected();

        assert_eq!(f.session.pump(TimePoint(T)), Err(SessionError::Disconnected));
        assert!(f.session.is_closed());
        assert!(!f.session.signal().is_raised());
        assert_eq!(f.errors.get(), 1);

        assert_eq!(f.session.present(TimePoint(T)), Err(SessionError::Closed));
        assert_eq!(f.session.pump(TimePoint(T)), Err(SessionError::Closed));
        assert_eq!(f.errors.get(), 1, "error callback runs once");
    }

    #[test]
    fn transport_failure_surfaces_as_error() {
        let mut f = fixture(3);
        f.session.transport.fail_with = Some(TransportError::Rejected);

        assert_eq!(
            f.session.present(TimePoint(T)),
            Err(SessionError::Transport(TransportError::Rejected))
        );
        assert!(f.session.is_closed());
        assert_eq!(f.errors.get(), 1);
    }

    #[test]
    fn surface_producer_is_lent_by_borrow() {
        let mut f = fixture(3);
        f.session.surface_producer_mut().frames_rendered += 1;
        assert_eq!(f.session.surface_producer().frames_rendered, 1);
        assert_eq!(f.session.debug_label(), "test");
        assert_eq!(f.session.view_token(), ViewToken(7));
        assert_eq!(f.session.view_ref(), ViewRefId(8));
    }
}
