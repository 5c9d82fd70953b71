// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic compositor simulation and pacing grades for Cadence.
//!
//! [`SimulatedCompositor`] stands in for a real compositor connection: it
//! implements [`CompositorTransport`](cadence_core::transport::CompositorTransport),
//! latches presents on a vsync grid, and posts completions and
//! acknowledgments to a session's mailbox as simulated time advances.
//! [`PacingTracker`] turns the resulting latch log into latency, miss and
//! jank figures with a letter grade.

#![no_std]

extern crate alloc;

mod compositor;
mod pacing;

pub use compositor::{CompositorModel, LatchedPresent, SimulatedCompositor};
pub use pacing::{PacingGrade, PacingReport, PacingSample, PacingTracker};

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use cadence_core::error::SessionError;
    use cadence_core::mailbox::mailbox;
    use cadence_core::scheduler::SchedulerConfig;
    use cadence_core::session::{
        PresentStatus, SessionCallbacks, SessionConfig, SessionConnection,
    };
    use cadence_core::time::{TimeDelta, TimePoint};
    use cadence_core::transport::LevelSignal;

    use super::*;

    type Session = SessionConnection<SimulatedCompositor, LevelSignal, (), u32>;

    const T0: TimePoint = TimePoint::from_millis(100);
    const VSYNC: TimeDelta = TimeDelta(16_666_667);
    const BUILD: TimeDelta = TimeDelta::from_millis(4);

    fn connect(
        model: CompositorModel,
        scheduler: SchedulerConfig,
    ) -> (Session, SimulatedCompositor) {
        let (sender, mailbox) = mailbox();
        let compositor = SimulatedCompositor::new(model, sender);
        let session = SessionConnection::new(
            SessionConfig::new("harness").with_scheduler(scheduler),
            compositor.clone(),
            LevelSignal::new(),
            (),
            mailbox,
            SessionCallbacks::default(),
        );
        (session, compositor)
    }

    fn at(t: TimePoint, session: &mut Session, compositor: &SimulatedCompositor) {
        compositor.advance_to(t);
        let summary = session.pump(t).unwrap();
        assert_eq!(summary.violations, 0);
    }

    fn vsync(k: u64) -> TimePoint {
        T0.saturating_add(TimeDelta(VSYNC.nanos() * k))
    }

    #[test]
    fn steady_frames_hit_every_target() {
        let (mut session, compositor) =
            connect(CompositorModel::vsync_60hz(T0), SchedulerConfig::new());
        let start = T0.checked_sub(TimeDelta::from_millis(10)).unwrap();
        let kept = session.update_forecast(compositor.forecast(start), start).unwrap();
        assert_eq!(kept, 4);

        for k in 0..60_u32 {
            let now = vsync(u64::from(k)).checked_sub(TimeDelta::from_millis(10)).unwrap();
            at(now, &mut session, &compositor);
            let plan = session.request_frame(now, now).unwrap();
            assert_eq!(plan.latch_point, vsync(u64::from(k)));

            let built = now.saturating_add(BUILD);
            at(built, &mut session, &compositor);
            session.enqueue_update(k).unwrap();
            session.observe_build_time(BUILD);
            let status = session.present(built).unwrap();
            assert!(matches!(status, PresentStatus::Sent { .. }), "{status:?}");
        }
        at(vsync(61), &mut session, &compositor);

        assert_eq!(session.scheduler().frames_in_flight(), 0);
        assert!(!session.is_signal_raised());
        assert_eq!(compositor.protocol_violations(), 0);
        assert_eq!(compositor.scene_clears(), 1);
        assert_eq!(compositor.updates_applied(), 60);

        let latched = compositor.take_latched();
        assert_eq!(latched.len(), 60);
        assert!(latched.iter().all(|p| !p.missed_target()));

        let mut tracker = PacingTracker::<16>::new(VSYNC);
        let reports: Vec<_> = latched.iter().map(|p| tracker.observe_latched(p)).collect();
        let last = reports.last().unwrap();
        assert_eq!(last.grade, PacingGrade::A);
        assert_eq!(last.janks, 0);
    }

    #[test]
    fn deferred_frame_is_sent_after_acknowledgment() {
        let (mut session, compositor) = connect(
            CompositorModel::vsync_60hz(T0),
            SchedulerConfig::new().with_max_frames_in_flight(1),
        );
        let first = T0.checked_sub(TimeDelta::from_millis(6)).unwrap();
        at(first, &mut session, &compositor);
        let _ = session.request_frame(first, first).unwrap();
        session.enqueue_update(1).unwrap();
        assert!(matches!(session.present(first).unwrap(), PresentStatus::Sent { .. }));

        let second = T0.checked_sub(TimeDelta::from_millis(5)).unwrap();
        at(second, &mut session, &compositor);
        let _ = session.request_frame(second, second).unwrap();
        session.enqueue_update(2).unwrap();
        assert_eq!(session.present(second).unwrap(), PresentStatus::Deferred);
        assert_eq!(session.pending_updates(), 1);

        compositor.advance_to(T0);
        let summary = session.pump(T0).unwrap();
        assert_eq!(summary.frames_released, 1);
        assert!(matches!(summary.retried, Some(PresentStatus::Sent { .. })));
        assert_eq!(session.pending_updates(), 0);

        at(vsync(1), &mut session, &compositor);
        assert_eq!(compositor.take_latched().len(), 2);
        assert_eq!(compositor.updates_applied(), 2);
        assert_eq!(compositor.protocol_violations(), 0);
        assert_eq!(session.scheduler().frames_in_flight(), 0);
    }

    #[test]
    fn frames_coalesced_during_a_slow_send_are_squashed_together() {
        let model = CompositorModel {
            send_latency: TimeDelta::from_millis(5),
            squash: true,
            ..CompositorModel::vsync_60hz(T0)
        };
        let (mut session, compositor) = connect(model, SchedulerConfig::new());
        let t = T0.checked_sub(TimeDelta::from_millis(20)).unwrap();
        at(t, &mut session, &compositor);
        assert!(matches!(session.present(t).unwrap(), PresentStatus::Sent { .. }));

        let t1 = t.saturating_add(TimeDelta::from_millis(1));
        at(t1, &mut session, &compositor);
        session.enqueue_update(7).unwrap();
        assert!(matches!(session.present(t1).unwrap(), PresentStatus::Coalesced { .. }));

        // Send completes and the follow-up goes out with the coalesced frame.
        let t5 = t.saturating_add(TimeDelta::from_millis(5));
        at(t5, &mut session, &compositor);
        assert_eq!(session.scheduler().outstanding_presents().len(), 2);
        assert_eq!(compositor.updates_applied(), 1);

        compositor.advance_to(T0);
        let summary = session.pump(T0).unwrap();
        assert_eq!(summary.frames_released, 2);
        assert_eq!(summary.violations, 0);
        assert_eq!(session.scheduler().frames_in_flight(), 0);
        assert!(!session.is_signal_raised());
        assert_eq!(compositor.take_latched().len(), 2);
    }

    #[test]
    fn present_credit_lowers_the_ceiling() {
        let model = CompositorModel {
            presents_allowed: Some(1),
            ..CompositorModel::vsync_60hz(T0)
        };
        let (mut session, compositor) = connect(model, SchedulerConfig::new());
        let t = T0.checked_sub(TimeDelta::from_millis(8)).unwrap();
        at(t, &mut session, &compositor);
        let _ = session.present(t).unwrap();
        assert_eq!(session.scheduler().budget_state().frames_in_flight_allowed, 3);

        at(T0, &mut session, &compositor);
        assert_eq!(session.scheduler().budget_state().frames_in_flight_allowed, 1);
    }

    #[test]
    fn disconnection_closes_the_session() {
        let (mut session, compositor) =
            connect(CompositorModel::vsync_60hz(T0), SchedulerConfig::new());
        let t = T0.checked_sub(TimeDelta::from_millis(8)).unwrap();
        at(t, &mut session, &compositor);
        let _ = session.present(t).unwrap();

        compositor.disconnect();
        assert_eq!(session.pump(T0), Err(SessionError::Disconnected));
        assert!(session.is_closed());
        assert_eq!(session.present(T0), Err(SessionError::Closed));
        compositor.advance_to(vsync(2));
        assert!(compositor.take_latched().is_empty());
    }
}
