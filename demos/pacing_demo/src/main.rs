// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated frame loop that exercises a full presentation session.
//!
//! Runs 60 frames through a [`SessionConnection`] connected to a
//! [`SimulatedCompositor`]. Most frames build quickly; every fifteenth one
//! stalls past its latch point. Events go to both a
//! [`PrettyPrintSink`] and a [`RecorderSink`], the latch log is graded with a
//! [`PacingTracker`], and the recording is exported as a Chrome trace.
//!
//! Usage: `pacing_demo [--realtime] [trace.json]`.
//!
//! By default time is simulated and the run finishes instantly. With
//! `--realtime` (Linux only) timestamps come from `CLOCK_MONOTONIC`, builds
//! are real sleeps, and the present signal is an eventfd. Set
//! `RUST_LOG=debug` to see the scheduler's own logging.

use std::cell::RefCell;
use std::fs::File;
use std::io::BufWriter;
use std::rc::Rc;

use cadence_core::mailbox::mailbox;
use cadence_core::session::{SessionCallbacks, SessionConfig, SessionConnection};
use cadence_core::time::{TimeDelta, TimePoint};
use cadence_core::transport::{LevelSignal, PresentSignal};
use cadence_core::view::{ViewRefId, ViewToken};
use cadence_debug::pretty::PrettyPrintSink;
use cadence_debug::recorder::RecorderSink;
use cadence_harness::{CompositorModel, PacingTracker, SimulatedCompositor};

const FRAME_COUNT: u64 = 60;
const SIMULATED_FIRST_LATCH: TimePoint = TimePoint::from_millis(1_000);
/// Frames start this long before their nominal latch point.
const LEAD: TimeDelta = TimeDelta::from_millis(10);
const FAST_BUILD: TimeDelta = TimeDelta::from_millis(4);
const SLOW_BUILD: TimeDelta = TimeDelta::from_millis(22);

/// Source of the loop's timestamps.
trait Timeline {
    /// Waits until `t` and returns the current time, which is never earlier.
    fn wait_until(&mut self, t: TimePoint) -> TimePoint;
}

/// Time jumps straight to each requested point.
struct Simulated;

impl Timeline for Simulated {
    fn wait_until(&mut self, t: TimePoint) -> TimePoint {
        t
    }
}

#[cfg(target_os = "linux")]
struct Realtime(cadence_host::HostClock);

#[cfg(target_os = "linux")]
impl Timeline for Realtime {
    fn wait_until(&mut self, t: TimePoint) -> TimePoint {
        match self.0.sleep_until(t) {
            Ok(now) => now.max(t),
            Err(err) => {
                log::warn!("sleep failed: {err}");
                self.0.now().max(t)
            }
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut realtime = false;
    let mut path = None;
    for arg in std::env::args().skip(1) {
        if arg == "--realtime" {
            realtime = true;
        } else {
            path = Some(arg);
        }
    }
    let path = path.unwrap_or_else(|| "pacing_trace.json".into());

    if realtime {
        run_realtime(&path);
    } else {
        run(SIMULATED_FIRST_LATCH, LevelSignal::new(), &mut Simulated, &path);
    }
}

#[cfg(target_os = "linux")]
fn run_realtime(path: &str) {
    use cadence_host::{EventfdSignal, HostClock};

    let clock = HostClock::monotonic();
    let signal = EventfdSignal::new().expect("failed to create eventfd");
    let first_latch = clock.now().saturating_add(TimeDelta::from_millis(50));
    log::info!("running on CLOCK_MONOTONIC, first latch at {first_latch:?}");
    run(first_latch, signal, &mut Realtime(clock), path);
}

#[cfg(not(target_os = "linux"))]
fn run_realtime(path: &str) {
    log::warn!("--realtime needs Linux; running on simulated time");
    run(SIMULATED_FIRST_LATCH, LevelSignal::new(), &mut Simulated, path);
}

fn run<S: PresentSignal>(
    first_latch: TimePoint,
    signal: S,
    timeline: &mut dyn Timeline,
    path: &str,
) {
    let model = CompositorModel::vsync_60hz(first_latch);
    let vsync = model.vsync_interval;

    // -- sinks -------------------------------------------------------------
    let sinks = Rc::new(RefCell::new((
        PrettyPrintSink::new(Box::new(std::io::stdout())).with_origin(first_latch),
        RecorderSink::new(),
    )));

    // -- session -----------------------------------------------------------
    let (sender, inbox) = mailbox();
    let compositor = SimulatedCompositor::new(model, sender);
    let presented = Rc::new(RefCell::new(0_usize));
    let callbacks = {
        let presented = Rc::clone(&presented);
        SessionCallbacks::new(
            |err| log::error!("session error: {err}"),
            move |info| *presented.borrow_mut() += info.presented.len(),
        )
    };
    let config = SessionConfig::new("pacing_demo").with_view(ViewToken(0x5eed), ViewRefId(1));
    let mut session: SessionConnection<_, _, _, u64> = SessionConnection::new(
        config,
        compositor.clone(),
        signal,
        (),
        inbox,
        callbacks,
    );
    let _ = session.set_trace_sink(Some(Box::new(Rc::clone(&sinks))));

    // -- frame loop --------------------------------------------------------
    let start = first_latch.checked_sub(LEAD).expect("first latch is after the lead");
    let mut clock = timeline.wait_until(start);
    session
        .update_forecast(compositor.forecast(clock), clock)
        .expect("session is open");

    for frame in 0..FRAME_COUNT {
        let nominal = first_latch
            .saturating_add(TimeDelta(vsync.nanos() * frame))
            .checked_sub(LEAD)
            .expect("nominal start is after the origin");
        let now = timeline.wait_until(nominal.max(clock));
        compositor.advance_to(now);
        session.pump(now).expect("compositor stays connected");

        let plan = session.request_frame(now, now).expect("session is open");
        let build = if frame % 15 == 14 { SLOW_BUILD } else { FAST_BUILD };
        let built = timeline.wait_until(now.saturating_add(build));

        compositor.advance_to(built);
        session.pump(built).expect("compositor stays connected");
        session.enqueue_update(plan.frame_index).expect("session is open");
        session.observe_build_time(built.saturating_duration_since(now));
        let status = session.present(built).expect("compositor accepts presents");
        log::debug!("frame {frame}: {status:?}");
        clock = built;
    }

    // Drain the tail so every present is acknowledged.
    let end = timeline.wait_until(clock.saturating_add(TimeDelta(vsync.nanos() * 4)));
    compositor.advance_to(end);
    session.pump(end).expect("compositor stays connected");

    // -- grade ---------------------------------------------------------------
    let mut tracker = PacingTracker::<32>::new(vsync);
    let mut report = None;
    for present in compositor.take_latched() {
        report = Some(tracker.observe_latched(&present));
    }
    if let Some(report) = report {
        log::info!(
            "grade {} over {} presents: {} missed, {} janks, last latency {:.2}ms",
            report.grade.as_str(),
            report.total_presents,
            report.missed_presents,
            report.janks,
            report.latency_ms,
        );
    }
    log::info!(
        "frame deltas [{}]",
        tracker.sparkline_ascii(0.0, vsync.as_millis_f64() * 2.0)
    );
    log::info!(
        "{} presents acknowledged, {} updates applied, {} still in flight",
        presented.borrow(),
        compositor.updates_applied(),
        session.scheduler().frames_in_flight(),
    );

    // -- export Chrome trace -----------------------------------------------
    let file = File::create(path).expect("failed to create trace file");
    let mut writer = BufWriter::new(file);
    let sinks = sinks.borrow();
    cadence_debug::chrome::export(sinks.1.as_bytes(), &mut writer)
        .expect("failed to write Chrome trace");

    println!("Wrote {path} ({FRAME_COUNT} frames, {} events)", sinks.1.event_count());
}
