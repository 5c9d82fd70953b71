// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing hooks and trace-correlation ids.
//!
//! [`TraceSink`] receives one call per scheduling decision: latch selection,
//! frame submission (accepted or deferred), transport sends,
//! acknowledgments, forecast replacement and signal toggles. All methods
//! default to no-ops.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. Without the `trace`
//! feature every `Tracer` method compiles to nothing; with it, each method
//! costs one `Option` branch.
//!
//! [`TraceCounters`] hands out the ids used to correlate a submission with
//! its eventual acknowledgment. They are observability metadata only and
//! never feed back into a scheduling decision.

use alloc::rc::Rc;
use core::cell::RefCell;

use crate::time::{TimeDelta, TimePoint};

// ---------------------------------------------------------------------------
// Correlation ids
// ---------------------------------------------------------------------------

/// Monotonic counters correlating submissions with acknowledgments.
///
/// The local id advances once per accepted frame submission. The session id
/// mirrors the compositor's own counter, which starts at zero and advances
/// once per present call on the connection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TraceCounters {
    next_present_trace_id: u64,
    next_present_session_trace_id: u64,
    processed_present_session_trace_id: Option<u64>,
}

impl TraceCounters {
    /// Creates counters starting at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next_present_trace_id: 0,
            next_present_session_trace_id: 0,
            processed_present_session_trace_id: None,
        }
    }

    /// Returns a fresh local id for one frame submission.
    pub fn next_present_trace_id(&mut self) -> u64 {
        let id = self.next_present_trace_id;
        self.next_present_trace_id += 1;
        id
    }

    /// Returns the session id the compositor will assign to the next present.
    pub fn next_present_session_trace_id(&mut self) -> u64 {
        let id = self.next_present_session_trace_id;
        self.next_present_session_trace_id += 1;
        id
    }

    /// Records that the compositor has acknowledged `id`.
    ///
    /// Returns `false` (and leaves the watermark alone) if `id` is not newer
    /// than the last processed id.
    pub fn mark_processed(&mut self, id: u64) -> bool {
        match self.processed_present_session_trace_id {
            Some(done) if id <= done => false,
            _ => {
                self.processed_present_session_trace_id = Some(id);
                true
            }
        }
    }

    /// Highest session id acknowledged so far.
    #[must_use]
    pub const fn processed_present_session_trace_id(&self) -> Option<u64> {
        self.processed_present_session_trace_id
    }

    /// Number of local ids handed out.
    #[must_use]
    pub const fn present_trace_ids_issued(&self) -> u64 {
        self.next_present_trace_id
    }

    /// Number of session ids handed out.
    #[must_use]
    pub const fn present_session_trace_ids_issued(&self) -> u64 {
        self.next_present_session_trace_id
    }
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a latch point is chosen for a new frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LatchEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// When the frame was requested.
    pub present_requested_time: TimePoint,
    /// Time of the decision.
    pub now: TimePoint,
    /// Chosen latch point.
    pub latch_point: TimePoint,
    /// Forecast presentation time for the latch point, if the compositor
    /// reported one.
    pub expected_presentation_time: Option<TimePoint>,
    /// Build-time estimate used for the decision.
    pub build_time_estimate: TimeDelta,
}

/// Emitted when a finished frame asks to be submitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubmitEvent {
    /// Local trace id, or `None` when the frame was deferred.
    pub trace_id: Option<u64>,
    /// Time of the decision.
    pub at: TimePoint,
    /// Frames in flight after the decision.
    pub frames_in_flight: u32,
    /// Ceiling at the time of the decision.
    pub frames_in_flight_allowed: u32,
}

impl SubmitEvent {
    /// Returns `true` if the frame was admitted by the budget.
    #[must_use]
    pub const fn accepted(&self) -> bool {
        self.trace_id.is_some()
    }
}

/// Emitted when a present request is handed to the transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SendEvent {
    /// Compositor-side trace id of the present.
    pub session_trace_id: u64,
    /// Time of the send.
    pub at: TimePoint,
    /// Frames coalesced into this present.
    pub frames: u32,
    /// Latch point the present targets.
    pub target_latch_point: TimePoint,
}

/// Emitted for each acknowledged present.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AckEvent {
    /// Compositor-side trace id of the present.
    pub session_trace_id: u64,
    /// Time the acknowledgment was processed.
    pub at: TimePoint,
    /// When the compositor put the frame on screen.
    pub actual_presentation_time: TimePoint,
    /// Frames released from the budget.
    pub frames_released: u32,
    /// Frames still in flight afterwards.
    pub frames_in_flight: u32,
}

/// Emitted when the forecast window is replaced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ForecastEvent {
    /// Time of the update.
    pub at: TimePoint,
    /// Retained entries.
    pub entries: u32,
    /// Earliest retained latch point.
    pub next_latch_point: Option<TimePoint>,
}

/// Emitted when the presentation signal changes level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SignalEvent {
    /// Time of the toggle.
    pub at: TimePoint,
    /// New level.
    pub raised: bool,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives scheduling trace events.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a latch point is chosen.
    fn on_latch(&mut self, e: &LatchEvent) {
        _ = e;
    }

    /// Called when a frame submission is accepted or deferred.
    fn on_submit(&mut self, e: &SubmitEvent) {
        _ = e;
    }

    /// Called when a present request goes to the transport.
    fn on_send(&mut self, e: &SendEvent) {
        _ = e;
    }

    /// Called per acknowledged present.
    fn on_ack(&mut self, e: &AckEvent) {
        _ = e;
    }

    /// Called when the forecast window is replaced.
    fn on_forecast(&mut self, e: &ForecastEvent) {
        _ = e;
    }

    /// Called when the presentation signal toggles.
    fn on_signal(&mut self, e: &SignalEvent) {
        _ = e;
    }
}

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

macro_rules! forward_sink {
    ($($hook:ident: $event:ty),* $(,)?) => {
        /// Shared sink: lets the owner keep a handle while a session holds
        /// another.
        impl<S: TraceSink + ?Sized> TraceSink for Rc<RefCell<S>> {
            $(
                fn $hook(&mut self, e: &$event) {
                    self.borrow_mut().$hook(e);
                }
            )*
        }

        /// Fan-out: both sinks see every event, first one first.
        impl<A: TraceSink, B: TraceSink> TraceSink for (A, B) {
            $(
                fn $hook(&mut self, e: &$event) {
                    self.0.$hook(e);
                    self.1.$hook(e);
                }
            )*
        }
    };
}

forward_sink!(
    on_latch: LatchEvent,
    on_submit: SubmitEvent,
    on_send: SendEvent,
    on_ack: AckEvent,
    on_forecast: ForecastEvent,
    on_signal: SignalEvent,
);

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

macro_rules! tracer_method {
    ($(#[$doc:meta])* $name:ident, $hook:ident, $event:ty) => {
        $(#[$doc])*
        #[inline]
        pub fn $name(&mut self, e: &$event) {
            #[cfg(feature = "trace")]
            if let Some(s) = &mut self.sink {
                s.$hook(e);
            }
            #[cfg(not(feature = "trace"))]
            {
                _ = e;
            }
        }
    };
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    tracer_method!(
        /// Emits a [`LatchEvent`].
        latch, on_latch, LatchEvent
    );
    tracer_method!(
        /// Emits a [`SubmitEvent`].
        submit, on_submit, SubmitEvent
    );
    tracer_method!(
        /// Emits a [`SendEvent`].
        send, on_send, SendEvent
    );
    tracer_method!(
        /// Emits an [`AckEvent`].
        ack, on_ack, AckEvent
    );
    tracer_method!(
        /// Emits a [`ForecastEvent`].
        forecast, on_forecast, ForecastEvent
    );
    tracer_method!(
        /// Emits a [`SignalEvent`].
        signal, on_signal, SignalEvent
    );
}
