// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Timestamps
//! are printed in milliseconds relative to an origin, which defaults to the
//! first event seen.

use std::io::Write;

use cadence_core::time::TimePoint;
use cadence_core::trace::{
    AckEvent, ForecastEvent, LatchEvent, SendEvent, SignalEvent, SubmitEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    origin: Option<TimePoint>,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self {
            writer,
            origin: None,
        }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            origin: None,
        }
    }

    /// Prints timestamps relative to `origin` instead of the first event.
    #[must_use]
    pub fn with_origin(mut self, origin: TimePoint) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Returns the underlying writer.
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn ms(&mut self, t: TimePoint) -> f64 {
        let origin = *self.origin.get_or_insert(t);
        if t >= origin {
            t.saturating_duration_since(origin).as_millis_f64()
        } else {
            -origin.saturating_duration_since(t).as_millis_f64()
        }
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_latch(&mut self, e: &LatchEvent) {
        let now = self.ms(e.now);
        let latch = self.ms(e.latch_point);
        let expected = match e.expected_presentation_time {
            Some(t) => format!("{:.3}ms", self.ms(t)),
            None => "?".into(),
        };
        let _ = writeln!(
            self.writer,
            "[latch] frame={} now={now:.3}ms latch={latch:.3}ms present={expected} build={:.3}ms",
            e.frame_index,
            e.build_time_estimate.as_millis_f64(),
        );
    }

    fn on_submit(&mut self, e: &SubmitEvent) {
        let at = self.ms(e.at);
        let verdict = match e.trace_id {
            Some(id) => format!("accepted id={id}"),
            None => "DEFERRED".into(),
        };
        let _ = writeln!(
            self.writer,
            "[submit] {verdict} at {at:.3}ms in_flight={}/{}",
            e.frames_in_flight, e.frames_in_flight_allowed,
        );
    }

    fn on_send(&mut self, e: &SendEvent) {
        let at = self.ms(e.at);
        let target = self.ms(e.target_latch_point);
        let _ = writeln!(
            self.writer,
            "[send] present={} frames={} at {at:.3}ms target={target:.3}ms",
            e.session_trace_id, e.frames,
        );
    }

    fn on_ack(&mut self, e: &AckEvent) {
        let at = self.ms(e.at);
        let shown = self.ms(e.actual_presentation_time);
        let _ = writeln!(
            self.writer,
            "[ack] present={} at {at:.3}ms shown={shown:.3}ms released={} in_flight={}",
            e.session_trace_id, e.frames_released, e.frames_in_flight,
        );
    }

    fn on_forecast(&mut self, e: &ForecastEvent) {
        let at = self.ms(e.at);
        let next = match e.next_latch_point {
            Some(t) => format!("{:.3}ms", self.ms(t)),
            None => "none".into(),
        };
        let _ = writeln!(
            self.writer,
            "[forecast] at {at:.3}ms entries={} next={next}",
            e.entries,
        );
    }

    fn on_signal(&mut self, e: &SignalEvent) {
        let at = self.ms(e.at);
        let level = if e.raised { "raised" } else { "cleared" };
        let _ = writeln!(self.writer, "[signal] {level} at {at:.3}ms");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pretty_print_submit_and_signal() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new()).with_origin(TimePoint(0));
        sink.on_submit(&SubmitEvent {
            trace_id: None,
            at: TimePoint(2_000_000),
            frames_in_flight: 3,
            frames_in_flight_allowed: 3,
        });
        sink.on_signal(&SignalEvent {
            at: TimePoint(4_500_000),
            raised: false,
        });
        let output = String::from_utf8(sink.into_writer()).unwrap();
        assert!(output.contains("[submit] DEFERRED at 2.000ms in_flight=3/3"), "got: {output}");
        assert!(output.contains("[signal] cleared at 4.500ms"), "got: {output}");
    }

    #[test]
    fn origin_defaults_to_first_event() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_signal(&SignalEvent {
            at: TimePoint(9_000_000),
            raised: true,
        });
        let output = String::from_utf8(sink.into_writer()).unwrap();
        assert!(output.contains("raised at 0.000ms"), "got: {output}");
    }
}
