// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! Each present becomes an async slice from its send to its acknowledgment,
//! so coalescing and squashing show up as overlapping or missing slices.
//! The frames-in-flight count is exported as a counter track.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use cadence_core::time::TimePoint;

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::Latch(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Latch",
                    "cat": "Scheduler",
                    "ts": to_us(e.now),
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "latch_point_us": to_us(e.latch_point),
                        "expected_presentation_us": e.expected_presentation_time.map(to_us),
                        "build_time_us": e.build_time_estimate.nanos() as f64 / 1000.0,
                    }
                }));
            }
            RecordedEvent::Submit(e) => {
                let name = if e.accepted() { "Submit" } else { "Deferred" };
                events.push(json!({
                    "ph": "i",
                    "name": name,
                    "cat": "Budget",
                    "ts": to_us(e.at),
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "trace_id": e.trace_id,
                        "frames_in_flight_allowed": e.frames_in_flight_allowed,
                    }
                }));
                events.push(in_flight_counter(e.at, e.frames_in_flight));
            }
            RecordedEvent::Send(e) => {
                events.push(json!({
                    "ph": "b",
                    "name": "Present",
                    "cat": "Transport",
                    "id": e.session_trace_id,
                    "ts": to_us(e.at),
                    "pid": 0,
                    "tid": 1,
                    "args": {
                        "frames": e.frames,
                        "target_latch_point_us": to_us(e.target_latch_point),
                    }
                }));
            }
            RecordedEvent::Ack(e) => {
                events.push(json!({
                    "ph": "e",
                    "name": "Present",
                    "cat": "Transport",
                    "id": e.session_trace_id,
                    "ts": to_us(e.at),
                    "pid": 0,
                    "tid": 1,
                    "args": {
                        "actual_presentation_us": to_us(e.actual_presentation_time),
                        "frames_released": e.frames_released,
                    }
                }));
                events.push(in_flight_counter(e.at, e.frames_in_flight));
            }
            RecordedEvent::Forecast(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Forecast",
                    "cat": "Scheduler",
                    "ts": to_us(e.at),
                    "pid": 0,
                    "tid": 0,
                    "s": "p",
                    "args": {
                        "entries": e.entries,
                        "next_latch_point_us": e.next_latch_point.map(to_us),
                    }
                }));
            }
            RecordedEvent::Signal(e) => {
                events.push(json!({
                    "ph": "C",
                    "name": "PresentSignal",
                    "ts": to_us(e.at),
                    "pid": 0,
                    "args": { "raised": u8::from(e.raised) }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn in_flight_counter(at: TimePoint, frames_in_flight: u32) -> Value {
    json!({
        "ph": "C",
        "name": "FramesInFlight",
        "ts": to_us(at),
        "pid": 0,
        "args": { "frames": frames_in_flight }
    })
}

fn to_us(t: TimePoint) -> f64 {
    t.nanos() as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use cadence_core::trace::{AckEvent, SendEvent, SubmitEvent, TraceSink};

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_submit(&SubmitEvent {
            trace_id: Some(0),
            at: TimePoint(1_000_000),
            frames_in_flight: 1,
            frames_in_flight_allowed: 3,
        });
        rec.on_send(&SendEvent {
            session_trace_id: 4,
            at: TimePoint(1_000_000),
            frames: 1,
            target_latch_point: TimePoint(16_000_000),
        });
        rec.on_ack(&AckEvent {
            session_trace_id: 4,
            at: TimePoint(33_000_000),
            actual_presentation_time: TimePoint(32_000_000),
            frames_released: 1,
            frames_in_flight: 0,
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        // Submit + counter, send, ack + counter.
        assert_eq!(parsed.len(), 5);

        assert_eq!(parsed[0]["name"], "Submit");
        assert_eq!(parsed[1]["ph"], "C");
        assert_eq!(parsed[1]["args"]["frames"], 1);

        // The present is an async slice keyed by its session id.
        assert_eq!(parsed[2]["ph"], "b");
        assert_eq!(parsed[3]["ph"], "e");
        assert_eq!(parsed[2]["id"], parsed[3]["id"]);
        assert_eq!(parsed[3]["ts"], 33_000.0);

        assert_eq!(parsed[4]["args"]["frames"], 0);
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.is_empty());
    }
}
