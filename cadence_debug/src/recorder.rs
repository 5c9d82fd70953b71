// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].

use cadence_core::time::{TimeDelta, TimePoint};
use cadence_core::trace::{
    AckEvent, ForecastEvent, LatchEvent, SendEvent, SignalEvent, SubmitEvent, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_LATCH: u8 = 1;
const TAG_SUBMIT: u8 = 2;
const TAG_SEND: u8 = 3;
const TAG_ACK: u8 = 4;
const TAG_FORECAST: u8 = 5;
const TAG_SIGNAL: u8 = 6;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
    events: usize,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Number of events recorded.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.events
    }

    // -- encoding helpers --------------------------------------------------

    fn begin(&mut self, tag: u8) {
        self.events += 1;
        self.write_u8(tag);
    }

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_option_u64(&mut self, v: Option<u64>) {
        match v {
            Some(val) => {
                self.write_u8(1);
                self.write_u64(val);
            }
            None => {
                self.write_u8(0);
                self.write_u64(0);
            }
        }
    }
}

impl TraceSink for RecorderSink {
    fn on_latch(&mut self, e: &LatchEvent) {
        self.begin(TAG_LATCH);
        self.write_u64(e.frame_index);
        self.write_u64(e.present_requested_time.nanos());
        self.write_u64(e.now.nanos());
        self.write_u64(e.latch_point.nanos());
        self.write_option_u64(e.expected_presentation_time.map(TimePoint::nanos));
        self.write_u64(e.build_time_estimate.nanos());
    }

    fn on_submit(&mut self, e: &SubmitEvent) {
        self.begin(TAG_SUBMIT);
        self.write_option_u64(e.trace_id);
        self.write_u64(e.at.nanos());
        self.write_u32(e.frames_in_flight);
        self.write_u32(e.frames_in_flight_allowed);
    }

    fn on_send(&mut self, e: &SendEvent) {
        self.begin(TAG_SEND);
        self.write_u64(e.session_trace_id);
        self.write_u64(e.at.nanos());
        self.write_u32(e.frames);
        self.write_u64(e.target_latch_point.nanos());
    }

    fn on_ack(&mut self, e: &AckEvent) {
        self.begin(TAG_ACK);
        self.write_u64(e.session_trace_id);
        self.write_u64(e.at.nanos());
        self.write_u64(e.actual_presentation_time.nanos());
        self.write_u32(e.frames_released);
        self.write_u32(e.frames_in_flight);
    }

    fn on_forecast(&mut self, e: &ForecastEvent) {
        self.begin(TAG_FORECAST);
        self.write_u64(e.at.nanos());
        self.write_u32(e.entries);
        self.write_option_u64(e.next_latch_point.map(TimePoint::nanos));
    }

    fn on_signal(&mut self, e: &SignalEvent) {
        self.begin(TAG_SIGNAL);
        self.write_u64(e.at.nanos());
        self.write_u8(u8::from(e.raised));
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    /// A [`LatchEvent`].
    Latch(LatchEvent),
    /// A [`SubmitEvent`].
    Submit(SubmitEvent),
    /// A [`SendEvent`].
    Send(SendEvent),
    /// An [`AckEvent`].
    Ack(AckEvent),
    /// A [`ForecastEvent`].
    Forecast(ForecastEvent),
    /// A [`SignalEvent`].
    Signal(SignalEvent),
}

impl RecordedEvent {
    /// When the event happened.
    #[must_use]
    pub fn at(&self) -> TimePoint {
        match self {
            Self::Latch(e) => e.now,
            Self::Submit(e) => e.at,
            Self::Send(e) => e.at,
            Self::Ack(e) => e.at,
            Self::Forecast(e) => e.at,
            Self::Signal(e) => e.at,
        }
    }
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?.try_into().ok()?;
        self.pos += N;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[v]| v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_time(&mut self) -> Option<TimePoint> {
        self.read_u64().map(TimePoint)
    }

    fn read_option_u64(&mut self) -> Option<Option<u64>> {
        let present = self.read_u8()?;
        let val = self.read_u64()?;
        Some(if present != 0 { Some(val) } else { None })
    }

    fn decode_latch(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Latch(LatchEvent {
            frame_index: self.read_u64()?,
            present_requested_time: self.read_time()?,
            now: self.read_time()?,
            latch_point: self.read_time()?,
            expected_presentation_time: self.read_option_u64()?.map(TimePoint),
            build_time_estimate: TimeDelta(self.read_u64()?),
        }))
    }

    fn decode_submit(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Submit(SubmitEvent {
            trace_id: self.read_option_u64()?,
            at: self.read_time()?,
            frames_in_flight: self.read_u32()?,
            frames_in_flight_allowed: self.read_u32()?,
        }))
    }

    fn decode_send(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Send(SendEvent {
            session_trace_id: self.read_u64()?,
            at: self.read_time()?,
            frames: self.read_u32()?,
            target_latch_point: self.read_time()?,
        }))
    }

    fn decode_ack(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Ack(AckEvent {
            session_trace_id: self.read_u64()?,
            at: self.read_time()?,
            actual_presentation_time: self.read_time()?,
            frames_released: self.read_u32()?,
            frames_in_flight: self.read_u32()?,
        }))
    }

    fn decode_forecast(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Forecast(ForecastEvent {
            at: self.read_time()?,
            entries: self.read_u32()?,
            next_latch_point: self.read_option_u64()?.map(TimePoint),
        }))
    }

    fn decode_signal(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Signal(SignalEvent {
            at: self.read_time()?,
            raised: self.read_u8()? != 0,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_LATCH => self.decode_latch(),
            TAG_SUBMIT => self.decode_submit(),
            TAG_SEND => self.decode_send(),
            TAG_ACK => self.decode_ack(),
            TAG_FORECAST => self.decode_forecast(),
            TAG_SIGNAL => self.decode_signal(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_latch() -> LatchEvent {
        LatchEvent {
            frame_index: 7,
            present_requested_time: TimePoint(1_000_000),
            now: TimePoint(1_000_500),
            latch_point: TimePoint(17_666_667),
            expected_presentation_time: Some(TimePoint(34_333_334)),
            build_time_estimate: TimeDelta(2_500_000),
        }
    }

    #[test]
    fn recorded_session_decodes_in_order() {
        let mut rec = RecorderSink::new();
        rec.on_latch(&sample_latch());
        rec.on_submit(&SubmitEvent {
            trace_id: Some(0),
            at: TimePoint(4_000_000),
            frames_in_flight: 1,
            frames_in_flight_allowed: 3,
        });
        rec.on_signal(&SignalEvent {
            at: TimePoint(4_000_000),
            raised: true,
        });
        rec.on_send(&SendEvent {
            session_trace_id: 0,
            at: TimePoint(4_000_000),
            frames: 1,
            target_latch_point: TimePoint(17_666_667),
        });
        rec.on_ack(&AckEvent {
            session_trace_id: 0,
            at: TimePoint(35_000_000),
            actual_presentation_time: TimePoint(34_333_334),
            frames_released: 1,
            frames_in_flight: 0,
        });
        assert_eq!(rec.event_count(), 5);

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 5);
        assert_eq!(events[0], RecordedEvent::Latch(sample_latch()));
        assert!(matches!(events[1], RecordedEvent::Submit(e) if e.accepted()));
        assert!(matches!(events[2], RecordedEvent::Signal(e) if e.raised));
        assert!(matches!(events[3], RecordedEvent::Send(e) if e.frames == 1));
        match &events[4] {
            RecordedEvent::Ack(e) => {
                assert_eq!(e.actual_presentation_time, TimePoint(34_333_334));
                assert_eq!(e.frames_in_flight, 0);
            }
            other => panic!("expected Ack, got {other:?}"),
        }
        let times: Vec<_> = events.iter().map(RecordedEvent::at).collect();
        assert!(times.is_sorted(), "timestamps out of order: {times:?}");
    }

    #[test]
    fn deferred_submit_and_empty_forecast_keep_their_nones() {
        let mut rec = RecorderSink::new();
        rec.on_submit(&SubmitEvent {
            trace_id: None,
            at: TimePoint(10),
            frames_in_flight: 3,
            frames_in_flight_allowed: 3,
        });
        rec.on_forecast(&ForecastEvent {
            at: TimePoint(11),
            entries: 0,
            next_latch_point: None,
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert!(matches!(events[0], RecordedEvent::Submit(e) if e.trace_id.is_none()));
        assert!(matches!(events[1], RecordedEvent::Forecast(e) if e.next_latch_point.is_none()));
    }

    #[test]
    fn truncated_recording_stops_cleanly() {
        let mut rec = RecorderSink::new();
        rec.on_latch(&sample_latch());
        rec.on_latch(&sample_latch());
        let bytes = rec.into_bytes();
        let events: Vec<_> = decode(&bytes[..bytes.len() - 3]).collect();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        let events: Vec<_> = decode(&[]).collect();
        assert!(events.is_empty());
    }
}
