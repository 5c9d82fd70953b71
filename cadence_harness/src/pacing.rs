// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pacing metrics and grading.

use alloc::string::String;

use cadence_core::time::{TimeDelta, TimePoint};

use crate::compositor::LatchedPresent;

/// Per-present metrics fed into [`PacingTracker::observe`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PacingSample {
    /// Time from the present reaching the compositor to it being shown, in ms.
    pub latency_ms: f64,
    /// Time since the previously shown present, in ms. Zero when both were
    /// latched together.
    pub frame_delta_ms: f64,
    /// The present was latched after the latch point it targeted.
    pub missed_target: bool,
}

/// Letter grade for pacing quality.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PacingGrade {
    /// Low latency, almost no misses.
    A,
    /// Good pacing with occasional misses.
    B,
    /// Degraded but usable.
    C,
    /// Poor pacing.
    D,
}

impl PacingGrade {
    /// Returns a short label for reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }
}

/// Aggregated report returned by [`PacingTracker::observe`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PacingReport {
    /// Current grade.
    pub grade: PacingGrade,
    /// Missed targets per 1000 observed presents.
    pub miss_rate_per_1000: f64,
    /// Current present's latency in ms.
    pub latency_ms: f64,
    /// Total presents observed.
    pub total_presents: u64,
    /// Presents that missed their target.
    pub missed_presents: u64,
    /// Gaps longer than one and a half vsync intervals.
    pub janks: u64,
}

/// Rolling pacing tracker with a fixed-size frame-delta history.
///
/// The history needs at least one slot:
///
/// ```compile_fail
/// use cadence_core::time::TimeDelta;
/// let _ = cadence_harness::PacingTracker::<0>::new(TimeDelta(16_666_667));
/// ```
#[derive(Debug)]
pub struct PacingTracker<const N: usize> {
    vsync_ms: f64,
    deltas_ms: [f64; N],
    cursor: usize,
    last_presented: Option<TimePoint>,
    total_presents: u64,
    missed_presents: u64,
    janks: u64,
}

impl<const N: usize> PacingTracker<N> {
    /// Creates a tracker for the given vsync interval. The history starts
    /// filled with one interval per slot.
    #[must_use]
    pub fn new(vsync_interval: TimeDelta) -> Self {
        const { assert!(N > 0, "PacingTracker needs at least one history slot") };
        let vsync_ms = vsync_interval.as_millis_f64();
        Self {
            vsync_ms,
            deltas_ms: [vsync_ms; N],
            cursor: 0,
            last_presented: None,
            total_presents: 0,
            missed_presents: 0,
            janks: 0,
        }
    }

    /// Observes one latched present from a
    /// [`SimulatedCompositor`](crate::SimulatedCompositor).
    pub fn observe_latched(&mut self, present: &LatchedPresent) -> PacingReport {
        let frame_delta_ms = match self.last_presented {
            Some(prev) => present.presented_at.saturating_duration_since(prev).as_millis_f64(),
            None => self.vsync_ms,
        };
        self.last_presented = Some(present.presented_at);
        self.observe(PacingSample {
            latency_ms: present
                .presented_at
                .saturating_duration_since(present.received_at)
                .as_millis_f64(),
            frame_delta_ms,
            missed_target: present.missed_target(),
        })
    }

    /// Observes one present and returns an updated report.
    pub fn observe(&mut self, sample: PacingSample) -> PacingReport {
        self.total_presents = self.total_presents.saturating_add(1);
        self.deltas_ms[self.cursor % N] = sample.frame_delta_ms;
        self.cursor = (self.cursor + 1) % N;

        if sample.missed_target {
            self.missed_presents = self.missed_presents.saturating_add(1);
        }
        if sample.frame_delta_ms > self.vsync_ms * 1.5 {
            self.janks = self.janks.saturating_add(1);
        }

        let miss_rate = self.missed_presents as f64 * 1000.0 / self.total_presents as f64;
        let latency_vsyncs = sample.latency_ms / self.vsync_ms;

        PacingReport {
            grade: grade_for(latency_vsyncs, miss_rate),
            miss_rate_per_1000: miss_rate,
            latency_ms: sample.latency_ms,
            total_presents: self.total_presents,
            missed_presents: self.missed_presents,
            janks: self.janks,
        }
    }

    /// Returns ring-buffer frame deltas oldest to newest.
    #[must_use]
    pub fn frame_deltas(&self) -> [f64; N] {
        let mut out = [0.0; N];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.deltas_ms[(self.cursor + i) % N];
        }
        out
    }

    /// Returns an ASCII sparkline over [`frame_deltas`](Self::frame_deltas).
    #[must_use]
    pub fn sparkline_ascii(&self, min_ms: f64, max_ms: f64) -> String {
        const LEVELS: &[u8] = b" .:-=+*#%@";
        let mut out = String::with_capacity(N);
        for delta in self.frame_deltas() {
            let v = delta.clamp(min_ms, max_ms);
            let t = (v - min_ms) / (max_ms - min_ms);
            #[expect(
                clippy::cast_possible_truncation,
                reason = "index is clamped to ASCII level count"
            )]
            let level = (t * (LEVELS.len() as f64 - 1.0) + 0.5) as usize;
            out.push(LEVELS[level] as char);
        }
        out
    }
}

fn grade_for(latency_vsyncs: f64, miss_rate_per_1000: f64) -> PacingGrade {
    if latency_vsyncs < 2.5 && miss_rate_per_1000 < 10.0 {
        PacingGrade::A
    } else if latency_vsyncs < 3.5 && miss_rate_per_1000 < 50.0 {
        PacingGrade::B
    } else if latency_vsyncs < 5.0 && miss_rate_per_1000 < 150.0 {
        PacingGrade::C
    } else {
        PacingGrade::D
    }
}
