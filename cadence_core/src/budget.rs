// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-flight frame budget.
//!
//! The compositor only tolerates a small number of frames that have been
//! submitted but not yet reported as presented. [`InFlightBudget`] is the
//! single gate every submission goes through: [`try_acquire`] claims a slot,
//! [`release`] returns one per acknowledged frame.
//!
//! The ceiling can be lowered at runtime (for example when the compositor
//! grants fewer present credits). Frames already in flight cannot be
//! recalled, so a lowered ceiling takes effect as frames drain: the
//! reported [`allowed`](InFlightBudget::allowed) value never drops below the
//! current in-flight count, and new acquisitions are refused until the
//! count is under the requested ceiling.
//!
//! [`try_acquire`]: InFlightBudget::try_acquire
//! [`release`]: InFlightBudget::release

/// Snapshot of the budget counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameBudgetState {
    /// Presents sent and not yet acknowledged.
    pub frames_in_flight: u32,
    /// Current ceiling on `frames_in_flight`.
    pub frames_in_flight_allowed: u32,
}

/// Counts frames in flight against a ceiling.
#[derive(Clone, Debug)]
pub struct InFlightBudget {
    max: u32,
    requested_allowed: u32,
    in_flight: u32,
    spurious_releases: u64,
}

impl InFlightBudget {
    /// Creates a budget whose ceiling starts at, and may never exceed, `max`.
    ///
    /// `max == 0` is promoted to `1`.
    #[must_use]
    pub fn new(max: u32) -> Self {
        let max = max.max(1);
        Self {
            max,
            requested_allowed: max,
            in_flight: 0,
            spurious_releases: 0,
        }
    }

    /// Claims a slot for one frame.
    ///
    /// Returns `false` without changing anything when the budget is
    /// exhausted; the caller must hold the frame and retry later.
    #[must_use]
    pub fn try_acquire(&mut self) -> bool {
        if self.in_flight < self.requested_allowed {
            self.in_flight += 1;
            true
        } else {
            false
        }
    }

    /// Returns one slot after an acknowledgment.
    ///
    /// A release with nothing in flight indicates a duplicate or unexpected
    /// acknowledgment. It is logged and counted, and the count stays at
    /// zero. Returns whether a slot was actually returned.
    pub fn release(&mut self) -> bool {
        if self.in_flight == 0 {
            self.spurious_releases += 1;
            log::warn!("release with no frames in flight; ignoring duplicate acknowledgment");
            return false;
        }
        self.in_flight -= 1;
        true
    }

    /// Sets the ceiling, clamped to `1..=max`.
    pub fn set_allowed(&mut self, allowed: u32) {
        let clamped = allowed.clamp(1, self.max);
        if clamped != allowed {
            log::debug!("frames-in-flight ceiling {allowed} clamped to {clamped}");
        }
        if clamped < self.in_flight {
            log::warn!(
                "frames-in-flight ceiling lowered to {clamped} with {} in flight; \
                 takes effect as frames drain",
                self.in_flight
            );
        }
        self.requested_allowed = clamped;
    }

    /// Frames currently in flight.
    #[must_use]
    pub fn frames_in_flight(&self) -> u32 {
        self.in_flight
    }

    /// The effective ceiling, never below [`frames_in_flight`](Self::frames_in_flight).
    #[must_use]
    pub fn allowed(&self) -> u32 {
        self.requested_allowed.max(self.in_flight)
    }

    /// The fixed upper bound for the ceiling.
    #[must_use]
    pub fn max(&self) -> u32 {
        self.max
    }

    /// Returns `true` when a [`try_acquire`](Self::try_acquire) would succeed.
    #[must_use]
    pub fn has_capacity(&self) -> bool {
        self.in_flight < self.requested_allowed
    }

    /// Number of releases ignored because nothing was in flight.
    #[must_use]
    pub fn spurious_releases(&self) -> u64 {
        self.spurious_releases
    }

    /// Returns a snapshot of the counters.
    #[must_use]
    pub fn state(&self) -> FrameBudgetState {
        FrameBudgetState {
            frames_in_flight: self.in_flight,
            frames_in_flight_allowed: self.allowed(),
        }
    }
}
