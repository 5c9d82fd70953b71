// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Present-request coalescing.
//!
//! The compositor channel accepts a single outstanding present call per
//! connection. [`PresentCoalescer`] sits between a producer that may ask for
//! a flush at any time and that one-at-a-time channel: the first request
//! sends immediately, requests made while a send is in transit collapse into
//! one queued follow-up, and the follow-up is released when the transport
//! reports the send complete.
//!
//! ```text
//!            request_flush              request_flush
//!   Idle ──────────────────► Sending ──────────────────► SendingWithPending
//!    ▲                         │  ▲                              │
//!    └─────────────────────────┘  └──────────────────────────────┘
//!         on_send_complete              on_send_complete (sends)
//! ```

/// Coalescer state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum CoalescerState {
    /// No send in flight and nothing queued.
    #[default]
    Idle,
    /// A present request is in transit.
    Sending,
    /// A present request is in transit and another flush was requested.
    SendingWithPending,
}

/// What the caller must do after a coalescer transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[must_use]
pub enum FlushDecision {
    /// Issue a present request to the transport now.
    Send,
    /// A send is in transit; this flush was queued behind it.
    Queued,
    /// A follow-up was already queued; this flush merged into it.
    Merged,
    /// Nothing to send.
    Idle,
}

impl FlushDecision {
    /// Returns `true` if the caller must issue a send.
    #[inline]
    #[must_use]
    pub const fn is_send(self) -> bool {
        matches!(self, Self::Send)
    }
}

/// Two-flag state machine bounding outstanding and queued present requests.
#[derive(Clone, Debug, Default)]
pub struct PresentCoalescer {
    send_in_flight: bool,
    flush_pending: bool,
    sends_issued: u64,
    flushes_coalesced: u64,
}

impl PresentCoalescer {
    /// Creates an idle coalescer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks for the pending updates to be flushed to the transport.
    pub fn request_flush(&mut self) -> FlushDecision {
        match self.state() {
            CoalescerState::Idle => {
                self.send_in_flight = true;
                self.sends_issued += 1;
                FlushDecision::Send
            }
            CoalescerState::Sending => {
                self.flush_pending = true;
                FlushDecision::Queued
            }
            CoalescerState::SendingWithPending => {
                self.flushes_coalesced += 1;
                FlushDecision::Merged
            }
        }
    }

    /// Records that the transport finished the in-transit send.
    ///
    /// Returns [`FlushDecision::Send`] when a queued flush must now be
    /// issued. A completion with nothing in transit is logged and ignored.
    pub fn on_send_complete(&mut self) -> FlushDecision {
        match self.state() {
            CoalescerState::Idle => {
                log::warn!("send completion with no send in flight; ignoring");
                FlushDecision::Idle
            }
            CoalescerState::Sending => {
                self.send_in_flight = false;
                FlushDecision::Idle
            }
            CoalescerState::SendingWithPending => {
                self.flush_pending = false;
                self.sends_issued += 1;
                FlushDecision::Send
            }
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> CoalescerState {
        match (self.send_in_flight, self.flush_pending) {
            (false, _) => CoalescerState::Idle,
            (true, false) => CoalescerState::Sending,
            (true, true) => CoalescerState::SendingWithPending,
        }
    }

    /// Total sends this coalescer has told its caller to issue.
    #[must_use]
    pub fn sends_issued(&self) -> u64 {
        self.sends_issued
    }

    /// Flush requests absorbed into an already-queued follow-up.
    #[must_use]
    pub fn flushes_coalesced(&self) -> u64 {
        self.flushes_coalesced
    }
}
