// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contracts for compositor and host integrations.
//!
//! A [`SessionConnection`](crate::session::SessionConnection) talks to the
//! outside world through two traits:
//!
//! - **Transport** — [`CompositorTransport`] carries [`PresentRequest`]s to
//!   the compositor. Completions and acknowledgments come back
//!   asynchronously as [`SessionEvent`](crate::mailbox::SessionEvent)s
//!   posted to the connection's mailbox.
//!
//! - **Signal** — [`PresentSignal`] exposes "presentation in progress" to
//!   other components of the system, typically through an OS wait
//!   primitive.
//!
//! # Crate boundaries
//!
//! `cadence_core` owns the scheduling model and these contracts. Host crates
//! provide OS glue (clocks, signal primitives); transports for a concrete
//! compositor live with the code that owns the channel.

use alloc::vec::Vec;

use crate::error::TransportError;
use crate::timing::PresentTicket;

/// One present call: the scene updates accumulated since the last one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PresentRequest<U> {
    /// Scheduling metadata for this present.
    pub ticket: PresentTicket,
    /// Scene updates to apply before presenting, in submission order.
    pub updates: Vec<U>,
}

/// Sends present requests to a compositor.
///
/// The connection never issues a second request before the first has been
/// reported complete with
/// [`SessionEvent::SendComplete`](crate::mailbox::SessionEvent::SendComplete).
///
/// # Frame loop pseudocode
///
/// ```rust,ignore
/// fn on_vsync(now: TimePoint) {
///     let plan = session.request_frame(now, now)?;
///     // Build the scene for plan.latch_point.
///     session.enqueue_update(update);
///     session.present(now)?;
/// }
///
/// fn on_channel_readable(now: TimePoint) {
///     // The transport posted completions and acknowledgments.
///     session.pump(now)?;
/// }
/// ```
pub trait CompositorTransport<U> {
    /// Starts sending `request`. Must not block.
    fn present(&mut self, request: PresentRequest<U>) -> Result<(), TransportError>;
}

/// Level-triggered "presentation in progress" indicator.
///
/// Raised when a frame is admitted, cleared when the compositor has
/// acknowledged every frame in flight. The connection only calls
/// [`set_raised`](Self::set_raised) when the level changes.
pub trait PresentSignal {
    /// Moves the signal to the given level.
    fn set_raised(&mut self, raised: bool);
}

/// A [`PresentSignal`] that only remembers its level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LevelSignal {
    raised: bool,
    toggles: u64,
}

impl LevelSignal {
    /// Creates a lowered signal.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            raised: false,
            toggles: 0,
        }
    }

    /// Returns the current level.
    #[must_use]
    pub const fn is_raised(&self) -> bool {
        self.raised
    }

    /// Number of level changes so far.
    #[must_use]
    pub const fn toggles(&self) -> u64 {
        self.toggles
    }
}

impl PresentSignal for LevelSignal {
    fn set_raised(&mut self, raised: bool) {
        if self.raised != raised {
            self.toggles += 1;
        }
        self.raised = raised;
    }
}
