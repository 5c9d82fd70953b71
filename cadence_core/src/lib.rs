// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame presentation scheduling for compositor clients.
//!
//! `cadence_core` decides *when* a client submits frames to a compositor
//! that latches content at discrete, forecast points in time. It is
//! `no_std` compatible (with `alloc`), owns no clock and performs no I/O:
//! every operation takes the current time as an argument, so whole sessions
//! can be replayed deterministically.
//!
//! # Architecture
//!
//! ```text
//!   request_frame ──► latch algorithm ──► FramePlan
//!                        ▲        ▲
//!        VsyncForecastTracker     last latch point targeted
//!                        ▲
//!   present ──► InFlightBudget ──► PresentCoalescer ──► CompositorTransport
//!                        ▲                   ▲                 │
//!                        │                   └─ SendComplete ──┤
//!                        └──────────── FramePresented ─────────┘
//!                                    (via the session Mailbox)
//! ```
//!
//! **[`forecast`]** — Bounded window of compositor-reported latch points
//! with vsync-grid extrapolation.
//!
//! **[`budget`]** — Frames-in-flight counter with a runtime-adjustable
//! ceiling.
//!
//! **[`coalesce`]** — Two-flag state machine keeping at most one present
//! call outstanding and at most one queued.
//!
//! **[`latch`]** — The pure latch-point selection function.
//!
//! **[`scheduler`]** — [`FrameScheduler`](scheduler::FrameScheduler) tying
//! the above together, plus build-time estimation and per-present frame
//! accounting.
//!
//! **[`session`]** — [`SessionConnection`](session::SessionConnection):
//! scheduler, transport, signal, surface producer and callbacks for one
//! compositor view.
//!
//! **[`transport`]** and **[`mailbox`]** — Integration contracts and the
//! single-threaded event queue transports report through.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and event types,
//! with the zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod budget;
pub mod coalesce;
pub mod error;
pub mod forecast;
pub mod latch;
pub mod mailbox;
pub mod scheduler;
pub mod session;
pub mod time;
pub mod timing;
pub mod trace;
pub mod transport;
pub mod view;
