// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Linux host integration for cadence.
//!
//! - [`HostClock`] reads a POSIX clock as a
//!   [`TimePoint`](cadence_core::time::TimePoint) and sleeps until absolute
//!   deadlines on it.
//! - [`EventfdSignal`] implements
//!   [`PresentSignal`](cadence_core::transport::PresentSignal) with a
//!   non-blocking eventfd other processes or event loops can poll.

mod clock;
mod signal;

pub use clock::HostClock;
pub use signal::EventfdSignal;
