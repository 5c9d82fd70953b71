// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Eventfd-backed "presentation in progress" signal.

use std::os::fd::{AsFd, BorrowedFd, OwnedFd};

use cadence_core::transport::PresentSignal;
use rustix::event::{EventfdFlags, eventfd};
use rustix::io::{self, Errno};

/// A [`PresentSignal`] backed by a non-blocking eventfd.
///
/// While raised, the eventfd counter is non-zero and the descriptor polls
/// readable. Clearing drains the counter. Observers should poll
/// [`as_fd`](AsFd::as_fd) rather than read it, since a read clears the
/// level for everyone.
#[derive(Debug)]
pub struct EventfdSignal {
    fd: OwnedFd,
    raised: bool,
    failures: u64,
}

impl EventfdSignal {
    /// Creates a lowered signal.
    pub fn new() -> io::Result<Self> {
        let fd = eventfd(0, EventfdFlags::CLOEXEC | EventfdFlags::NONBLOCK)?;
        Ok(Self {
            fd,
            raised: false,
            failures: 0,
        })
    }

    /// Returns the level last set.
    #[must_use]
    pub fn is_raised(&self) -> bool {
        self.raised
    }

    /// Number of eventfd operations that failed.
    #[must_use]
    pub fn failures(&self) -> u64 {
        self.failures
    }

    fn raise(&self) -> io::Result<()> {
        io::write(&self.fd, &1_u64.to_ne_bytes()).map(drop)
    }

    fn clear(&self) -> io::Result<()> {
        let mut buf = [0_u8; 8];
        match io::read(&self.fd, &mut buf[..]) {
            Ok(_) | Err(Errno::AGAIN) => Ok(()),
            Err(err) => Err(err),
        }
    }
}

impl PresentSignal for EventfdSignal {
    fn set_raised(&mut self, raised: bool) {
        let result = if raised { self.raise() } else { self.clear() };
        match result {
            Ok(()) => self.raised = raised,
            Err(err) => {
                self.failures += 1;
                log::error!("eventfd signal update to raised={raised} failed: {err}");
            }
        }
    }
}

impl AsFd for EventfdSignal {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }
}
