// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Single-threaded event queue from transports to a session.
//!
//! Transports learn about send completions, acknowledgments and
//! disconnections on their own schedule. Instead of calling back into the
//! session, they post a [`SessionEvent`] through a [`MailboxSender`]; the
//! session drains its [`Mailbox`] when the owner calls
//! [`SessionConnection::pump`](crate::session::SessionConnection::pump).
//! Both halves are `!Send`, so every event is handled on the thread that
//! owns the session.

use alloc::collections::VecDeque;
use alloc::rc::Rc;
use core::cell::RefCell;

use crate::timing::FramePresentedInfo;

/// A message from the transport to its session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// The in-transit present call finished.
    SendComplete,
    /// The compositor acknowledged one or more presents.
    FramePresented(FramePresentedInfo),
    /// The compositor channel is gone.
    Disconnected,
}

#[derive(Debug, Default)]
struct Shared {
    events: VecDeque<SessionEvent>,
    receiver_alive: bool,
    posted: u64,
}

/// Creates a connected sender/receiver pair.
#[must_use]
pub fn mailbox() -> (MailboxSender, Mailbox) {
    let shared = Rc::new(RefCell::new(Shared {
        receiver_alive: true,
        ..Shared::default()
    }));
    (
        MailboxSender {
            shared: Rc::clone(&shared),
        },
        Mailbox { shared },
    )
}

/// Posting half of a mailbox. Cheap to clone.
#[derive(Clone, Debug)]
pub struct MailboxSender {
    shared: Rc<RefCell<Shared>>,
}

impl MailboxSender {
    /// Queues `event` for the session.
    ///
    /// Returns `false` and drops the event if the [`Mailbox`] is gone.
    pub fn post(&self, event: SessionEvent) -> bool {
        let mut shared = self.shared.borrow_mut();
        if !shared.receiver_alive {
            log::trace!("mailbox closed; dropping {event:?}");
            return false;
        }
        shared.posted += 1;
        shared.events.push_back(event);
        true
    }

    /// Posts [`SessionEvent::SendComplete`].
    pub fn send_complete(&self) -> bool {
        self.post(SessionEvent::SendComplete)
    }

    /// Posts [`SessionEvent::FramePresented`].
    pub fn frame_presented(&self, info: FramePresentedInfo) -> bool {
        self.post(SessionEvent::FramePresented(info))
    }

    /// Posts [`SessionEvent::Disconnected`].
    pub fn disconnected(&self) -> bool {
        self.post(SessionEvent::Disconnected)
    }

    /// Returns `true` while the receiving [`Mailbox`] exists.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.shared.borrow().receiver_alive
    }
}

/// Receiving half of a mailbox.
#[derive(Debug)]
pub struct Mailbox {
    shared: Rc<RefCell<Shared>>,
}

impl Mailbox {
    /// Takes the oldest queued event.
    pub fn pop(&mut self) -> Option<SessionEvent> {
        self.shared.borrow_mut().events.pop_front()
    }

    /// Returns a new sender for this mailbox.
    #[must_use]
    pub fn sender(&self) -> MailboxSender {
        MailboxSender {
            shared: Rc::clone(&self.shared),
        }
    }

    /// Number of queued events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.borrow().events.len()
    }

    /// Returns `true` when nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shared.borrow().events.is_empty()
    }

    /// Total events accepted since creation.
    #[must_use]
    pub fn posted(&self) -> u64 {
        self.shared.borrow().posted
    }
}

impl Drop for Mailbox {
    fn drop(&mut self) {
        let mut shared = self.shared.borrow_mut();
        shared.receiver_alive = false;
        shared.events.clear();
    }
}
