// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View identification.
//!
//! [`ViewToken`] and [`ViewRefId`] name the compositor-side view a session
//! renders into. The compositor hands them out; core treats them as opaque.

use core::fmt;

/// Capability for attaching content to a compositor view.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ViewToken(pub u64);

impl fmt::Debug for ViewToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ViewToken({:#x})", self.0)
    }
}

/// Identity of a compositor view, used for focus and accessibility.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ViewRefId(pub u64);

impl fmt::Debug for ViewRefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ViewRefId({:#x})", self.0)
    }
}
