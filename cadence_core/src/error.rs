// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.

/// A present request could not be handed to the compositor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum TransportError {
    /// The compositor refused the request.
    #[error("compositor rejected the present request")]
    Rejected,
    /// The channel to the compositor is gone.
    #[error("compositor channel closed")]
    ChannelClosed,
}

/// Failure of a [`SessionConnection`](crate::session::SessionConnection).
///
/// Every variant is terminal: the connection does not reconnect, and all
/// later operations return [`SessionError::Closed`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum SessionError {
    /// The compositor reported that the connection was lost.
    #[error("compositor connection lost")]
    Disconnected,
    /// Sending a present request failed.
    #[error("present failed: {0}")]
    Transport(#[from] TransportError),
    /// The connection already failed earlier.
    #[error("session is closed")]
    Closed,
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn transport_error_converts_and_displays() {
        let err: SessionError = TransportError::ChannelClosed.into();
        assert_eq!(err, SessionError::Transport(TransportError::ChannelClosed));
        assert_eq!(err.to_string(), "present failed: compositor channel closed");
    }
}
