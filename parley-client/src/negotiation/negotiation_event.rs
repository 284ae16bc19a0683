use parley_core::{ConnectionId, StreamRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    RemoteLeft,
    /// The remote rejoined or re-offered; a fresh link replaces this one.
    Restarted,
    TimedOut,
    LocalShutdown,
}

/// What the application needs to know to show or remove a remote stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NegotiationEvent {
    LinkEstablished {
        remote: ConnectionId,
        /// Role announced by the remote, e.g. `Screen` for a shared screen.
        remote_role: StreamRole,
        parent_user: Option<ConnectionId>,
        user_name: Option<String>,
    },
    LinkClosed {
        remote: ConnectionId,
        reason: CloseReason,
    },
}
