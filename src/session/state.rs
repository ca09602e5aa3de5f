//! Connection state machine.
//!
//! `Disconnected → Authenticating → Connected → (Closing | Faulted) →
//! Disconnected`, looping for the life of the process. The state is
//! recreated per connection attempt; transcript state never lives here.

use std::fmt;

/// Where one connection attempt currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No socket. Next step is requesting a token.
    Disconnected,
    /// Token request in flight.
    Authenticating,
    /// Socket open; audio streaming and events flowing.
    Connected,
    /// Peer closed gracefully. Reconnects, but not an error.
    Closing,
    /// Transport or service failure. Reconnects after backoff.
    Faulted,
}

/// Events that drive the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Token request started.
    AuthStarted,
    /// Token request failed; stay disconnected and back off.
    AuthFailed,
    /// Socket opened successfully.
    SocketOpened,
    /// Socket failed to open.
    ConnectFailed,
    /// Peer initiated a graceful close.
    PeerClosed,
    /// Transport error, fatal stream error, or service-reported error.
    Fault,
    /// Teardown complete; ready for the next attempt.
    TornDown,
}

impl ConnectionState {
    /// Apply an event, returning the next state.
    ///
    /// Returns `None` for transitions the machine does not define; the
    /// driver treats that as a bug worth logging, never as a crash.
    pub fn advance(self, event: &SessionEvent) -> Option<ConnectionState> {
        use ConnectionState::*;
        use SessionEvent::*;

        match (self, event) {
            (Disconnected, AuthStarted) => Some(Authenticating),
            (Authenticating, AuthFailed) => Some(Disconnected),
            (Authenticating, SocketOpened) => Some(Connected),
            (Authenticating, ConnectFailed) => Some(Disconnected),
            (Connected, PeerClosed) => Some(Closing),
            (Connected, Fault) => Some(Faulted),
            (Closing, TornDown) => Some(Disconnected),
            (Faulted, TornDown) => Some(Disconnected),
            _ => None,
        }
    }

    /// True while the session should keep pumping audio and events.
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Authenticating => "authenticating",
            ConnectionState::Connected => "connected",
            ConnectionState::Closing => "closing",
            ConnectionState::Faulted => "faulted",
        };
        write!(f, "{}", name)
    }
}
