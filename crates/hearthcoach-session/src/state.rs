//! Observable session state: lifecycle phase, status snapshots, events.

use std::fmt;
use std::time::Duration;

use hearthcoach_protocol::Suggestion;

/// Where the streaming connection is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionPhase {
    /// No connection and nothing pending.
    #[default]
    Idle,
    /// A connection attempt is in flight.
    Connecting,
    /// The connection is open; messages flow both ways.
    Open,
    /// A user-requested close is in progress.
    Closing,
    /// The connection was lost and a retry is scheduled.
    Reconnecting,
}

impl fmt::Display for ConnectionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closing => "closing",
            Self::Reconnecting => "reconnecting",
        };
        f.write_str(s)
    }
}

/// Counters kept by the session for troubleshooting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionDiagnostics {
    /// Text frames received from the server.
    pub frames_received: u64,
    /// Suggestions decoded and delivered.
    pub suggestions: u64,
    /// Well-formed frames with a `type` this client doesn't handle.
    pub ignored_messages: u64,
    /// Frames that failed to decode.
    pub malformed_messages: u64,
    /// Outbound events written to the connection.
    pub sent: u64,
    /// Outbound events dropped because no connection was open.
    pub dropped_sends: u64,
}

/// A point-in-time view of the session.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionStatus {
    pub phase: ConnectionPhase,
    /// `true` only while the connection is open.
    pub connected: bool,
    /// Description of the most recent failure. Cleared on a successful
    /// open and on a user disconnect.
    pub last_error: Option<String>,
    /// Consecutive failed attempts since the last successful open.
    pub reconnect_attempts: u32,
    /// Whether a retry is scheduled.
    pub reconnect_pending: bool,
    /// The server's last `status` message, if one arrived on this
    /// connection.
    pub server_ready: Option<bool>,
    pub diagnostics: SessionDiagnostics,
}

impl SessionStatus {
    /// Short label for a status line, e.g. `Connected` or
    /// `Error: connection refused, retrying`.
    pub fn label(&self) -> String {
        match (self.phase, &self.last_error) {
            (ConnectionPhase::Open, _) => "Connected".to_owned(),
            (ConnectionPhase::Connecting, _) => "Connecting…".to_owned(),
            (ConnectionPhase::Closing, _) => "Disconnecting…".to_owned(),
            (ConnectionPhase::Reconnecting, Some(e)) => {
                format!("Error: {e}, retrying")
            }
            (ConnectionPhase::Reconnecting, None) => "Reconnecting…".to_owned(),
            (ConnectionPhase::Idle, Some(e)) => format!("Error: {e}"),
            (ConnectionPhase::Idle, None) => "Disconnected".to_owned(),
        }
    }
}

/// Something that happened on the session, delivered to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The connection opened (`true`) or went away (`false`).
    ConnectionChanged { connected: bool },
    /// The server sent a suggestion.
    Suggestion(Suggestion),
    /// The server reported whether it is ready to suggest.
    ServerStatus { connected: bool },
    /// A retry was scheduled after a failure.
    ReconnectScheduled { attempt: u32, delay: Duration },
    /// The retry budget ran out; the session stays idle until the next
    /// `connect()`.
    ReconnectExhausted { attempts: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(phase: ConnectionPhase, err: Option<&str>) -> SessionStatus {
        SessionStatus {
            phase,
            connected: phase == ConnectionPhase::Open,
            last_error: err.map(str::to_owned),
            ..SessionStatus::default()
        }
    }

    #[test]
    fn test_default_status_is_disconnected() {
        let s = SessionStatus::default();
        assert_eq!(s.phase, ConnectionPhase::Idle);
        assert!(!s.connected);
        assert_eq!(s.label(), "Disconnected");
    }

    #[test]
    fn test_labels() {
        assert_eq!(status(ConnectionPhase::Open, None).label(), "Connected");
        assert_eq!(
            status(ConnectionPhase::Connecting, None).label(),
            "Connecting…"
        );
        assert_eq!(
            status(ConnectionPhase::Reconnecting, Some("refused")).label(),
            "Error: refused, retrying"
        );
        assert_eq!(
            status(ConnectionPhase::Idle, Some("refused")).label(),
            "Error: refused"
        );
        assert_eq!(
            status(ConnectionPhase::Closing, None).label(),
            "Disconnecting…"
        );
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(ConnectionPhase::Reconnecting.to_string(), "reconnecting");
    }
}
