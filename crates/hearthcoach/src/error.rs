//! Unified error type for Hearthcoach.

use hearthcoach_http::RequestError;
use hearthcoach_protocol::ProtocolError;
use hearthcoach_session::SessionError;
use hearthcoach_transport::TransportError;

use crate::ConfigError;

/// Top-level error that wraps all crate-specific errors.
///
/// Host applications using the `hearthcoach` crate deal with this single
/// type; `?` converts the sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum CompanionError {
    /// A transport-level error (connect, send, receive).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A streaming session error (bad endpoint, session stopped).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A discrete call failed (timeout, status, body).
    #[error(transparent)]
    Request(#[from] RequestError),

    /// The preferences file couldn't be read or written.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let companion_err: CompanionError = err.into();
        assert!(matches!(companion_err, CompanionError::Transport(_)));
        assert!(companion_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = hearthcoach_protocol::decode_suggestion(
            &hearthcoach_protocol::JsonCodec,
            r#"{"win_probability":0.5}"#,
        )
        .unwrap_err();
        let companion_err: CompanionError = err.into();
        assert!(matches!(companion_err, CompanionError::Protocol(_)));
        assert!(companion_err.to_string().starts_with("decode failed"));
    }

    #[test]
    fn test_from_session_error() {
        let err = SessionError::Unavailable;
        let companion_err: CompanionError = err.into();
        assert!(matches!(companion_err, CompanionError::Session(_)));
        assert_eq!(companion_err.to_string(), "session is not running");
    }

    #[test]
    fn test_from_request_error() {
        let err = RequestError::Status(503);
        let companion_err: CompanionError = err.into();
        assert!(matches!(companion_err, CompanionError::Request(_)));
        assert_eq!(companion_err.to_string(), "server returned HTTP 503");
    }
}
