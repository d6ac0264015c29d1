//! Error types for the session layer.

/// Errors returned by [`SessionHandle`](crate::SessionHandle) calls.
///
/// Transport failures are deliberately absent: they are transient, handled
/// inside the session by the reconnection policy, and reported through
/// [`SessionStatus`](crate::SessionStatus) instead of to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The configured host/port don't form a usable server address.
    /// Not retried: a malformed address won't fix itself.
    #[error("invalid server address {address:?}: {reason}")]
    InvalidEndpoint { address: String, reason: String },

    /// The session task has shut down; the handle is no longer usable.
    #[error("session is not running")]
    Unavailable,
}
