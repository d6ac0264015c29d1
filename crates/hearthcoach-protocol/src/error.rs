//! Error types for the protocol layer.
//!
//! Each crate in Hearthcoach defines its own error enum. A `ProtocolError`
//! always means the problem is in the shape of a message, never in the
//! network underneath it.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into wire text).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed.
    ///
    /// Common causes: malformed JSON, a missing `type` tag, or a
    /// suggestion without its required `action`.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),
}
