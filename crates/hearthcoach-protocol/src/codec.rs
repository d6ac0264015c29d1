//! Codec trait and implementations for serializing/deserializing messages.
//!
//! A codec converts between Rust values and the text frames that travel over
//! the transport. The message layer ([`crate::encode_outbound`],
//! [`crate::decode_inbound`]) is written against the [`Codec`] trait, so the
//! serialization format can be swapped without touching the session layer.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode Rust values to text and decode text back.
///
/// `Send + Sync + 'static` because the session actor owns its codec for the
/// lifetime of a spawned task.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into a text frame.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError>;

    /// Deserializes a text frame back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the text is malformed or doesn't
    /// match the expected shape.
    fn decode<T: DeserializeOwned>(
        &self,
        text: &str,
    ) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`), the format the suggestion
/// server speaks.
///
/// ## Example
///
/// ```rust
/// use hearthcoach_protocol::{Codec, JsonCodec, OutboundEvent};
///
/// let codec = JsonCodec;
/// let text = codec.encode(&OutboundEvent::RequestSuggestion).unwrap();
/// assert_eq!(text, r#"{"type":"request_suggestion"}"#);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        text: &str,
    ) -> Result<T, ProtocolError> {
        serde_json::from_str(text).map_err(ProtocolError::Decode)
    }
}
