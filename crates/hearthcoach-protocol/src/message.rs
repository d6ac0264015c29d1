//! Streaming messages and the rules that map them to wire text.
//!
//! Outbound events are flat, internally tagged JSON objects:
//!
//! ```text
//! {"type": "log", "line": "..."}
//! {"type": "request_suggestion"}
//! {"type": "reset"}
//! ```
//!
//! Inbound decoding is deliberately lenient. A frame must carry a `type`
//! tag, but a tag this client doesn't recognise is not an error: the frame
//! is reported as "nothing to do" so the server can grow the protocol
//! without breaking older clients.

use serde::{Deserialize, Serialize};

use crate::{
    Codec, ProtocolError, Suggestion, Target, TargetType,
    DEFAULT_WIN_PROBABILITY,
};

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// An event sent from the client to the suggestion server.
///
/// Constructed by the host application and encoded immediately; never
/// retained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OutboundEvent {
    /// One raw line from the game log.
    #[serde(rename = "log")]
    LogLine { line: String },

    /// Ask the server for a suggestion based on what it has seen so far.
    #[serde(rename = "request_suggestion")]
    RequestSuggestion,

    /// Tell the server to forget its game state (new game, reconnect).
    #[serde(rename = "reset")]
    ResetGameState,
}

impl OutboundEvent {
    /// Shorthand for [`OutboundEvent::LogLine`].
    pub fn log_line(line: impl Into<String>) -> Self {
        Self::LogLine { line: line.into() }
    }

    /// The wire `type` tag of this event.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::LogLine { .. } => "log",
            Self::RequestSuggestion => "request_suggestion",
            Self::ResetGameState => "reset",
        }
    }
}

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// A decoded event received from the suggestion server.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// The server's view of whether it is ready to suggest.
    Status { connected: bool },

    /// A recommended action.
    Suggestion(Suggestion),
}

/// Wire shape of a suggestion object. Only `action` is required.
#[derive(Debug, Deserialize)]
struct WireSuggestion {
    action: String,
    card_id: Option<String>,
    card_name: Option<String>,
    card_index: Option<u32>,
    target_type: Option<String>,
    target_index: Option<u32>,
    win_probability: Option<f64>,
}

impl From<WireSuggestion> for Suggestion {
    fn from(wire: WireSuggestion) -> Self {
        // An unknown target kind is treated as "no target" rather than
        // failing the whole suggestion.
        let target = wire
            .target_type
            .as_deref()
            .and_then(TargetType::from_wire)
            .map(|kind| Target::new(kind, wire.target_index));

        Suggestion::new(wire.action)
            .with_card(wire.card_id, wire.card_name, wire.card_index)
            .with_target(target)
            .with_win_probability(
                wire.win_probability.unwrap_or(DEFAULT_WIN_PROBABILITY),
            )
    }
}

/// Wire shape of any inbound streaming frame.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum InboundFrame {
    Status { connected: bool },
    Suggestion(WireSuggestion),
    #[serde(other)]
    Unknown,
}

// ---------------------------------------------------------------------------
// Encode / decode
// ---------------------------------------------------------------------------

/// Encodes an outbound event as one text frame.
///
/// # Errors
/// Returns `ProtocolError::Encode` if the codec fails.
pub fn encode_outbound<C: Codec>(
    codec: &C,
    event: &OutboundEvent,
) -> Result<String, ProtocolError> {
    codec.encode(event)
}

/// Decodes one inbound streaming frame.
///
/// - `Ok(Some(event))` — a recognised message.
/// - `Ok(None)` — valid frame with a `type` this client doesn't handle.
/// - `Err(_)` — malformed JSON, no `type`, or a suggestion without `action`.
///
/// The streaming session drops the `Err` case without surfacing it; the
/// distinction is kept here so callers can count it.
pub fn decode_inbound<C: Codec>(
    codec: &C,
    text: &str,
) -> Result<Option<InboundEvent>, ProtocolError> {
    let frame: InboundFrame = codec.decode(text)?;
    Ok(match frame {
        InboundFrame::Status { connected } => {
            Some(InboundEvent::Status { connected })
        }
        InboundFrame::Suggestion(wire) => {
            Some(InboundEvent::Suggestion(wire.into()))
        }
        InboundFrame::Unknown => None,
    })
}

/// Decodes a bare suggestion object (no `type` wrapper), as returned by the
/// `/suggest` endpoint.
///
/// # Errors
/// Returns `ProtocolError::Decode` if the text is malformed or `action` is
/// missing.
pub fn decode_suggestion<C: Codec>(
    codec: &C,
    text: &str,
) -> Result<Suggestion, ProtocolError> {
    let wire: WireSuggestion = codec.decode(text)?;
    Ok(wire.into())
}

// =========================================================================
// Tests
// =========================================================================
