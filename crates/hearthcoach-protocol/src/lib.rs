//! Wire protocol for Hearthcoach.
//!
//! This crate defines the language the companion client and the suggestion
//! server speak:
//!
//! - **Messages** ([`OutboundEvent`], [`InboundEvent`]) and the rules that
//!   turn them into wire text ([`encode_outbound`], [`decode_inbound`],
//!   [`decode_suggestion`]).
//! - **Suggestion model** ([`Suggestion`], [`Action`], [`Target`]) — the
//!   decoded recommendation handed to presentation code.
//! - **Game state** ([`GameState`]) — the request body for discrete
//!   suggestion pulls.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how values become text.
//!
//! # Architecture
//!
//! ```text
//! Transport (text frames) → Protocol (typed events) → Session (lifecycle)
//! ```
//!
//! The protocol layer knows nothing about connections. It is a pure
//! transformation.

mod codec;
mod error;
mod game_state;
mod message;
mod suggestion;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use game_state::{BoardMinion, GameState, HandCard, SuggestRequest};
pub use message::{
    decode_inbound, decode_suggestion, encode_outbound, InboundEvent,
    OutboundEvent,
};
pub use suggestion::{
    Action, Suggestion, Target, TargetType, DEFAULT_WIN_PROBABILITY,
};
