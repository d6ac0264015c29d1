//! Game-state snapshot sent with a discrete suggestion request.
//!
//! The host application builds these from its own game-tracking model; this
//! crate only fixes the JSON shape the `/suggest` endpoint expects.

use serde::{Deserialize, Serialize};

/// A card in the player's hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandCard {
    pub card_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<u32>,
}

/// A minion on either board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardMinion {
    pub card_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_name: Option<String>,
    pub attack: u32,
    pub health: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_attack: Option<bool>,
}

/// Snapshot of the visible game state from the player's perspective.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub hand: Vec<HandCard>,
    pub mana: u32,
    pub opponent_board: Vec<BoardMinion>,
    pub player_board: Vec<BoardMinion>,
}

/// Body of `POST /suggest`: `{"game_state": {...}}`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SuggestRequest<'a> {
    pub game_state: &'a GameState,
}
