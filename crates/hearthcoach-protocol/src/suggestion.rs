//! The suggestion model: what the server recommends the player do next.
//!
//! A [`Suggestion`] is built once per inbound `suggestion` message, handed
//! to presentation code, and never mutated. Overlay code reads it; nothing
//! in the client keeps a history of them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Win probability assumed when the server does not send one.
pub const DEFAULT_WIN_PROBABILITY: f64 = 0.5;

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// The kind of move being suggested.
///
/// Unknown action strings are preserved in [`Action::Other`] instead of
/// failing the decode, so a newer server can add actions without breaking
/// older clients.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Action {
    /// Play a card from hand.
    PlayCard,
    /// Attack with a minion or hero.
    Attack,
    /// Use the hero power.
    HeroPower,
    /// End the turn.
    EndTurn,
    /// An action this client doesn't know about, kept verbatim.
    Other(String),
}

impl Action {
    /// The wire name of this action.
    pub fn as_str(&self) -> &str {
        match self {
            Self::PlayCard => "play_card",
            Self::Attack => "attack",
            Self::HeroPower => "hero_power",
            Self::EndTurn => "end_turn",
            Self::Other(s) => s,
        }
    }

    /// Returns `true` if the action is about a specific card in hand.
    pub fn involves_card(&self) -> bool {
        matches!(self, Self::PlayCard)
    }
}

impl From<&str> for Action {
    fn from(s: &str) -> Self {
        match s {
            "play_card" => Self::PlayCard,
            "attack" => Self::Attack,
            "hero_power" => Self::HeroPower,
            "end_turn" => Self::EndTurn,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl From<String> for Action {
    fn from(s: String) -> Self {
        match Action::from(s.as_str()) {
            Self::Other(_) => Self::Other(s),
            known => known,
        }
    }
}

impl From<Action> for String {
    fn from(action: Action) -> Self {
        match action {
            Action::Other(s) => s,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Target
// ---------------------------------------------------------------------------

/// What a suggested action is aimed at.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    EnemyHero,
    FriendlyHero,
    EnemyMinion,
    FriendlyMinion,
}

impl TargetType {
    /// Parses a wire name. Returns `None` for names this client doesn't know.
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "enemy_hero" => Some(Self::EnemyHero),
            "friendly_hero" => Some(Self::FriendlyHero),
            "enemy_minion" => Some(Self::EnemyMinion),
            "friendly_minion" => Some(Self::FriendlyMinion),
            _ => None,
        }
    }

    /// The wire name of this target type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EnemyHero => "enemy_hero",
            Self::FriendlyHero => "friendly_hero",
            Self::EnemyMinion => "enemy_minion",
            Self::FriendlyMinion => "friendly_minion",
        }
    }

    /// Returns `true` for the minion variants, the only ones with a board
    /// position.
    pub fn is_minion(self) -> bool {
        matches!(self, Self::EnemyMinion | Self::FriendlyMinion)
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A target: its kind plus, for minions, a zero-based board position.
///
/// The board index can only be read through [`Target::index`], which
/// returns `None` for hero targets. A stray `target_index` sent alongside a
/// hero target is discarded at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Target {
    kind: TargetType,
    index: Option<u32>,
}

impl Target {
    /// Creates a target. `index` is kept only for minion targets.
    pub fn new(kind: TargetType, index: Option<u32>) -> Self {
        Self {
            kind,
            index: if kind.is_minion() { index } else { None },
        }
    }

    /// The kind of target.
    pub fn kind(&self) -> TargetType {
        self.kind
    }

    /// Board position of a minion target.
    pub fn index(&self) -> Option<u32> {
        self.index
    }
}

// ---------------------------------------------------------------------------
// Suggestion
// ---------------------------------------------------------------------------

/// A decoded recommendation with its win-probability estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    action: Action,
    card_id: Option<String>,
    card_name: Option<String>,
    card_index: Option<u32>,
    target: Option<Target>,
    win_probability: f64,
}

impl Suggestion {
    /// Creates a suggestion with no card, no target, and the default win
    /// probability.
    pub fn new(action: impl Into<Action>) -> Self {
        Self {
            action: action.into(),
            card_id: None,
            card_name: None,
            card_index: None,
            target: None,
            win_probability: DEFAULT_WIN_PROBABILITY,
        }
    }

    /// Sets the card identifiers and hand position.
    pub fn with_card(
        mut self,
        card_id: Option<String>,
        card_name: Option<String>,
        card_index: Option<u32>,
    ) -> Self {
        self.card_id = card_id;
        self.card_name = card_name;
        self.card_index = card_index;
        self
    }

    /// Sets the target.
    pub fn with_target(mut self, target: Option<Target>) -> Self {
        self.target = target;
        self
    }

    /// Sets the win probability, clamped to `0.0..=1.0`.
    pub fn with_win_probability(mut self, p: f64) -> Self {
        self.win_probability = if p.is_finite() {
            p.clamp(0.0, 1.0)
        } else {
            DEFAULT_WIN_PROBABILITY
        };
        self
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    pub fn card_id(&self) -> Option<&str> {
        self.card_id.as_deref()
    }

    pub fn card_name(&self) -> Option<&str> {
        self.card_name.as_deref()
    }

    /// Zero-based position of the card in hand when the server decided.
    pub fn card_index(&self) -> Option<u32> {
        self.card_index
    }

    pub fn target(&self) -> Option<Target> {
        self.target
    }

    pub fn target_type(&self) -> Option<TargetType> {
        self.target.map(|t| t.kind())
    }

    /// Board position of the target; `None` unless the target is a minion.
    pub fn target_index(&self) -> Option<u32> {
        self.target.and_then(|t| t.index())
    }

    /// Probability in `0.0..=1.0`.
    pub fn win_probability(&self) -> f64 {
        self.win_probability
    }
}

/// Short human-readable label, e.g.
/// `play_card Fireball (hand 2) -> enemy_minion 1 [73%]`.
impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.action)?;
        if let Some(name) = self.card_name().or(self.card_id()) {
            write!(f, " {name}")?;
        }
        if let Some(i) = self.card_index {
            write!(f, " (hand {i})")?;
        }
        if let Some(target) = self.target {
            write!(f, " -> {}", target.kind())?;
            if let Some(i) = target.index() {
                write!(f, " {i}")?;
            }
        }
        write!(f, " [{:.0}%]", self.win_probability * 100.0)
    }
}
