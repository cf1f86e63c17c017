//! Match State Definitions
//!
//! The single authoritative copy of the game: deck, roster, turn pointer,
//! reveal buffer and move history. Clients only ever see [`StateSnapshot`]s
//! derived from it.

use std::fmt;

use chrono::{SecondsFormat, Utc};
use serde::{Serialize, Deserialize};

use crate::core::rng::{DeterministicRng, derive_deal_seed};
use crate::game::deck::build_deck;
use crate::game::roster::Roster;
use crate::DEFAULT_HISTORY_LIMIT;

// =============================================================================
// CONNECTION ID
// =============================================================================

/// Opaque handle of one live connection.
///
/// It is the only player identity: a client that reconnects gets a fresh
/// handle and joins as a new player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(uuid::Uuid);

impl ConnectionId {
    /// Generate a fresh random handle.
    pub fn new_v4() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(uuid::Uuid::from_bytes(bytes))
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// CARD
// =============================================================================

/// One card on the board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Board position, stable for the lifetime of the deal.
    pub id: u32,
    /// Face symbol; exactly two cards share it.
    pub value: String,
    /// Face-up while waiting for resolution.
    pub is_revealed: bool,
    /// Permanently face-up.
    pub is_matched: bool,
}

impl Card {
    /// Create a hidden, unmatched card.
    pub fn new(id: u32, value: impl Into<String>) -> Self {
        Self {
            id,
            value: value.into(),
            is_revealed: false,
            is_matched: false,
        }
    }
}

// =============================================================================
// PLAYER
// =============================================================================

/// A seated player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Connection that owns this seat.
    pub id: ConnectionId,
    /// Trimmed, non-empty display name.
    pub name: String,
    /// Pairs found in the current deal.
    pub score: u32,
}

// =============================================================================
// MOVE
// =============================================================================

/// A resolved pair of flips.
///
/// Refers to the player by name so the entry stays readable after
/// they leave.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Move {
    /// Name of the player who flipped.
    pub player_name: String,
    /// Human-readable summary of both positions and values.
    pub description: String,
    /// Whether the two cards matched.
    pub success: bool,
    /// ISO-8601 UTC time the second card was flipped.
    pub timestamp: String,
}

impl Move {
    /// Record a pair of flips at board positions `first` and `second`.
    pub fn record(player_name: &str, first: &Card, second: &Card, success: bool) -> Self {
        Self {
            player_name: player_name.to_string(),
            description: format!(
                "Flipped cards {} and {} ({} / {})",
                first.id + 1,
                second.id + 1,
                first.value,
                second.value,
            ),
            success,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

// =============================================================================
// MATCH PHASE
// =============================================================================

/// Coarse lifecycle of the match, derived from the state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchPhase {
    /// Nobody has joined.
    Waiting,
    /// At least one player, pairs left to find.
    InProgress,
    /// Every card matched; only joins and resets do anything.
    Finished,
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Full state as sent to clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    /// Players in turn order.
    pub players: Vec<Player>,
    /// Index into `players` of whoever may act.
    pub turn: usize,
    /// Every card in board order.
    pub cards: Vec<Card>,
    /// Cards face-up pending resolution (at most two).
    pub revealed_indices: Vec<usize>,
    /// Most recent moves, oldest first.
    pub move_history: Vec<Move>,
    /// All pairs found.
    pub is_finished: bool,
}

// =============================================================================
// MATCH STATE
// =============================================================================

/// The authoritative match state.
#[derive(Clone, Debug)]
pub struct MatchState {
    /// Identifier drawn when the session was created.
    pub match_id: [u8; 16],
    /// Number of full resets so far; the current deal's sequence number.
    pub round: u64,
    /// Seed the current deck was shuffled from.
    pub rng_seed: u64,
    /// Alphabet the deck is dealt from.
    pub card_values: Vec<String>,
    /// Seated players in turn order.
    pub roster: Roster,
    /// Index into the roster of whoever may act.
    pub turn: usize,
    /// Board, in position order.
    pub cards: Vec<Card>,
    /// Cards face-up pending resolution.
    pub revealed_indices: Vec<usize>,
    /// Every move of the current deal, oldest first.
    pub move_history: Vec<Move>,
    /// All pairs found.
    pub is_finished: bool,
}

impl MatchState {
    /// Create a match and deal its first deck.
    pub fn new(match_id: [u8; 16], card_values: Vec<String>) -> Self {
        let mut state = Self {
            match_id,
            round: 0,
            rng_seed: 0,
            card_values,
            roster: Roster::new(),
            turn: 0,
            cards: Vec::new(),
            revealed_indices: Vec::new(),
            move_history: Vec::new(),
            is_finished: false,
        };
        state.deal();
        state
    }

    /// Full reset: fresh deck, cleared history, turn to the first seat,
    /// every score back to zero. Players stay seated.
    pub fn reset(&mut self) {
        self.round += 1;
        self.deal();
        self.revealed_indices.clear();
        self.move_history.clear();
        self.is_finished = false;
        self.turn = 0;
        self.roster.reset_scores();
    }

    fn deal(&mut self) {
        self.rng_seed = derive_deal_seed(&self.match_id, self.round);
        let mut rng = DeterministicRng::new(self.rng_seed);
        self.cards = build_deck(&self.card_values, &mut rng);
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> MatchPhase {
        if self.roster.is_empty() {
            MatchPhase::Waiting
        } else if self.is_finished {
            MatchPhase::Finished
        } else {
            MatchPhase::InProgress
        }
    }

    /// Player whose turn it is, if anyone is seated.
    pub fn current_player(&self) -> Option<&Player> {
        self.roster.get(self.turn)
    }

    /// Whether `id` holds the turn.
    pub fn is_turn_of(&self, id: &ConnectionId) -> bool {
        self.current_player().is_some_and(|p| p.id == *id)
    }

    /// Whether every card on a non-empty board is matched.
    pub fn all_matched(&self) -> bool {
        !self.cards.is_empty() && self.cards.iter().all(|c| c.is_matched)
    }

    /// Number of pairs found this deal.
    pub fn matched_pairs(&self) -> usize {
        self.cards.iter().filter(|c| c.is_matched).count() / 2
    }

    /// Build the client view, exposing at most `history_limit` moves and
    /// never more than [`DEFAULT_HISTORY_LIMIT`].
    pub fn snapshot(&self, history_limit: usize) -> StateSnapshot {
        let limit = history_limit.min(DEFAULT_HISTORY_LIMIT);
        let skip = self.move_history.len().saturating_sub(limit);
        StateSnapshot {
            players: self.roster.players().to_vec(),
            turn: self.turn,
            cards: self.cards.clone(),
            revealed_indices: self.revealed_indices.clone(),
            move_history: self.move_history[skip..].to_vec(),
            is_finished: self.is_finished,
        }
    }
}
