//! Game Logic Module
//!
//! The authoritative match. Pure state and transitions, no I/O.
//!
//! ## Module Structure
//!
//! - `state`: Cards, players, moves, the match state and its snapshot
//! - `deck`: Shuffled deck generation
//! - `roster`: Seated players and turn order
//! - `intent`: Requests coming from connections
//! - `transition`: Applies intents and the delayed mismatch resolution

pub mod state;
pub mod deck;
pub mod roster;
pub mod intent;
pub mod transition;

// Re-export key types
pub use state::{Card, ConnectionId, MatchPhase, MatchState, Move, Player, StateSnapshot};
pub use roster::Roster;
pub use intent::Intent;
pub use transition::{
    apply, resolve_mismatch, Effect, MatchConfig, Notice, PendingResolution, TransitionResult,
};
