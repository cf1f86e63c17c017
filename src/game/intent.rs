//! Player Intents
//!
//! What a connection asks the match to do. Intents are requests, not
//! commands: the state machine validates each one against the live state.

use crate::game::state::ConnectionId;

/// A request from one connection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    /// Take a seat under `name`.
    Join {
        /// Requesting connection.
        id: ConnectionId,
        /// Display name, trimmed before use.
        name: String,
    },
    /// Turn a card face-up.
    Flip {
        /// Requesting connection.
        id: ConnectionId,
        /// Board position as received; may be out of range.
        index: i64,
    },
    /// Deal a fresh board.
    Reset {
        /// Requesting connection.
        id: ConnectionId,
    },
    /// The connection went away.
    Disconnect {
        /// Departing connection.
        id: ConnectionId,
    },
}

impl Intent {
    /// Connection that issued the intent.
    pub fn connection(&self) -> ConnectionId {
        match self {
            Intent::Join { id, .. }
            | Intent::Flip { id, .. }
            | Intent::Reset { id }
            | Intent::Disconnect { id } => *id,
        }
    }
}
