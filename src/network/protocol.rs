//! Protocol Messages
//!
//! Wire format for client-server communication over WebSocket.
//! Every frame is a JSON text message tagged by `type`.

use serde::{Serialize, Deserialize};

use crate::game::intent::Intent;
use crate::game::state::{ConnectionId, StateSnapshot};

// =============================================================================
// CLIENT -> SERVER MESSAGES
// =============================================================================

/// Messages sent from client to server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Take a seat.
    Join {
        /// Display name.
        name: String,
    },

    /// Flip the card at a board position.
    FlipCard {
        /// Board position; range-checked by the match.
        index: i64,
    },

    /// Deal a fresh board (turn holder only).
    ResetGame,
}

impl ClientMessage {
    /// Attach the sending connection, producing a game intent.
    pub fn into_intent(self, id: ConnectionId) -> Intent {
        match self {
            ClientMessage::Join { name } => Intent::Join { id, name },
            ClientMessage::FlipCard { index } => Intent::Flip { id, index },
            ClientMessage::ResetGame => Intent::Reset { id },
        }
    }
}

// =============================================================================
// SERVER -> CLIENT MESSAGES
// =============================================================================

/// Messages sent from server to client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Sent once on connect: the handle this connection is known by.
    Welcome {
        /// Matches `players[].id` once joined.
        id: ConnectionId,
    },

    /// Full match state.
    State(StateSnapshot),

    /// Private advisory for this connection only.
    ErrorMessage {
        /// Human-readable text.
        message: String,
    },

    /// Server is shutting down.
    Shutdown {
        /// Why.
        reason: String,
    },
}

// =============================================================================
// SERIALIZATION HELPERS
// =============================================================================

impl ClientMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}
