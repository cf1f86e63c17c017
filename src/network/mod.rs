//! Network Layer
//!
//! WebSocket server for real-time multiplayer communication.
//! Game rules live in `game/`; this layer only moves intents in and
//! snapshots out.

pub mod broadcast;
pub mod config;
pub mod protocol;
pub mod session;
pub mod server;

pub use broadcast::Broadcaster;
pub use config::{ConfigError, ServerConfig};
pub use protocol::{ClientMessage, ServerMessage};
pub use session::{MatchSession, SharedSession};
pub use server::{GameServer, GameServerError};
