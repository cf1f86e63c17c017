//! # Memory Match Server
//!
//! Server-authoritative, turn-based memory matching game played over
//! WebSocket.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    MEMORY MATCH SERVER                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  └── rng.rs      - Seeded Xorshift128+ PRNG, deal seeds      │
//! │                                                              │
//! │  game/           - Game logic (no I/O)                       │
//! │  ├── state.rs    - Cards, players, match state, snapshots    │
//! │  ├── deck.rs     - Shuffled deck generation                  │
//! │  ├── roster.rs   - Seats and turn order                      │
//! │  ├── intent.rs   - Requests from connections                 │
//! │  └── transition.rs - Rules: join, flip, reset, leave         │
//! │                                                              │
//! │  network/        - Networking                                │
//! │  ├── server.rs   - WebSocket server                          │
//! │  ├── protocol.rs - Message types                             │
//! │  ├── session.rs  - Match session and mismatch timer          │
//! │  ├── broadcast.rs- Per-connection outbound queues            │
//! │  └── config.rs   - Environment configuration                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Deals
//!
//! Every deal is shuffled from a seed derived from the match id and the
//! round number, so any board can be reproduced from its log line.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod network;

// Re-export commonly used types
pub use core::rng::DeterministicRng;
pub use game::state::{ConnectionId, MatchState, StateSnapshot};
pub use game::transition::MatchConfig;
pub use network::{GameServer, ServerConfig};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default listen port
pub const DEFAULT_PORT: u16 = 3000;

/// Moves kept in each snapshot's history
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// How long a mismatched pair stays face-up (ms)
pub const DEFAULT_MISMATCH_DELAY_MS: u64 = 1000;

/// Concurrent connection cap
pub const DEFAULT_MAX_CONNECTIONS: usize = 256;
