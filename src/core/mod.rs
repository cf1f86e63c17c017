//! Core primitives.
//!
//! Reproducible randomness shared by the game layer.

pub mod rng;

// Re-export core types
pub use rng::{DeterministicRng, derive_deal_seed};
