//! Player Roster
//!
//! Seated players in turn order. Seat order is join order.

use crate::game::state::{ConnectionId, Player};

/// Seated players, in turn order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Roster {
    players: Vec<Player>,
}

impl Roster {
    /// Create an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seat a player at the end of the turn order.
    ///
    /// Returns `None` without changing anything if the connection is already
    /// seated or the name is blank once trimmed.
    pub fn add(&mut self, id: ConnectionId, name: &str) -> Option<&Player> {
        let name = name.trim();
        if name.is_empty() || self.contains(&id) {
            return None;
        }

        self.players.push(Player {
            id,
            name: name.to_string(),
            score: 0,
        });
        self.players.last()
    }

    /// Unseat a player, returning it if it was seated.
    pub fn remove(&mut self, id: &ConnectionId) -> Option<Player> {
        let index = self.position(id)?;
        Some(self.players.remove(index))
    }

    /// Whether the connection holds a seat.
    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.position(id).is_some()
    }

    /// Seat index of a connection.
    pub fn position(&self, id: &ConnectionId) -> Option<usize> {
        self.players.iter().position(|p| p.id == *id)
    }

    /// Player at a seat.
    pub fn get(&self, index: usize) -> Option<&Player> {
        self.players.get(index)
    }

    /// Mutable player at a seat.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Player> {
        self.players.get_mut(index)
    }

    /// Players in turn order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Number of seated players.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Whether nobody is seated.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Zero every score.
    pub fn reset_scores(&mut self) {
        for player in &mut self.players {
            player.score = 0;
        }
    }

    /// Sum of all scores.
    pub fn total_score(&self) -> u32 {
        self.players.iter().map(|p| p.score).sum()
    }
}
