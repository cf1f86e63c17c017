//! Authoritative State Transitions
//!
//! Applies intents to the [`MatchState`] and reports what the outside world
//! must do about it: snapshots to publish, private notices to deliver, and
//! the delayed mismatch resolution to schedule.
//!
//! Nothing here touches the network or the clock (except move timestamps).
//! Every snapshot is taken at the moment it is produced, so a flip that
//! reveals and then matches yields two distinct snapshots.

use std::time::Duration;

use tracing::{debug, info};

use crate::game::deck::default_card_values;
use crate::game::intent::Intent;
use crate::game::state::{ConnectionId, MatchState, Move, StateSnapshot};
use crate::{DEFAULT_HISTORY_LIMIT, DEFAULT_MISMATCH_DELAY_MS};

/// Game rules configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchConfig {
    /// Alphabet the deck is dealt from; each value appears twice.
    pub card_values: Vec<String>,
    /// Moves exposed in snapshots.
    pub history_limit: usize,
    /// How long a mismatched pair stays face-up.
    pub mismatch_delay: Duration,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            card_values: default_card_values(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            mismatch_delay: Duration::from_millis(DEFAULT_MISMATCH_DELAY_MS),
        }
    }
}

/// Private advisories sent to a single connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notice {
    /// Flip attempted out of turn.
    NotYourTurn,
    /// Reset attempted by someone other than the turn holder.
    ResetNotAllowed,
}

impl Notice {
    /// Text shown to the player.
    pub fn message(self) -> &'static str {
        match self {
            Notice::NotYourTurn => "It's not your turn!",
            Notice::ResetNotAllowed => "Only the player whose turn it is can reset the match.",
        }
    }
}

/// A mismatched pair waiting to be flipped back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingResolution {
    /// Deal the mismatch happened in.
    pub round: u64,
    /// First card flipped.
    pub first: usize,
    /// Second card flipped.
    pub second: usize,
}

/// Something the session must do after a transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Send this snapshot to every connection.
    Publish(StateSnapshot),
    /// Send a private notice to one connection.
    Notify {
        /// Recipient.
        to: ConnectionId,
        /// What to tell them.
        notice: Notice,
    },
    /// Run [`resolve_mismatch`] after the configured delay.
    ScheduleResolution(PendingResolution),
}

/// Result of applying one intent.
#[derive(Debug, Default)]
pub struct TransitionResult {
    /// Effects in the order they must be carried out.
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    fn publish(&mut self, state: &MatchState, config: &MatchConfig) {
        self.effects.push(Effect::Publish(state.snapshot(config.history_limit)));
    }

    fn notify(&mut self, to: ConnectionId, notice: Notice) {
        self.effects.push(Effect::Notify { to, notice });
    }

    /// Whether the intent was dropped without any visible effect.
    pub fn is_noop(&self) -> bool {
        self.effects.is_empty()
    }

    /// Snapshots to publish, in order.
    pub fn snapshots(&self) -> impl Iterator<Item = &StateSnapshot> {
        self.effects.iter().filter_map(|e| match e {
            Effect::Publish(s) => Some(s),
            _ => None,
        })
    }

    /// Mismatch resolution to schedule, if any.
    pub fn scheduled(&self) -> Option<PendingResolution> {
        self.effects.iter().find_map(|e| match e {
            Effect::ScheduleResolution(p) => Some(*p),
            _ => None,
        })
    }
}

/// Apply one intent to the match.
pub fn apply(state: &mut MatchState, intent: Intent, config: &MatchConfig) -> TransitionResult {
    match intent {
        Intent::Join { id, name } => join(state, id, &name, config),
        Intent::Flip { id, index } => flip(state, id, index, config),
        Intent::Reset { id } => reset(state, id, config),
        Intent::Disconnect { id } => disconnect(state, id, config),
    }
}

fn join(state: &mut MatchState, id: ConnectionId, name: &str, config: &MatchConfig) -> TransitionResult {
    let mut result = TransitionResult::default();

    match state.roster.add(id, name) {
        Some(player) => info!("Player {} joined", player.name),
        None => {
            debug!("Ignoring join from {}: blank name or already seated", id);
            return result;
        }
    }

    // First player in starts a fresh deal.
    if state.roster.len() == 1 {
        state.reset();
    }

    result.publish(state, config);
    result
}

fn flip(state: &mut MatchState, id: ConnectionId, index: i64, config: &MatchConfig) -> TransitionResult {
    let mut result = TransitionResult::default();

    if state.is_finished || state.revealed_indices.len() >= 2 {
        return result;
    }
    let index = match usize::try_from(index) {
        Ok(i) if i < state.cards.len() => i,
        _ => return result,
    };

    if !state.is_turn_of(&id) {
        result.notify(id, Notice::NotYourTurn);
        return result;
    }

    let card = &mut state.cards[index];
    if card.is_matched || card.is_revealed {
        return result;
    }
    card.is_revealed = true;
    state.revealed_indices.push(index);
    result.publish(state, config);

    if let &[first, second] = state.revealed_indices.as_slice() {
        let is_match = state.cards[first].value == state.cards[second].value;
        let player_name = state
            .current_player()
            .map(|p| p.name.clone())
            .unwrap_or_default();
        state.move_history.push(Move::record(
            &player_name,
            &state.cards[first],
            &state.cards[second],
            is_match,
        ));

        if is_match {
            state.cards[first].is_matched = true;
            state.cards[second].is_matched = true;
            if let Some(player) = state.roster.get_mut(state.turn) {
                player.score += 1;
            }
            state.revealed_indices.clear();
            if state.all_matched() {
                state.is_finished = true;
            }
            result.publish(state, config);
        } else {
            result.effects.push(Effect::ScheduleResolution(PendingResolution {
                round: state.round,
                first,
                second,
            }));
        }
    }

    result
}

fn reset(state: &mut MatchState, id: ConnectionId, config: &MatchConfig) -> TransitionResult {
    let mut result = TransitionResult::default();

    if !state.is_turn_of(&id) {
        result.notify(id, Notice::ResetNotAllowed);
        return result;
    }

    state.reset();
    result.publish(state, config);
    result
}

fn disconnect(state: &mut MatchState, id: ConnectionId, config: &MatchConfig) -> TransitionResult {
    let mut result = TransitionResult::default();

    if state.roster.remove(&id).is_none() {
        return result;
    }

    if state.roster.is_empty() {
        state.reset();
    } else {
        // Clamp only; the pointer may land on a different player than
        // the one who would have gone next.
        state.turn %= state.roster.len();
    }

    result.publish(state, config);
    result
}

/// Flip a mismatched pair back and pass the turn.
///
/// Runs after the mismatch delay, so the match may have moved on in the
/// meantime. A ticket from an earlier deal, or one whose pair is no longer
/// the face-up pair, is dropped. Cards matched in the meantime stay up.
pub fn resolve_mismatch(
    state: &mut MatchState,
    pending: PendingResolution,
    config: &MatchConfig,
) -> TransitionResult {
    let mut result = TransitionResult::default();

    if pending.round != state.round || state.revealed_indices[..] != [pending.first, pending.second] {
        debug!("Dropping stale mismatch resolution {:?}", pending);
        return result;
    }

    for index in [pending.first, pending.second] {
        if let Some(card) = state.cards.get_mut(index) {
            if !card.is_matched {
                card.is_revealed = false;
            }
        }
    }
    state.revealed_indices.clear();
    if !state.roster.is_empty() {
        state.turn = (state.turn + 1) % state.roster.len();
    }

    result.publish(state, config);
    result
}
