//! Match Session
//!
//! Owns the one match this process runs together with its broadcaster,
//! and carries out the effects of every transition. All access goes
//! through a single async mutex, so intents are applied one at a time
//! and each runs to completion.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::AbortHandle;
use tracing::{debug, info};

use crate::game::intent::Intent;
use crate::game::state::{ConnectionId, MatchState, StateSnapshot};
use crate::game::transition::{
    apply, resolve_mismatch, Effect, MatchConfig, PendingResolution, TransitionResult,
};
use crate::network::broadcast::Broadcaster;
use crate::network::protocol::ServerMessage;

/// Session shared by every connection task.
pub type SharedSession = Arc<Mutex<MatchSession>>;

/// The match plus everything needed to keep clients in sync with it.
pub struct MatchSession {
    /// Game rules.
    config: MatchConfig,
    /// Authoritative state.
    state: MatchState,
    /// Connected clients.
    broadcaster: Broadcaster,
    /// Mismatch resolution waiting on its timer.
    pending: Option<(PendingResolution, AbortHandle)>,
}

impl MatchSession {
    /// Create a session and deal its first board.
    pub fn new(match_id: [u8; 16], config: MatchConfig) -> Self {
        let state = MatchState::new(match_id, config.card_values.clone());
        info!(
            "Match {} dealt round {} (seed {})",
            hex::encode(match_id),
            state.round,
            state.rng_seed
        );

        Self {
            config,
            state,
            broadcaster: Broadcaster::new(),
            pending: None,
        }
    }

    /// Wrap the session for sharing across tasks.
    pub fn shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    /// Register a connection: it is told its handle and sent the current
    /// board straight away, before it joins.
    pub fn connect(&mut self, id: ConnectionId) -> mpsc::UnboundedReceiver<ServerMessage> {
        let rx = self.broadcaster.subscribe(id);
        self.broadcaster.send_to(&id, ServerMessage::Welcome { id });
        let snapshot = self.snapshot();
        self.broadcaster.send_to(&id, ServerMessage::State(snapshot));
        rx
    }

    /// Apply an intent and carry out its effects.
    ///
    /// Returns the mismatch resolution the caller must schedule, if any.
    /// Use [`dispatch`] unless you drive the timer yourself.
    pub fn process(&mut self, intent: Intent) -> Option<PendingResolution> {
        let round = self.state.round;
        let from = intent.connection();
        let result = apply(&mut self.state, intent, &self.config);

        if result.is_noop() {
            debug!("Intent from {} ignored", from);
        }
        if self.state.round != round {
            self.on_new_deal();
        }

        self.carry_out(result)
    }

    /// Flip a mismatched pair back and pass the turn.
    pub fn resolve(&mut self, pending: PendingResolution) {
        if matches!(self.pending, Some((p, _)) if p == pending) {
            self.pending = None;
        }
        let result = resolve_mismatch(&mut self.state, pending, &self.config);
        self.carry_out(result);
    }

    /// Remember the timer task so a reset can cancel it.
    pub fn track_pending(&mut self, pending: PendingResolution, handle: AbortHandle) {
        if let Some((_, previous)) = self.pending.replace((pending, handle)) {
            previous.abort();
        }
    }

    /// Unsubscribe a connection and release its seat.
    pub fn disconnect(&mut self, id: ConnectionId) {
        self.broadcaster.unsubscribe(&id);
        if let Some(player) = self.state.roster.players().iter().find(|p| p.id == id) {
            info!("Player {} left", player.name);
        }
        let scheduled = self.process(Intent::Disconnect { id });
        debug_assert!(scheduled.is_none());
    }

    /// Current client view.
    pub fn snapshot(&self) -> StateSnapshot {
        self.state.snapshot(self.config.history_limit)
    }

    /// Authoritative state (read-only).
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// Whether a mismatch timer is running.
    pub fn has_pending_resolution(&self) -> bool {
        self.pending.is_some()
    }

    /// Connected clients (seated or not).
    pub fn connection_count(&self) -> usize {
        self.broadcaster.subscriber_count()
    }

    /// Send a message to one connected client.
    pub fn send_to(&mut self, id: ConnectionId, message: ServerMessage) {
        self.broadcaster.send_to(&id, message);
    }

    fn on_new_deal(&mut self) {
        if let Some((pending, handle)) = self.pending.take() {
            debug!("Cancelling mismatch resolution {:?}", pending);
            handle.abort();
        }
        info!(
            "Match {} dealt round {} (seed {})",
            hex::encode(self.state.match_id),
            self.state.round,
            self.state.rng_seed
        );
    }

    fn carry_out(&mut self, result: TransitionResult) -> Option<PendingResolution> {
        let mut scheduled = None;
        for effect in result.effects {
            match effect {
                Effect::Publish(snapshot) => self.broadcaster.publish(snapshot),
                Effect::Notify { to, notice } => {
                    debug!("Notifying {}: {:?}", to, notice);
                    self.broadcaster.notify(&to, notice.message());
                }
                Effect::ScheduleResolution(pending) => scheduled = Some(pending),
            }
        }
        scheduled
    }
}

/// Apply an intent to a shared session, scheduling the delayed mismatch
/// resolution when one is due.
pub async fn dispatch(session: &SharedSession, intent: Intent) {
    let mut guard = session.lock().await;
    let was_finished = guard.state.is_finished;

    if let Some(pending) = guard.process(intent) {
        schedule_resolution(session, &mut *guard, pending);
    }

    if !was_finished && guard.state.is_finished {
        let winner = guard
            .state
            .roster
            .players()
            .iter()
            .max_by_key(|p| p.score)
            .map(|p| p.name.clone())
            .unwrap_or_default();
        info!("Match finished, top score: {}", winner);
    }
}

/// Unsubscribe a connection and release its seat.
pub async fn disconnect(session: &SharedSession, id: ConnectionId) {
    session.lock().await.disconnect(id);
}

fn schedule_resolution(session: &SharedSession, guard: &mut MatchSession, pending: PendingResolution) {
    let delay = guard.config.mismatch_delay;
    let task_session = Arc::clone(session);

    let handle = tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        task_session.lock().await.resolve(pending);
    });

    guard.track_pending(pending, handle.abort_handle());
}
