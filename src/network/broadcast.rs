//! Broadcast Channel
//!
//! Fans snapshots out to every connected client and delivers private
//! notices to one. Each connection subscribes with its handle and drains
//! its own queue; the match never waits on a slow socket.

use std::collections::BTreeMap;

use tokio::sync::mpsc;
use tracing::debug;

use crate::game::state::{ConnectionId, StateSnapshot};
use crate::network::protocol::ServerMessage;

/// Outbound queues of every connected client.
#[derive(Debug, Default)]
pub struct Broadcaster {
    subscribers: BTreeMap<ConnectionId, mpsc::UnboundedSender<ServerMessage>>,
}

impl Broadcaster {
    /// Create a broadcaster with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection. Replaces any earlier queue for the same handle.
    pub fn subscribe(&mut self, id: ConnectionId) -> mpsc::UnboundedReceiver<ServerMessage> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.insert(id, tx);
        rx
    }

    /// Drop a connection's queue. Returns whether it was subscribed.
    pub fn unsubscribe(&mut self, id: &ConnectionId) -> bool {
        self.subscribers.remove(id).is_some()
    }

    /// Send a snapshot to every subscriber.
    pub fn publish(&mut self, snapshot: StateSnapshot) {
        self.broadcast(ServerMessage::State(snapshot));
    }

    /// Send a private advisory to one subscriber.
    pub fn notify(&mut self, id: &ConnectionId, message: &str) {
        self.send_to(id, ServerMessage::ErrorMessage {
            message: message.to_string(),
        });
    }

    /// Send a message to every subscriber.
    pub fn broadcast(&mut self, message: ServerMessage) {
        let mut closed = Vec::new();
        for (id, tx) in &self.subscribers {
            if tx.send(message.clone()).is_err() {
                closed.push(*id);
            }
        }
        for id in closed {
            debug!("Dropping closed subscriber {}", id);
            self.subscribers.remove(&id);
        }
    }

    /// Send a message to one subscriber.
    pub fn send_to(&mut self, id: &ConnectionId, message: ServerMessage) {
        let closed = match self.subscribers.get(id) {
            Some(tx) => tx.send(message).is_err(),
            None => return,
        };
        if closed {
            debug!("Dropping closed subscriber {}", id);
            self.subscribers.remove(id);
        }
    }

    /// Number of subscribed connections.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::deck::default_card_values;
    use crate::game::state::MatchState;

    fn id(n: u8) -> ConnectionId {
        ConnectionId::from_bytes([n; 16])
    }

    fn snapshot() -> StateSnapshot {
        MatchState::new([0; 16], default_card_values()).snapshot(20)
    }

    #[tokio::test]
    async fn test_publish_reaches_everyone() {
        let mut broadcaster = Broadcaster::new();
        let mut rx1 = broadcaster.subscribe(id(1));
        let mut rx2 = broadcaster.subscribe(id(2));

        broadcaster.publish(snapshot());

        assert!(matches!(rx1.try_recv(), Ok(ServerMessage::State(_))));
        assert!(matches!(rx2.try_recv(), Ok(ServerMessage::State(_))));
    }

    #[tokio::test]
    async fn test_notify_is_private() {
        let mut broadcaster = Broadcaster::new();
        let mut rx1 = broadcaster.subscribe(id(1));
        let mut rx2 = broadcaster.subscribe(id(2));

        broadcaster.notify(&id(2), "It's not your turn!");

        assert!(rx1.try_recv().is_err());
        assert_eq!(
            rx2.try_recv().unwrap(),
            ServerMessage::ErrorMessage { message: "It's not your turn!".to_string() }
        );
    }

    #[tokio::test]
    async fn test_unknown_recipient_ignored() {
        let mut broadcaster = Broadcaster::new();
        let mut rx1 = broadcaster.subscribe(id(1));

        broadcaster.notify(&id(9), "hello");

        assert!(rx1.try_recv().is_err());
        assert_eq!(broadcaster.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn test_closed_subscribers_pruned() {
        let mut broadcaster = Broadcaster::new();
        let rx1 = broadcaster.subscribe(id(1));
        let mut rx2 = broadcaster.subscribe(id(2));
        drop(rx1);

        broadcaster.publish(snapshot());

        assert_eq!(broadcaster.subscriber_count(), 1);
        assert!(rx2.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_unsubscribe() {
        let mut broadcaster = Broadcaster::new();
        let mut rx1 = broadcaster.subscribe(id(1));

        assert!(broadcaster.unsubscribe(&id(1)));
        assert!(!broadcaster.unsubscribe(&id(1)));
        broadcaster.publish(snapshot());

        // Sender dropped: the queue reports disconnection, not a message.
        assert!(matches!(
            rx1.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
    }
}
