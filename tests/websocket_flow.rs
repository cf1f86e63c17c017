//! Integration test: clients play the shared match over real sockets.
//!
//! Each test starts an in-process server on an ephemeral port and talks
//! to it with plain WebSocket clients.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use memory_match::game::state::StateSnapshot;
use memory_match::network::ServerMessage;
use memory_match::{GameServer, MatchConfig, ServerConfig};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

// ============================================================================
// Helpers
// ============================================================================

async fn start_server(mismatch_delay: Duration) -> (Arc<GameServer>, String) {
    let config = ServerConfig {
        match_config: MatchConfig {
            mismatch_delay,
            ..Default::default()
        },
        ..Default::default()
    };
    let server = Arc::new(GameServer::new(config));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());

    let running = Arc::clone(&server);
    tokio::spawn(async move { running.serve(listener).await });

    (server, url)
}

async fn connect(url: &str) -> Client {
    let (mut ws, _) = connect_async(url).await.unwrap();
    assert!(matches!(recv(&mut ws).await, ServerMessage::Welcome { .. }));
    assert!(matches!(recv(&mut ws).await, ServerMessage::State(_)));
    ws
}

async fn recv(ws: &mut Client) -> ServerMessage {
    loop {
        let frame = timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for a message")
            .expect("stream ended")
            .unwrap();
        if let Message::Text(text) = frame {
            return ServerMessage::from_json(&text).unwrap();
        }
    }
}

async fn recv_state(ws: &mut Client) -> StateSnapshot {
    match recv(ws).await {
        ServerMessage::State(snapshot) => snapshot,
        other => panic!("expected state, got {other:?}"),
    }
}

async fn assert_silent(ws: &mut Client) {
    assert!(timeout(Duration::from_millis(150), ws.next()).await.is_err());
}

async fn send(ws: &mut Client, json: &str) {
    ws.send(Message::Text(json.to_string())).await.unwrap();
}

async fn flip(ws: &mut Client, index: usize) {
    send(ws, &format!(r#"{{"type":"flipCard","index":{index}}}"#)).await;
}

/// Seats Ann (turn holder) and Bob, leaving both queues drained.
async fn seat_two(url: &str) -> (Client, Client) {
    let mut ann = connect(url).await;
    let mut bob = connect(url).await;

    send(&mut ann, r#"{"type":"join","name":"Ann"}"#).await;
    recv_state(&mut ann).await;
    recv_state(&mut bob).await;

    send(&mut bob, r#"{"type":"join","name":"Bob"}"#).await;
    let snapshot = recv_state(&mut ann).await;
    recv_state(&mut bob).await;
    assert_eq!(snapshot.players.len(), 2);

    (ann, bob)
}

async fn board(server: &GameServer) -> Vec<String> {
    let session = server.session().lock().await;
    session.state().cards.iter().map(|c| c.value.clone()).collect()
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_connect_receives_welcome_then_board() {
    let (server, url) = start_server(Duration::from_millis(1000)).await;
    let (mut ws, _) = connect_async(url.as_str()).await.unwrap();

    let welcome = recv(&mut ws).await;
    let ServerMessage::Welcome { id } = welcome else {
        panic!("expected welcome, got {welcome:?}");
    };
    let snapshot = recv_state(&mut ws).await;
    assert_eq!(snapshot.cards.len(), 16);
    assert!(snapshot.players.is_empty());
    assert!(!snapshot.is_finished);

    send(&mut ws, r#"{"type":"join","name":"Ann"}"#).await;
    let snapshot = recv_state(&mut ws).await;
    assert_eq!(snapshot.players[0].id, id);
    assert_eq!(snapshot.players[0].score, 0);

    server.shutdown();
}

#[tokio::test]
async fn test_out_of_turn_flip_is_private() {
    let (server, url) = start_server(Duration::from_millis(1000)).await;
    let (mut ann, mut bob) = seat_two(&url).await;

    flip(&mut bob, 0).await;

    assert_eq!(
        recv(&mut bob).await,
        ServerMessage::ErrorMessage { message: "It's not your turn!".to_string() }
    );
    assert_silent(&mut ann).await;

    server.shutdown();
}

#[tokio::test]
async fn test_matching_pair_scores_and_keeps_turn() {
    let (server, url) = start_server(Duration::from_millis(1000)).await;
    let (mut ann, mut bob) = seat_two(&url).await;

    let values = board(&server).await;
    let partner = (1..values.len()).find(|&i| values[i] == values[0]).unwrap();

    flip(&mut ann, 0).await;
    recv_state(&mut ann).await;
    recv_state(&mut bob).await;

    flip(&mut ann, partner).await;
    let snapshot = recv_state(&mut bob).await;
    recv_state(&mut ann).await;

    assert_eq!(snapshot.turn, 0);
    assert_eq!(snapshot.players[0].score, 1);
    assert!(snapshot.cards[0].is_matched);
    assert!(snapshot.cards[partner].is_matched);
    assert!(snapshot.revealed_indices.is_empty());
    assert_eq!(snapshot.move_history.len(), 1);
    assert!(snapshot.move_history[0].success);

    server.shutdown();
}

#[tokio::test]
async fn test_mismatch_flips_back_and_passes_turn() {
    let (server, url) = start_server(Duration::from_millis(50)).await;
    let (mut ann, mut bob) = seat_two(&url).await;

    let values = board(&server).await;
    let other = (1..values.len()).find(|&i| values[i] != values[0]).unwrap();

    flip(&mut ann, 0).await;
    flip(&mut ann, other).await;
    recv_state(&mut bob).await;
    let revealed = recv_state(&mut bob).await;
    assert_eq!(revealed.revealed_indices, vec![0, other]);
    assert_eq!(revealed.turn, 0);

    let resolved = recv_state(&mut bob).await;
    assert_eq!(resolved.turn, 1);
    assert!(resolved.revealed_indices.is_empty());
    assert!(!resolved.cards[0].is_revealed);
    assert!(!resolved.cards[other].is_revealed);
    assert!(!resolved.move_history[0].success);

    server.shutdown();
}

#[tokio::test]
async fn test_malformed_frames_are_ignored() {
    let (server, url) = start_server(Duration::from_millis(1000)).await;
    let mut ws = connect(&url).await;

    send(&mut ws, "not json").await;
    send(&mut ws, r#"{"type":"flipCard","index":"3"}"#).await;
    ws.send(Message::Binary(vec![1, 2, 3])).await.unwrap();
    assert_silent(&mut ws).await;

    // The connection is still usable afterwards.
    send(&mut ws, r#"{"type":"join","name":"Ann"}"#).await;
    assert_eq!(recv_state(&mut ws).await.players.len(), 1);

    server.shutdown();
}

#[tokio::test]
async fn test_leaving_releases_the_seat() {
    let (server, url) = start_server(Duration::from_millis(1000)).await;
    let (ann, mut bob) = seat_two(&url).await;

    drop(ann);

    let snapshot = recv_state(&mut bob).await;
    assert_eq!(snapshot.players.len(), 1);
    assert_eq!(snapshot.players[0].name, "Bob");
    assert_eq!(snapshot.turn, 0);

    server.shutdown();
}

#[tokio::test]
async fn test_shutdown_notifies_clients() {
    let (server, url) = start_server(Duration::from_millis(1000)).await;
    let mut ws = connect(&url).await;

    server.shutdown();

    assert!(matches!(recv(&mut ws).await, ServerMessage::Shutdown { .. }));
}
