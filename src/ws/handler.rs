//! WebSocket gateway: translates wire messages into room-actor events
//! and streams redacted snapshots back out.
//!
//! Each socket carries one session context `{room, playerId}`. On
//! disconnect the player is not removed; the actor starts a grace timer
//! and a reconnect with the same playerId reattaches the seat.

use crate::actor::{RoomEvent, RoomHandle, RoomRegistry};
use crate::game::constants::SUBSCRIBER_CHANNEL_CAPACITY;
use crate::game::room::RoomSnapshot;
use crate::ws::messages::{ClientMessage, ServerMessage};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(registry): State<Arc<RoomRegistry>>,
) -> Response {
    ws.max_message_size(8 * 1024)
        .on_upgrade(move |socket| handle_socket(socket, registry))
}

/// One second of client frames at most fills this budget. A hand never
/// needs more than a few intents per second; anything past the cap is a
/// misbehaving or looping client, refused per-frame until the window
/// rolls over.
const FRAME_WINDOW: Duration = Duration::from_secs(1);
const FRAMES_PER_WINDOW: u32 = 12;

struct FrameBudget {
    window_start: std::time::Instant,
    used: u32,
}

impl FrameBudget {
    fn new() -> Self {
        Self {
            window_start: std::time::Instant::now(),
            used: 0,
        }
    }

    fn try_consume(&mut self) -> bool {
        let now = std::time::Instant::now();
        if now.duration_since(self.window_start) >= FRAME_WINDOW {
            self.window_start = now;
            self.used = 0;
        }
        if self.used < FRAMES_PER_WINDOW {
            self.used += 1;
            true
        } else {
            false
        }
    }
}

struct Session {
    room: Option<RoomHandle>,
    player_id: Option<String>,
}

async fn handle_socket(socket: WebSocket, registry: Arc<RoomRegistry>) {
    let (mut sender, mut receiver) = socket.split();

    send_message(&mut sender, &ServerMessage::Connected).await;

    let conn_id = registry.next_conn_id();
    let mut session = Session {
        room: None,
        player_id: None,
    };
    let (snapshot_tx, mut snapshot_rx) =
        mpsc::channel::<RoomSnapshot>(SUBSCRIBER_CHANNEL_CAPACITY);
    let mut frame_budget = FrameBudget::new();
    let mut ping_interval = tokio::time::interval(Duration::from_secs(30));
    let mut last_pong = tokio::time::Instant::now();

    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if !frame_budget.try_consume() {
                            let error = ServerMessage::Error {
                                message: "Rate limited: too many messages".to_string(),
                            };
                            send_message(&mut sender, &error).await;
                            continue;
                        }

                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(client_msg) => {
                                let response = handle_client_message(
                                    client_msg,
                                    conn_id,
                                    &registry,
                                    &mut session,
                                    &snapshot_tx,
                                )
                                .await;
                                if let Some(response) = response {
                                    send_message(&mut sender, &response).await;
                                }
                            }
                            Err(e) => {
                                let error = ServerMessage::Error {
                                    message: format!("Invalid message: {}", e),
                                };
                                send_message(&mut sender, &error).await;
                            }
                        }
                    }
                    Some(Ok(Message::Pong(_))) => {
                        last_pong = tokio::time::Instant::now();
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) => break,
                }
            }

            snapshot = snapshot_rx.recv() => {
                if let Some(snapshot) = snapshot {
                    // A failed write just drops this delivery; the next
                    // snapshot arrives after reconnect.
                    if let Ok(json) = serde_json::to_string(&ServerMessage::GameState(snapshot)) {
                        if sender.send(Message::Text(json)).await.is_err() {
                            break;
                        }
                    }
                }
            }

            // Server-side heartbeat: a socket silent past the pong window
            // is treated as disconnected.
            _ = ping_interval.tick() => {
                if last_pong.elapsed() > Duration::from_secs(40) {
                    tracing::warn!(conn = conn_id, "no pong in 40s, closing connection");
                    break;
                }
                if sender.send(Message::Ping(vec![])).await.is_err() {
                    break;
                }
            }
        }
    }

    detach(conn_id, &mut session).await;
}

/// Unsubscribe the socket and start the player's disconnect grace clock.
async fn detach(conn_id: u64, session: &mut Session) {
    if let Some(handle) = session.room.take() {
        let _ = handle.send(RoomEvent::Unsubscribe { conn_id }).await;
        if let Some(player_id) = session.player_id.take() {
            let _ = handle.send(RoomEvent::Disconnected { player_id }).await;
        }
    }
}

async fn handle_client_message(
    msg: ClientMessage,
    conn_id: u64,
    registry: &RoomRegistry,
    session: &mut Session,
    snapshot_tx: &mpsc::Sender<RoomSnapshot>,
) -> Option<ServerMessage> {
    match msg {
        ClientMessage::JoinRoom {
            room_id,
            nickname,
            player_id,
        } => {
            // Switching rooms detaches from the old one first.
            detach(conn_id, session).await;

            let handle = registry.get_or_create(&room_id).await;
            match handle.join(nickname, player_id).await {
                Ok(authoritative_id) => {
                    let _ = handle
                        .send(RoomEvent::Subscribe {
                            conn_id,
                            player_id: Some(authoritative_id.clone()),
                            tx: snapshot_tx.clone(),
                        })
                        .await;
                    session.room = Some(handle);
                    session.player_id = Some(authoritative_id.clone());
                    Some(ServerMessage::JoinedRoom {
                        room_id,
                        player_id: authoritative_id,
                    })
                }
                Err(message) => Some(ServerMessage::Error { message }),
            }
        }

        ClientMessage::StartGame => {
            let (handle, player_id) = match (&session.room, &session.player_id) {
                (Some(handle), Some(player_id)) => (handle, player_id.clone()),
                _ => {
                    return Some(ServerMessage::Error {
                        message: "Join a room first".to_string(),
                    })
                }
            };
            match handle.start(player_id).await {
                Ok(()) => None,
                Err(message) => Some(ServerMessage::Error { message }),
            }
        }

        ClientMessage::SendIntent(wire) => {
            let (handle, player_id) = match (&session.room, &session.player_id) {
                (Some(handle), Some(player_id)) => (handle, player_id.clone()),
                _ => {
                    return Some(ServerMessage::Error {
                        message: "Join a room first".to_string(),
                    })
                }
            };
            match handle.intent(player_id, wire.to_intent()).await {
                Ok(()) => None,
                Err(message) => Some(ServerMessage::Error { message }),
            }
        }
    }
}

async fn send_message(sender: &mut SplitSink<WebSocket, Message>, msg: &ServerMessage) {
    if let Ok(json) = serde_json::to_string(msg) {
        let _ = sender.send(Message::Text(json)).await;
    }
}
