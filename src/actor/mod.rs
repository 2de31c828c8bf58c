//! Per-room actor: one serialized event queue per room.
//!
//! All context mutation happens on this single logical thread of
//! control, so the machine needs no locking. I/O (persist, publish,
//! deliver) happens only after a transition has fully settled, and
//! timers never touch state directly; firing feeds an event back
//! through the same handler path.

mod registry;

pub use registry::RoomRegistry;

use crate::broadcast::Fabric;
use crate::config::Config;
use crate::game::constants::ROOM_QUEUE_CAPACITY;
use crate::game::room::{GameRoom, Intent, Phase, RoomSnapshot};
use crate::store::{room_key, Store};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use uuid::Uuid;

/// Events a room actor consumes, in strict arrival order.
pub enum RoomEvent {
    Join {
        nickname: String,
        /// Previously issued id for a rejoin; anything else seats a new player.
        player_id: Option<String>,
        reply: oneshot::Sender<Result<String, String>>,
    },
    Leave {
        player_id: String,
    },
    Start {
        player_id: String,
        reply: oneshot::Sender<Result<(), String>>,
    },
    Intent {
        player_id: String,
        intent: Intent,
        reply: oneshot::Sender<Result<(), String>>,
    },
    Subscribe {
        conn_id: u64,
        player_id: Option<String>,
        tx: mpsc::Sender<RoomSnapshot>,
    },
    Unsubscribe {
        conn_id: u64,
    },
    /// Socket lost; start the reconnect grace clock for this player.
    Disconnected {
        player_id: String,
    },
    /// A snapshot produced by another node, to fan out locally as-is.
    RemoteSnapshot(Box<GameRoom>),
}

/// Cheap cloneable sender half of a room's queue.
#[derive(Clone)]
pub struct RoomHandle {
    sender: mpsc::Sender<RoomEvent>,
    room_id: String,
}

impl RoomHandle {
    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub async fn send(&self, event: RoomEvent) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|_| "Room is closed".to_string())
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Join (or rejoin) and get back the authoritative player id.
    pub async fn join(
        &self,
        nickname: String,
        player_id: Option<String>,
    ) -> Result<String, String> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomEvent::Join {
            nickname,
            player_id,
            reply,
        })
        .await?;
        rx.await.map_err(|_| "Room is closed".to_string())?
    }

    pub async fn start(&self, player_id: String) -> Result<(), String> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomEvent::Start { player_id, reply }).await?;
        rx.await.map_err(|_| "Room is closed".to_string())?
    }

    pub async fn intent(&self, player_id: String, intent: Intent) -> Result<(), String> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomEvent::Intent {
            player_id,
            intent,
            reply,
        })
        .await?;
        rx.await.map_err(|_| "Room is closed".to_string())?
    }
}

struct Subscriber {
    player_id: Option<String>,
    tx: mpsc::Sender<RoomSnapshot>,
}

/// Turn-timer identity: a new (hand, street, seat) combination means a
/// new active-player slot, which re-arms the clock. A join or subscribe
/// mid-turn must not reset it.
type TurnKey = (u64, Phase, usize);

pub struct RoomActor {
    room: GameRoom,
    inbox: mpsc::Receiver<RoomEvent>,
    subscribers: HashMap<u64, Subscriber>,
    store: Store,
    fabric: Fabric,
    config: Arc<Config>,
    turn_deadline: Option<(Instant, TurnKey)>,
    reveal_deadline: Option<Instant>,
    grace_deadlines: HashMap<String, Instant>,
    idle_deadline: Option<Instant>,
}

impl RoomActor {
    /// Spawn the actor task for `room` and return its handle.
    pub fn spawn(room: GameRoom, store: Store, fabric: Fabric, config: Arc<Config>) -> RoomHandle {
        let (sender, inbox) = mpsc::channel(ROOM_QUEUE_CAPACITY);
        let handle = RoomHandle {
            sender,
            room_id: room.room_id.clone(),
        };
        let actor = Self {
            room,
            inbox,
            subscribers: HashMap::new(),
            store,
            fabric,
            config,
            turn_deadline: None,
            reveal_deadline: None,
            grace_deadlines: HashMap::new(),
            idle_deadline: None,
        };
        tokio::spawn(actor.run());
        handle
    }

    async fn run(mut self) {
        tracing::info!(room = %self.room.room_id, "room actor started");
        // A rehydrated room may resume mid-hand; put its clocks back.
        self.refresh_timers();

        loop {
            let turn_at = self.turn_deadline.map(|(at, _)| at);
            let reveal_at = self.reveal_deadline;
            let next_grace = self.next_grace();
            let grace_at = next_grace.as_ref().map(|(_, at)| *at);
            let idle_at = self.idle_deadline;

            tokio::select! {
                maybe = self.inbox.recv() => match maybe {
                    Some(event) => self.handle_event(event).await,
                    None => break,
                },
                _ = sleep_until_opt(turn_at) => self.on_turn_timeout().await,
                _ = sleep_until_opt(reveal_at) => self.on_reveal_elapsed().await,
                _ = sleep_until_opt(grace_at) => {
                    if let Some((player_id, _)) = next_grace {
                        self.on_grace_expired(player_id).await;
                    }
                },
                _ = sleep_until_opt(idle_at) => {
                    if self.subscribers.is_empty() {
                        tracing::info!(room = %self.room.room_id, "idle, retiring actor");
                        break;
                    }
                    self.idle_deadline = None;
                },
            }
        }

        self.persist().await;
        tracing::info!(room = %self.room.room_id, "room actor stopped");
    }

    async fn handle_event(&mut self, event: RoomEvent) {
        match event {
            RoomEvent::Join {
                nickname,
                player_id,
                reply,
            } => {
                let result = self.handle_join(nickname, player_id);
                let changed = result.is_ok();
                let _ = reply.send(result);
                if changed {
                    self.after_transition().await;
                }
            }

            RoomEvent::Leave { player_id } => {
                self.grace_deadlines.remove(&player_id);
                if self.room.seat_of(&player_id).is_some() {
                    if let Err(e) = self.room.remove_player(&player_id) {
                        self.fatal("leave", e);
                    }
                    self.after_transition().await;
                }
            }

            RoomEvent::Start { player_id, reply } => {
                let result = self.room.start(&player_id);
                let changed = result.is_ok();
                let _ = reply.send(result.map_err(|e| e.to_string()));
                if changed {
                    self.after_transition().await;
                }
            }

            RoomEvent::Intent {
                player_id,
                intent,
                reply,
            } => {
                let result = self.room.apply_intent(&player_id, intent);
                let changed = result.is_ok();
                if let Err(e) = &result {
                    // Refused silently from the machine's perspective; the
                    // originator still gets a diagnostic.
                    tracing::debug!(room = %self.room.room_id, player = %player_id, "intent refused: {}", e);
                }
                let _ = reply.send(result.map_err(|e| e.to_string()));
                if changed {
                    self.after_transition().await;
                }
            }

            RoomEvent::Subscribe {
                conn_id,
                player_id,
                tx,
            } => {
                // Immediate snapshot so a late subscriber catches up.
                let snapshot = self.room.snapshot_for(player_id.as_deref());
                let _ = tx.try_send(snapshot);
                self.subscribers.insert(conn_id, Subscriber { player_id, tx });
                self.idle_deadline = None;
            }

            RoomEvent::Unsubscribe { conn_id } => {
                self.subscribers.remove(&conn_id);
                self.maybe_arm_idle();
            }

            RoomEvent::Disconnected { player_id } => {
                // A stale disconnect can trail a reattached session; only
                // players with no live subscription start the clock.
                let attached = self
                    .subscribers
                    .values()
                    .any(|s| s.player_id.as_deref() == Some(player_id.as_str()));
                if !attached && self.room.seat_of(&player_id).is_some() {
                    tracing::info!(
                        room = %self.room.room_id,
                        player = %player_id,
                        "disconnected, grace period started"
                    );
                    self.grace_deadlines.insert(
                        player_id,
                        Instant::now() + self.config.disconnect_grace(),
                    );
                }
            }

            RoomEvent::RemoteSnapshot(room) => {
                Self::deliver(&room, &mut self.subscribers);
                self.maybe_arm_idle();
            }
        }
    }

    fn handle_join(
        &mut self,
        nickname: String,
        supplied: Option<String>,
    ) -> Result<String, String> {
        if let Some(id) = supplied {
            if self.room.seat_of(&id).is_some() {
                // Reattach: the seat, chips and hole cards are untouched.
                self.grace_deadlines.remove(&id);
                self.room.history.push(format!("{} reconnects", nickname));
                tracing::info!(room = %self.room.room_id, player = %id, "player reattached");
                return Ok(id);
            }
        }
        let id = Uuid::new_v4().to_string();
        self.room
            .add_player(id.clone(), nickname)
            .map_err(|e| e.to_string())?;
        Ok(id)
    }

    /// Post-transition pipeline, in order: persist, broadcast, timers.
    async fn after_transition(&mut self) {
        self.persist().await;
        self.broadcast().await;
        self.refresh_timers();
    }

    async fn persist(&mut self) {
        let bytes = match serde_json::to_vec(&self.room) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(room = %self.room.room_id, "context serialization failed: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.set(&room_key(&self.room.room_id), bytes).await {
            // In-memory state stays canonical; the next transition retries.
            tracing::warn!(room = %self.room.room_id, "store write failed: {}", e);
        }
    }

    async fn broadcast(&mut self) {
        Self::deliver(&self.room, &mut self.subscribers);
        self.maybe_arm_idle();
        if let Err(e) = self.fabric.publish(&self.room).await {
            tracing::warn!(room = %self.room.room_id, "broker publish failed: {}", e);
        }
    }

    /// Deliver one redacted snapshot per subscriber. Closed channels drop
    /// the subscriber; a full channel drops this delivery only.
    fn deliver(room: &GameRoom, subscribers: &mut HashMap<u64, Subscriber>) {
        subscribers.retain(|conn_id, sub| {
            let snapshot = room.snapshot_for(sub.player_id.as_deref());
            match sub.tx.try_send(snapshot) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(conn = conn_id, "subscriber lagging, snapshot dropped");
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => false,
            }
        });
    }

    fn refresh_timers(&mut self) {
        if self.room.phase.is_street() {
            let key = (
                self.room.hand_no,
                self.room.phase,
                self.room.active_player_index,
            );
            let stale = self.turn_deadline.map(|(_, k)| k != key).unwrap_or(true);
            if stale {
                self.turn_deadline = Some((Instant::now() + self.config.turn_timeout(), key));
            }
        } else {
            self.turn_deadline = None;
        }

        if self.room.phase == Phase::Reveal {
            if self.reveal_deadline.is_none() {
                self.reveal_deadline = Some(Instant::now() + self.config.reveal_delay());
            }
        } else {
            self.reveal_deadline = None;
        }

        self.maybe_arm_idle();
    }

    fn maybe_arm_idle(&mut self) {
        let parked = self.subscribers.is_empty()
            && !self.room.phase.is_street()
            && self.room.phase != Phase::Reveal;
        if parked {
            if self.idle_deadline.is_none() {
                self.idle_deadline = Some(Instant::now() + self.config.room_idle());
            }
        } else {
            self.idle_deadline = None;
        }
    }

    fn next_grace(&self) -> Option<(String, Instant)> {
        self.grace_deadlines
            .iter()
            .min_by_key(|(_, at)| **at)
            .map(|(id, at)| (id.clone(), *at))
    }

    async fn on_turn_timeout(&mut self) {
        self.turn_deadline = None;
        if let Err(e) = self.room.force_fold_active("timed out") {
            self.fatal("turn timeout", e);
        }
        self.after_transition().await;
    }

    async fn on_reveal_elapsed(&mut self) {
        self.reveal_deadline = None;
        if let Err(e) = self.room.finish_reveal() {
            self.fatal("reveal cleanup", e);
        }
        self.after_transition().await;
    }

    async fn on_grace_expired(&mut self, player_id: String) {
        self.grace_deadlines.remove(&player_id);
        if self.room.seat_of(&player_id).is_none() {
            return;
        }
        tracing::info!(
            room = %self.room.room_id,
            player = %player_id,
            "grace period expired, removing player"
        );
        if let Err(e) = self.room.remove_player(&player_id) {
            self.fatal("grace expiry", e);
        }
        self.after_transition().await;
    }

    /// The internally driven transitions above cannot be refused by the
    /// machine; an error from them is an unreachable-state bug, and the
    /// actor crashes rather than carrying a corrupt context forward.
    fn fatal(&self, during: &str, e: crate::game::GameError) -> ! {
        panic!(
            "room {}: unreachable machine state during {}: {}",
            self.room.room_id, during, e
        );
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
