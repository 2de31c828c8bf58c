use super::{RoomActor, RoomEvent, RoomHandle};
use crate::broadcast::Fabric;
use crate::config::Config;
use crate::game::room::GameRoom;
use crate::store::{room_key, Store};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Looks up (or lazily creates) the actor for a room id. Rooms whose
/// actors have retired are respawned on the next lookup, rehydrating
/// from the store when a persisted context exists.
pub struct RoomRegistry {
    rooms: RwLock<HashMap<String, RoomHandle>>,
    store: Store,
    fabric: Fabric,
    config: Arc<Config>,
    next_conn_id: AtomicU64,
}

impl RoomRegistry {
    pub fn new(store: Store, fabric: Fabric, config: Arc<Config>) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            store,
            fabric,
            config,
            next_conn_id: AtomicU64::new(1),
        }
    }

    /// Allocate a process-unique id for a subscriber connection.
    pub fn next_conn_id(&self) -> u64 {
        self.next_conn_id.fetch_add(1, Ordering::Relaxed)
    }

    pub async fn get(&self, room_id: &str) -> Option<RoomHandle> {
        let rooms = self.rooms.read().await;
        rooms.get(room_id).filter(|h| !h.is_closed()).cloned()
    }

    pub async fn get_or_create(&self, room_id: &str) -> RoomHandle {
        if let Some(handle) = self.get(room_id).await {
            return handle;
        }

        let mut rooms = self.rooms.write().await;
        if let Some(handle) = rooms.get(room_id).filter(|h| !h.is_closed()) {
            return handle.clone();
        }

        let room = self.load_or_new(room_id).await;
        let handle = RoomActor::spawn(
            room,
            self.store.clone(),
            self.fabric.clone(),
            self.config.clone(),
        );
        rooms.insert(room_id.to_string(), handle.clone());
        handle
    }

    /// Cold-start recovery: a readable persisted context rehydrates the
    /// room; anything unreadable is treated as absent.
    async fn load_or_new(&self, room_id: &str) -> GameRoom {
        match self.store.get(&room_key(room_id)).await {
            Ok(Some(bytes)) => match serde_json::from_slice::<GameRoom>(&bytes) {
                Ok(room) => {
                    tracing::info!(room = %room_id, "rehydrated room from store");
                    room
                }
                Err(e) => {
                    tracing::warn!(
                        room = %room_id,
                        "corrupt persisted state, starting fresh: {}",
                        e
                    );
                    self.fresh_room(room_id)
                }
            },
            Ok(None) => self.fresh_room(room_id),
            Err(e) => {
                tracing::warn!(room = %room_id, "store read failed, starting fresh: {}", e);
                self.fresh_room(room_id)
            }
        }
    }

    fn fresh_room(&self, room_id: &str) -> GameRoom {
        GameRoom::new(
            room_id.to_string(),
            self.config.small_blind,
            self.config.big_blind,
            self.config.starting_tiles,
        )
    }

    /// Hand a broadcast record from another node to the local actor for
    /// that room, if one is resident.
    pub async fn deliver_remote(&self, room: GameRoom) {
        if let Some(handle) = self.get(&room.room_id).await {
            let _ = handle.send(RoomEvent::RemoteSnapshot(Box::new(room))).await;
        }
    }
}
