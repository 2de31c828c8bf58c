//! Key/value persistence for room contexts.
//!
//! Two operations, two backends: a process-local map for single-node
//! runs, Redis when a broker URL is configured. Writes are write-through
//! and best-effort; the in-memory actor state stays canonical, and reads
//! only happen on cold-start recovery of a non-resident room.

use redis::AsyncCommands;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub enum Store {
    Memory(Arc<Mutex<HashMap<String, Vec<u8>>>>),
    Redis(redis::aio::MultiplexedConnection),
}

impl Store {
    pub fn memory() -> Self {
        Store::Memory(Arc::new(Mutex::new(HashMap::new())))
    }

    pub async fn redis(url: &str) -> anyhow::Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        Ok(Store::Redis(conn))
    }

    pub async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        match self {
            Store::Memory(map) => Ok(map.lock().expect("store lock").get(key).cloned()),
            Store::Redis(conn) => {
                let mut conn = conn.clone();
                let value: Option<Vec<u8>> = conn.get(key).await?;
                Ok(value)
            }
        }
    }

    pub async fn set(&self, key: &str, value: Vec<u8>) -> anyhow::Result<()> {
        match self {
            Store::Memory(map) => {
                map.lock().expect("store lock").insert(key.to_string(), value);
                Ok(())
            }
            Store::Redis(conn) => {
                let mut conn = conn.clone();
                let _: () = conn.set(key, value).await?;
                Ok(())
            }
        }
    }
}

/// Store key for a room context.
pub fn room_key(room_id: &str) -> String {
    format!("room:{}", room_id)
}
