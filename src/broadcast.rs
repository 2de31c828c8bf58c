//! Room fan-out fabric.
//!
//! Single-node mode delivers straight from the actor to its local
//! subscribers. With a broker configured, every snapshot is also
//! published as a room-scoped record; each node consuming the topic
//! fans it out to its own subscribers, so sockets on any node observe
//! the same snapshot sequence in actor order. Records carry the origin
//! node id — the publisher already delivered locally and skips its own.

use crate::actor::RoomRegistry;
use crate::game::room::GameRoom;
use futures::StreamExt;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Pub/sub channel shared by all nodes.
pub const BROADCAST_CHANNEL: &str = "tileroom:broadcast";

#[derive(Serialize)]
struct RecordOut<'a> {
    node_id: &'a str,
    room: &'a GameRoom,
}

#[derive(Deserialize)]
struct Record {
    node_id: String,
    room: GameRoom,
}

#[derive(Clone)]
pub enum Fabric {
    /// Single-node: no cross-process publishing.
    Local,
    Broker {
        conn: redis::aio::MultiplexedConnection,
        node_id: String,
    },
}

impl Fabric {
    pub fn local() -> Self {
        Fabric::Local
    }

    pub async fn broker(url: &str, node_id: String) -> anyhow::Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        Ok(Fabric::Broker { conn, node_id })
    }

    pub fn node_id(&self) -> Option<&str> {
        match self {
            Fabric::Local => None,
            Fabric::Broker { node_id, .. } => Some(node_id),
        }
    }

    /// Publish the full room context so remote nodes can redact per
    /// subscriber. No-op in single-node mode.
    pub async fn publish(&self, room: &GameRoom) -> anyhow::Result<()> {
        match self {
            Fabric::Local => Ok(()),
            Fabric::Broker { conn, node_id } => {
                let payload = serde_json::to_string(&RecordOut { node_id, room })?;
                let mut conn = conn.clone();
                let _: () = conn.publish(BROADCAST_CHANNEL, payload).await?;
                Ok(())
            }
        }
    }
}

/// Long-running consumer of the broadcast topic. Records from this node
/// are skipped (already delivered locally); everything else goes to the
/// resident actor for that room. A dropped broker connection degrades to
/// local-only broadcast and keeps retrying.
pub async fn run_consumer(url: String, node_id: String, registry: Arc<RoomRegistry>) {
    loop {
        if let Err(e) = consume(&url, &node_id, &registry).await {
            tracing::warn!("broker consumer disconnected, retrying in 5s: {}", e);
        }
        tokio::time::sleep(Duration::from_secs(5)).await;
    }
}

async fn consume(url: &str, node_id: &str, registry: &RoomRegistry) -> anyhow::Result<()> {
    let client = redis::Client::open(url)?;
    let mut pubsub = client.get_async_pubsub().await?;
    pubsub.subscribe(BROADCAST_CHANNEL).await?;
    tracing::info!("broker consumer subscribed to {}", BROADCAST_CHANNEL);

    let mut stream = pubsub.on_message();
    while let Some(msg) = stream.next().await {
        let payload: String = match msg.get_payload() {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("unreadable broadcast payload: {}", e);
                continue;
            }
        };
        match serde_json::from_str::<Record>(&payload) {
            Ok(record) if record.node_id == node_id => {}
            Ok(record) => registry.deliver_remote(record.room).await,
            Err(e) => tracing::warn!("malformed broadcast record: {}", e),
        }
    }
    Err(anyhow::anyhow!("broadcast stream ended"))
}
