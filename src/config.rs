use crate::game::constants::{
    DEFAULT_BIG_BLIND, DEFAULT_DISCONNECT_GRACE_MS, DEFAULT_REVEAL_DELAY_MS, DEFAULT_ROOM_IDLE_MS,
    DEFAULT_SMALL_BLIND, DEFAULT_STARTING_TILES, DEFAULT_TURN_TIMEOUT_MS,
};
use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    pub listen_host: String,
    pub listen_port: u16,
    /// Redis URL. When set and reachable, backs both the room store and
    /// the cross-node broadcast fabric; otherwise the server runs
    /// single-node with an in-memory store.
    pub broker_url: Option<String>,
    pub small_blind: u64,
    pub big_blind: u64,
    pub starting_tiles: u64,
    pub turn_timeout_ms: u64,
    pub reveal_delay_ms: u64,
    pub disconnect_grace_ms: u64,
    pub room_idle_ms: u64,
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            listen_host: env::var("LISTEN_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            listen_port: env::var("LISTEN_PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .expect("LISTEN_PORT must be a number"),
            broker_url: env::var("BROKER_URL").ok().filter(|v| !v.is_empty()),
            small_blind: env_u64("SMALL_BLIND", DEFAULT_SMALL_BLIND),
            big_blind: env_u64("BIG_BLIND", DEFAULT_BIG_BLIND),
            starting_tiles: env_u64("STARTING_TILES", DEFAULT_STARTING_TILES),
            turn_timeout_ms: env_u64("TURN_TIMEOUT_MS", DEFAULT_TURN_TIMEOUT_MS),
            reveal_delay_ms: env_u64("REVEAL_DELAY_MS", DEFAULT_REVEAL_DELAY_MS),
            disconnect_grace_ms: env_u64("DISCONNECT_GRACE_MS", DEFAULT_DISCONNECT_GRACE_MS),
            room_idle_ms: env_u64("ROOM_IDLE_MS", DEFAULT_ROOM_IDLE_MS),
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.listen_host, self.listen_port)
    }

    pub fn turn_timeout(&self) -> Duration {
        Duration::from_millis(self.turn_timeout_ms)
    }

    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }

    pub fn disconnect_grace(&self) -> Duration {
        Duration::from_millis(self.disconnect_grace_ms)
    }

    pub fn room_idle(&self) -> Duration {
        Duration::from_millis(self.room_idle_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_host: "127.0.0.1".to_string(),
            listen_port: 3001,
            broker_url: None,
            small_blind: DEFAULT_SMALL_BLIND,
            big_blind: DEFAULT_BIG_BLIND,
            starting_tiles: DEFAULT_STARTING_TILES,
            turn_timeout_ms: DEFAULT_TURN_TIMEOUT_MS,
            reveal_delay_ms: DEFAULT_REVEAL_DELAY_MS,
            disconnect_grace_ms: DEFAULT_DISCONNECT_GRACE_MS,
            room_idle_ms: DEFAULT_ROOM_IDLE_MS,
        }
    }
}
