//! Game-related constants and default configuration values
//!
//! Centralizing these values makes it easier to:
//! - Adjust for testing
//! - Support future per-room customization

/// Maximum number of seats in a room
pub const MAX_SEATS: usize = 9;

/// Minimum non-spectator players required to start a hand
pub const MIN_PLAYERS_TO_START: usize = 2;

/// Default forced bets and starting stack
pub const DEFAULT_SMALL_BLIND: u64 = 10;
pub const DEFAULT_BIG_BLIND: u64 = 20;
pub const DEFAULT_STARTING_TILES: u64 = 1000;

/// Timing defaults (in milliseconds)
pub const DEFAULT_TURN_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_REVEAL_DELAY_MS: u64 = 5_000;
pub const DEFAULT_DISCONNECT_GRACE_MS: u64 = 60_000;
/// An empty room in the lobby lingers this long before its actor retires.
pub const DEFAULT_ROOM_IDLE_MS: u64 = 300_000;

/// Event queue capacity per room actor
pub const ROOM_QUEUE_CAPACITY: usize = 100;

/// Per-subscriber snapshot channel capacity
pub const SUBSCRIBER_CHANNEL_CAPACITY: usize = 32;

/// Community cards per street
pub const FLOP_CARDS: usize = 3;
pub const TURN_CARDS: usize = 1;
pub const RIVER_CARDS: usize = 1;

/// Hole cards dealt to each player
pub const HOLE_CARDS: usize = 2;
