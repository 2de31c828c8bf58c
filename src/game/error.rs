//! Game-related error types
//!
//! Typed errors instead of strings give the gateway something it can
//! match on when turning a refused intent into a per-socket diagnostic.

use std::fmt;

/// Errors that can occur during game operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    // Room errors
    RoomFull,
    NotSeated,
    PlayerNotFound { player_id: String },

    // Intent errors
    NotYourTurn,
    CannotAct,
    CannotCheck { required: u64 },
    CommitTooLarge { tiles: u64, attempted: u64 },

    // Machine state errors
    WrongPhase { expected: String, actual: String },
    InvalidPhaseTransition { from: String, to: String },
    NotEnoughPlayers { have: usize },
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::RoomFull => write!(f, "Room is full"),
            GameError::NotSeated => write!(f, "You are not seated in this room"),
            GameError::PlayerNotFound { player_id } => {
                write!(f, "Player not found: {}", player_id)
            }

            GameError::NotYourTurn => write!(f, "Not your turn"),
            GameError::CannotAct => write!(f, "You cannot act"),
            GameError::CannotCheck { required } => {
                write!(f, "Cannot check, must commit {} to stay in", required)
            }
            GameError::CommitTooLarge { tiles, attempted } => {
                write!(
                    f,
                    "Cannot commit {}, only {} tiles available",
                    attempted, tiles
                )
            }

            GameError::WrongPhase { expected, actual } => {
                write!(f, "Wrong phase. Expected: {}, Actual: {}", expected, actual)
            }
            GameError::InvalidPhaseTransition { from, to } => {
                write!(f, "Invalid phase transition: {} -> {}", from, to)
            }
            GameError::NotEnoughPlayers { have } => {
                write!(f, "Need at least 2 players to start, have {}", have)
            }
        }
    }
}

impl std::error::Error for GameError {}

/// Result type for game operations
pub type GameResult<T> = Result<T, GameError>;
