pub mod constants;
pub mod deck;
pub mod error;
pub mod hand;
pub mod player;
pub mod room;

// Re-export commonly used items
pub use deck::{Card, Deck};
pub use error::{GameError, GameResult};
pub use hand::{determine_winners, evaluate_hand, HandCategory, HandResult};
pub use player::Player;
pub use room::{GameRoom, HistoryLog, Intent, Phase, PlayerSnapshot, RoomSnapshot};
