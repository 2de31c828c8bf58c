use crate::game::room::{Intent, RoomSnapshot};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ClientMessage {
    #[serde(rename_all = "camelCase")]
    JoinRoom {
        room_id: String,
        nickname: String,
        /// Previously issued id; supplying it reattaches the session.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player_id: Option<String>,
    },
    StartGame,
    SendIntent(WireIntent),
}

/// Intent record as it appears on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireIntent {
    #[serde(rename = "type")]
    pub kind: WireIntentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WireIntentKind {
    Commit,
    Fold,
    Check,
    /// Legacy client alias for FOLD.
    Pass,
}

impl WireIntent {
    pub fn to_intent(&self) -> Intent {
        match self.kind {
            WireIntentKind::Commit => Intent::Commit {
                amount: self.amount.unwrap_or(0),
            },
            WireIntentKind::Check => Intent::Check,
            WireIntentKind::Fold | WireIntentKind::Pass => Intent::Fold,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerMessage {
    Connected,
    #[serde(rename_all = "camelCase")]
    JoinedRoom { room_id: String, player_id: String },
    #[serde(rename = "gameState")]
    GameState(RoomSnapshot),
    Error { message: String },
}
