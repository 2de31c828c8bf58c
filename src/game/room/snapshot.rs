use super::*;

/// Per-recipient view of room state. The deck and the acted set are not
/// part of this type at all, so they can never leak; hole cards are
/// masked per viewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub room_id: String,
    pub phase: Phase,
    pub hand_no: u64,
    pub players: Vec<PlayerSnapshot>,
    pub community_cards: Vec<Card>,
    pub pot: u64,
    pub current_commitment: u64,
    pub round_bets: HashMap<String, u64>,
    pub active_player_index: usize,
    pub dealer_index: usize,
    pub small_blind: u64,
    pub big_blind: u64,
    pub history: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub id: String,
    pub name: String,
    pub tiles: u64,
    pub hole_cards: Vec<Card>,
    pub is_folded: bool,
    pub is_spectator: bool,
    pub position: usize,
}

impl GameRoom {
    /// Build the redacted view for one subscriber. Pure: the live context
    /// is never mutated to redact.
    ///
    /// A viewer always sees their own hole cards. Everyone else's stay
    /// empty until the reveal, when live hands become visible to all —
    /// including spectator sockets (`viewer == None`).
    pub fn snapshot_for(&self, viewer: Option<&str>) -> RoomSnapshot {
        let reveal = self.phase == Phase::Reveal;
        let players = self
            .players
            .iter()
            .map(|p| {
                let own = viewer == Some(p.id.as_str());
                let shown_at_reveal = reveal && p.is_contender();
                let hole_cards = if own || shown_at_reveal {
                    p.hole_cards.clone()
                } else {
                    Vec::new()
                };
                PlayerSnapshot {
                    id: p.id.clone(),
                    name: p.name.clone(),
                    tiles: p.tiles,
                    hole_cards,
                    is_folded: p.is_folded,
                    is_spectator: p.is_spectator,
                    position: p.position,
                }
            })
            .collect();

        RoomSnapshot {
            room_id: self.room_id.clone(),
            phase: self.phase,
            hand_no: self.hand_no,
            players,
            community_cards: self.community_cards.clone(),
            pot: self.pot,
            current_commitment: self.current_commitment,
            round_bets: self.round_bets.clone(),
            active_player_index: self.active_player_index,
            dealer_index: self.dealer_index,
            small_blind: self.small_blind,
            big_blind: self.big_blind,
            history: self.history.entries().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dealt_room() -> GameRoom {
        let mut room = GameRoom::new("r1".into(), 10, 20, 1000);
        for i in 0..3 {
            room.add_player(format!("p{}", i + 1), format!("Player {}", i + 1))
                .unwrap();
        }
        room.start("p1").unwrap();
        room
    }

    #[test]
    fn test_viewer_sees_only_own_cards() {
        let room = dealt_room();
        let snapshot = room.snapshot_for(Some("p2"));
        for player in &snapshot.players {
            if player.id == "p2" {
                assert_eq!(player.hole_cards.len(), 2);
            } else {
                assert!(player.hole_cards.is_empty());
            }
        }
    }

    #[test]
    fn test_spectator_sees_no_cards_before_reveal() {
        let room = dealt_room();
        let snapshot = room.snapshot_for(None);
        assert!(snapshot.players.iter().all(|p| p.hole_cards.is_empty()));
    }

    #[test]
    fn test_reveal_shows_live_hands_to_all() {
        let mut room = dealt_room();
        let folded = room.players[room.active_player_index].id.clone();
        room.apply_intent(&folded, Intent::Fold).unwrap();
        let caller = room.players[room.active_player_index].id.clone();
        room.apply_intent(&caller, Intent::Fold).unwrap();
        assert_eq!(room.phase, Phase::Reveal);

        let snapshot = room.snapshot_for(None);
        for player in &snapshot.players {
            if player.is_folded {
                assert!(player.hole_cards.is_empty());
            } else {
                assert_eq!(player.hole_cards.len(), 2);
            }
        }
    }

    #[test]
    fn test_serialized_snapshot_has_no_hidden_fields() {
        let room = dealt_room();
        let json = serde_json::to_value(room.snapshot_for(Some("p1"))).unwrap();
        let text = json.to_string();
        assert!(!text.contains("deck"));
        assert!(!text.contains("playersWhoActed"));
        assert!(json.get("roundBets").is_some());
        assert!(json.get("communityCards").is_some());
    }
}
