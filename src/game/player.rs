use crate::game::deck::Card;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Opaque stable id, issued at first join and echoed back on rejoin.
    pub id: String,
    pub name: String,
    /// Chip balance. A player at zero after a hand becomes a spectator.
    pub tiles: u64,
    pub hole_cards: Vec<Card>,
    pub is_folded: bool,
    pub is_spectator: bool,
    /// Seat index assigned at join, never renumbered when others leave.
    pub position: usize,
}

impl Player {
    pub fn new(id: String, name: String, tiles: u64, position: usize) -> Self {
        Self {
            id,
            name,
            tiles,
            hole_cards: Vec::new(),
            is_folded: false,
            is_spectator: false,
            position,
        }
    }

    /// Moves up to `amount` tiles out of the stack, returning what moved.
    pub fn deduct(&mut self, amount: u64) -> u64 {
        let actual = amount.min(self.tiles);
        self.tiles -= actual;
        actual
    }

    pub fn fold(&mut self) {
        self.is_folded = true;
    }

    pub fn reset_for_new_hand(&mut self) {
        self.hole_cards.clear();
        self.is_folded = false;
    }

    /// Eligible to receive hole cards at the next deal.
    pub fn can_be_dealt(&self) -> bool {
        !self.is_spectator && self.tiles > 0
    }

    /// Still contesting the current hand.
    pub fn is_contender(&self) -> bool {
        !self.is_spectator && !self.is_folded && !self.hole_cards.is_empty()
    }

    /// Contending and able to make a voluntary action.
    pub fn can_act(&self) -> bool {
        self.is_contender() && self.tiles > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deduct_caps_at_stack() {
        let mut player = Player::new("p1".into(), "Alice".into(), 30, 0);
        assert_eq!(player.deduct(50), 30);
        assert_eq!(player.tiles, 0);
    }

    #[test]
    fn test_contender_requires_hole_cards() {
        let mut player = Player::new("p1".into(), "Alice".into(), 100, 0);
        assert!(!player.is_contender());
        player.hole_cards = vec![Card::new(14, 0), Card::new(2, 1)];
        assert!(player.is_contender());
        player.fold();
        assert!(!player.is_contender());
    }
}
