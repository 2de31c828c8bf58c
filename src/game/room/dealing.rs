use super::*;
use crate::game::constants::{HOLE_CARDS, MIN_PLAYERS_TO_START};

impl GameRoom {
    /// Start the first hand from the lobby. Any seated player may start
    /// once at least two non-spectators are present.
    pub fn start(&mut self, player_id: &str) -> GameResult<()> {
        if self.seat_of(player_id).is_none() {
            return Err(GameError::NotSeated);
        }
        if self.phase != Phase::Lobby {
            return Err(GameError::WrongPhase {
                expected: format!("{:?}", Phase::Lobby),
                actual: format!("{:?}", self.phase),
            });
        }
        let have = self.dealable_count();
        if have < MIN_PLAYERS_TO_START {
            return Err(GameError::NotEnoughPlayers { have });
        }
        self.begin_hand()
    }

    /// Deal a new hand: fresh shuffled deck, two hole cards per eligible
    /// player, blinds, first-to-act. Entered from the lobby or straight
    /// from cleanup in continuous play.
    pub(crate) fn begin_hand(&mut self) -> GameResult<()> {
        self.phase = self.phase.transition_to(Phase::Dealing)?;
        self.hand_no += 1;
        self.history.push(format!("hand {} begins", self.hand_no));

        for player in &mut self.players {
            player.reset_for_new_hand();
        }
        self.community_cards.clear();
        self.pot = 0;
        self.reset_round_state();

        self.deck = match self.next_deck.take() {
            Some(deck) => deck,
            None => match self.shuffle_seed {
                Some(seed) => Deck::shuffled_from_seed(seed.wrapping_add(self.hand_no)),
                None => Deck::shuffled(),
            },
        };

        self.deal_hole_cards();
        let first_to_act = self.post_blinds()?;
        self.phase = self.phase.transition_to(Phase::PreFlop)?;

        match first_to_act {
            Some(idx) => {
                self.active_player_index = idx;
                Ok(())
            }
            // Both blinds went all-in with nobody behind them.
            None => self.enter_reveal(),
        }
    }

    /// One card at a time, twice around the table, starting at the small
    /// blind seat.
    fn deal_hole_cards(&mut self) {
        let n = self.players.len();
        let Some(start) = self.first_dealable_from(self.dealer_index) else {
            return;
        };
        for _ in 0..HOLE_CARDS {
            let mut idx = start;
            for _ in 0..n {
                if self.players[idx].can_be_dealt() {
                    if let Some(card) = self.deck.deal() {
                        self.players[idx].hole_cards.push(card);
                    }
                }
                idx = (idx + 1) % n;
            }
        }
    }
}
