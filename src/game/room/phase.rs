use super::*;
use crate::game::constants::{FLOP_CARDS, MIN_PLAYERS_TO_START, RIVER_CARDS, TURN_CARDS};

impl GameRoom {
    /// Advance streets until someone has a decision to make. With every
    /// remaining player all-in, settled streets cascade straight through
    /// to the reveal.
    pub(crate) fn advance_street_cascade(&mut self) -> GameResult<()> {
        while self.phase.is_street() {
            self.advance_street()?;
            if !self.phase.is_street() {
                break;
            }
            if !self.betting_round_complete() {
                break;
            }
        }
        Ok(())
    }

    /// Deal the next street and reset per-street betting state. From the
    /// river this resolves the reveal instead.
    pub(crate) fn advance_street(&mut self) -> GameResult<()> {
        self.reset_round_state();

        match self.phase {
            Phase::PreFlop => {
                self.deck.burn();
                let cards = self.deck.deal_multiple(FLOP_CARDS);
                self.log_street("flop", &cards);
                self.community_cards.extend(cards);
                self.phase = self.phase.transition_to(Phase::Flop)?;
            }
            Phase::Flop => {
                self.deck.burn();
                let cards = self.deck.deal_multiple(TURN_CARDS);
                self.log_street("turn", &cards);
                self.community_cards.extend(cards);
                self.phase = self.phase.transition_to(Phase::Turn)?;
            }
            Phase::Turn => {
                self.deck.burn();
                let cards = self.deck.deal_multiple(RIVER_CARDS);
                self.log_street("river", &cards);
                self.community_cards.extend(cards);
                self.phase = self.phase.transition_to(Phase::River)?;
            }
            Phase::River => {
                return self.enter_reveal();
            }
            _ => return Ok(()),
        }

        // Post-flop action starts at the button's side of the table.
        if let Some(idx) = self.first_actionable_from(self.dealer_index) {
            self.active_player_index = idx;
        }
        Ok(())
    }

    /// Tear down the finished hand after the reveal delay: hole cards
    /// cleared, busted players become spectators, the button rotates, and
    /// either the next hand starts immediately (continuous play) or the
    /// room returns to the lobby.
    pub fn finish_reveal(&mut self) -> GameResult<()> {
        self.phase = self.phase.transition_to(Phase::Cleanup)?;

        for player in &mut self.players {
            player.reset_for_new_hand();
        }
        let busted: Vec<String> = self
            .players
            .iter_mut()
            .filter(|p| p.tiles == 0 && !p.is_spectator)
            .map(|p| {
                p.is_spectator = true;
                p.name.clone()
            })
            .collect();
        for name in busted {
            self.history
                .push(format!("{} is out of tiles and becomes a spectator", name));
        }

        self.community_cards.clear();
        self.reset_round_state();
        debug_assert_eq!(self.pot, 0, "pot must be awarded before cleanup");
        self.pot = 0;

        if let Some(next) = self.next_non_spectator(self.dealer_index) {
            self.dealer_index = next;
        }

        if self.dealable_count() >= MIN_PLAYERS_TO_START {
            self.begin_hand()
        } else {
            self.phase = self.phase.transition_to(Phase::Lobby)?;
            self.history.push("waiting for players");
            Ok(())
        }
    }

    fn log_street(&mut self, street: &str, cards: &[Card]) {
        let shown: Vec<String> = cards.iter().map(|c| c.to_string()).collect();
        self.history
            .push(format!("{}: {}", street, shown.join(" ")));
    }
}
