use super::*;
use crate::game::hand::{determine_winners, evaluate_hand, HandResult};

impl GameRoom {
    /// Enter the reveal and award the pot. A lone contender wins without
    /// evaluation; otherwise every live hand is scored against the board
    /// and equal keys split the pot, odd chips going to the first winner
    /// in seat order after the dealer.
    pub(crate) fn enter_reveal(&mut self) -> GameResult<()> {
        self.phase = self.phase.transition_to(Phase::Reveal)?;
        self.reset_round_state();

        let contenders: Vec<usize> = self
            .players
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_contender())
            .map(|(idx, _)| idx)
            .collect();

        match contenders.len() {
            0 => {
                // Every seat emptied mid-hand; nothing left to award.
                if self.pot > 0 {
                    tracing::warn!(room = %self.room_id, pot = self.pot, "pot abandoned");
                    self.history.push(format!("{} tiles left unclaimed", self.pot));
                    self.pot = 0;
                }
            }
            1 => {
                let idx = contenders[0];
                let amount = self.pot;
                self.players[idx].tiles += amount;
                self.pot = 0;
                self.history
                    .push(format!("{} wins {} uncontested", self.players[idx].name, amount));
            }
            _ => {
                let hands: Vec<(usize, HandResult)> = contenders
                    .iter()
                    .map(|&idx| {
                        (
                            idx,
                            evaluate_hand(&self.players[idx].hole_cards, &self.community_cards),
                        )
                    })
                    .collect();
                let winners = determine_winners(&hands);
                self.award_pot(&winners, &hands);
            }
        }
        Ok(())
    }

    fn award_pot(&mut self, winners: &[usize], hands: &[(usize, HandResult)]) {
        let share = self.pot / winners.len() as u64;
        let mut remainder = self.pot % winners.len() as u64;
        self.pot = 0;

        let n = self.players.len();
        // Seat order after the dealer decides who takes the odd chips.
        let ordered: Vec<usize> = (1..=n)
            .map(|k| (self.dealer_index + k) % n)
            .filter(|idx| winners.contains(idx))
            .collect();

        for idx in ordered {
            let mut amount = share;
            if remainder > 0 {
                amount += remainder;
                remainder = 0;
            }
            self.players[idx].tiles += amount;
            let label = hands
                .iter()
                .find(|(i, _)| *i == idx)
                .map(|(_, h)| h.category.label())
                .unwrap_or("unknown");
            self.history.push(format!(
                "{} wins {} with {}",
                self.players[idx].name, amount, label
            ));
        }
    }
}
