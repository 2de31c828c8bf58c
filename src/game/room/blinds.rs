use super::*;

impl GameRoom {
    /// Post forced bets for the new hand.
    ///
    /// The button posts the small blind, the next eligible seat posts the
    /// big blind, and first action goes to the seat after the big blind.
    /// A short stack posts what it has. Blinds are not voluntary actions,
    /// so the acted set stays empty and the big blind keeps its option.
    ///
    /// Returns the seat first to act, or `None` when nobody can
    /// (both blinds all-in with no one else in the hand).
    pub(crate) fn post_blinds(&mut self) -> GameResult<Option<usize>> {
        let sb_idx = self
            .first_dealable_from(self.dealer_index)
            .ok_or(GameError::NotEnoughPlayers { have: 0 })?;
        let bb_idx = self
            .next_dealable(sb_idx)
            .ok_or(GameError::NotEnoughPlayers { have: 1 })?;

        let sb_amount = self.post_forced_bet(sb_idx, self.small_blind, "small blind");
        let bb_amount = self.post_forced_bet(bb_idx, self.big_blind, "big blind");
        self.current_commitment = sb_amount.max(bb_amount);

        tracing::debug!(
            room = %self.room_id,
            dealer = self.dealer_index,
            sb = sb_idx,
            bb = bb_idx,
            "blinds posted"
        );

        Ok(self.next_player(bb_idx))
    }

    fn post_forced_bet(&mut self, idx: usize, amount: u64, label: &str) -> u64 {
        let actual = self.players[idx].deduct(amount);
        let id = self.players[idx].id.clone();
        let name = self.players[idx].name.clone();
        *self.round_bets.entry(id).or_insert(0) += actual;
        self.pot += actual;
        self.history
            .push(format!("{} posts {} {}", name, label, actual));
        actual
    }
}
