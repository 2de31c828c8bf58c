use super::*;

/// A validated player intent, as the machine sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    /// Move `amount` chips into the pot. A commit that pushes the player's
    /// street total above the current commitment is a raise.
    Commit { amount: u64 },
    Check,
    Fold,
}

impl GameRoom {
    /// Apply one intent from `player_id`. Illegal intents leave the
    /// context untouched and surface a typed error for the gateway.
    pub fn apply_intent(&mut self, player_id: &str, intent: Intent) -> GameResult<()> {
        if !self.phase.is_street() {
            return Err(GameError::WrongPhase {
                expected: "a betting street".to_string(),
                actual: format!("{:?}", self.phase),
            });
        }
        let idx = self
            .seat_of(player_id)
            .ok_or_else(|| GameError::PlayerNotFound {
                player_id: player_id.to_string(),
            })?;
        if idx != self.active_player_index {
            return Err(GameError::NotYourTurn);
        }
        if !self.players[idx].can_act() {
            return Err(GameError::CannotAct);
        }

        let name = self.players[idx].name.clone();
        match intent {
            Intent::Check => {
                let bet = self.round_bet(player_id);
                if bet != self.current_commitment {
                    return Err(GameError::CannotCheck {
                        required: self.current_commitment - bet,
                    });
                }
                self.players_who_acted.insert(player_id.to_string());
                self.history.push(format!("{} checks", name));
            }
            Intent::Commit { amount } => {
                let tiles = self.players[idx].tiles;
                if amount > tiles {
                    return Err(GameError::CommitTooLarge {
                        tiles,
                        attempted: amount,
                    });
                }
                self.players[idx].deduct(amount);
                self.pot += amount;
                let entry = self.round_bets.entry(player_id.to_string()).or_insert(0);
                *entry += amount;
                let new_total = *entry;

                if new_total > self.current_commitment {
                    // Aggression reopens the street: everyone who already
                    // matched must act again.
                    self.current_commitment = new_total;
                    self.players_who_acted.clear();
                    self.players_who_acted.insert(player_id.to_string());
                    self.history
                        .push(format!("{} raises to {}", name, new_total));
                } else {
                    self.players_who_acted.insert(player_id.to_string());
                    self.history.push(format!("{} commits {}", name, amount));
                }
            }
            Intent::Fold => {
                self.players[idx].fold();
                self.players_who_acted.insert(player_id.to_string());
                self.history.push(format!("{} folds", name));
            }
        }

        self.advance_after_action(idx)
    }

    /// Auto-fold the active player when the turn timer fires. Stale timer
    /// expiries (phase moved on, player already out) are ignored.
    pub fn force_fold_active(&mut self, reason: &str) -> GameResult<()> {
        if !self.phase.is_street() {
            return Ok(());
        }
        let idx = self.active_player_index;
        let Some(player) = self.players.get_mut(idx) else {
            return Ok(());
        };
        if !player.can_act() {
            return Ok(());
        }
        let name = player.name.clone();
        let id = player.id.clone();
        player.fold();
        self.players_who_acted.insert(id);
        self.history.push(format!("{} folds ({})", name, reason));
        self.advance_after_action(idx)
    }

    /// The street is settled when every player still in the round has
    /// matched the commitment (or is all-in) and has acted since the last
    /// aggression. Posted blinds do not count as acting, which is what
    /// gives the big blind its pre-flop option.
    pub(crate) fn betting_round_complete(&self) -> bool {
        self.players
            .iter()
            .filter(|p| p.is_contender() && (p.tiles > 0 || self.round_bet(&p.id) > 0))
            .all(|p| {
                let settled = self.round_bet(&p.id) == self.current_commitment || p.tiles == 0;
                settled && self.players_who_acted.contains(&p.id)
            })
    }

    /// Move the hand forward after a (voluntary or forced) action at seat
    /// `acted_idx`: uncontested pots end the hand, settled streets advance,
    /// otherwise the turn rotates.
    pub(crate) fn advance_after_action(&mut self, acted_idx: usize) -> GameResult<()> {
        if self.contender_count() <= 1 {
            return self.enter_reveal();
        }
        if self.betting_round_complete() {
            return self.advance_street_cascade();
        }
        match self.next_player(acted_idx) {
            Some(next) => {
                self.active_player_index = next;
                Ok(())
            }
            // Nobody left who can act: all remaining chips are in.
            None => self.enter_reveal(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started_room(count: usize) -> GameRoom {
        let mut room = GameRoom::new("r1".into(), 10, 20, 1000);
        room.shuffle_seed = Some(42);
        for i in 0..count {
            room.add_player(format!("p{}", i + 1), format!("Player {}", i + 1))
                .unwrap();
        }
        room.start("p1").unwrap();
        room
    }

    #[test]
    fn test_blind_seats_and_first_to_act() {
        let room = started_room(3);
        // Button posts the small blind; first action is after the big blind.
        assert_eq!(room.dealer_index, 0);
        assert_eq!(room.round_bet("p1"), 10);
        assert_eq!(room.round_bet("p2"), 20);
        assert_eq!(room.current_commitment, 20);
        assert_eq!(room.active_player_index, 2);
        assert!(room.players_who_acted.is_empty());
    }

    #[test]
    fn test_intent_out_of_turn_is_refused() {
        let mut room = started_room(3);
        let before = room.clone();
        let err = room.apply_intent("p1", Intent::Check).unwrap_err();
        assert_eq!(err, GameError::NotYourTurn);
        // No context change on refusal.
        assert_eq!(room.pot, before.pot);
        assert_eq!(room.active_player_index, before.active_player_index);
        assert_eq!(room.history.len(), before.history.len());
    }

    #[test]
    fn test_check_facing_bet_is_refused() {
        let mut room = started_room(3);
        let err = room.apply_intent("p3", Intent::Check).unwrap_err();
        assert_eq!(err, GameError::CannotCheck { required: 20 });
    }

    #[test]
    fn test_commit_beyond_stack_is_refused() {
        let mut room = started_room(3);
        let err = room
            .apply_intent("p3", Intent::Commit { amount: 5000 })
            .unwrap_err();
        assert_eq!(
            err,
            GameError::CommitTooLarge {
                tiles: 1000,
                attempted: 5000
            }
        );
    }

    #[test]
    fn test_big_blind_keeps_option() {
        let mut room = started_room(3);
        room.apply_intent("p3", Intent::Commit { amount: 20 }).unwrap();
        room.apply_intent("p1", Intent::Commit { amount: 10 }).unwrap();
        // Everyone matched, but the big blind has not acted yet.
        assert_eq!(room.phase, Phase::PreFlop);
        assert_eq!(room.active_player_index, 1);
        room.apply_intent("p2", Intent::Check).unwrap();
        assert_eq!(room.phase, Phase::Flop);
    }

    #[test]
    fn test_raise_resets_acted_set() {
        let mut room = started_room(3);
        room.apply_intent("p3", Intent::Commit { amount: 20 }).unwrap();
        room.apply_intent("p1", Intent::Commit { amount: 10 }).unwrap();
        room.apply_intent("p2", Intent::Commit { amount: 40 }).unwrap();

        assert_eq!(room.current_commitment, 60);
        assert_eq!(room.players_who_acted.len(), 1);
        assert!(room.players_who_acted.contains("p2"));
        // Matched players must act again before the street can close.
        assert_eq!(room.phase, Phase::PreFlop);
        assert_eq!(room.active_player_index, 2);

        room.apply_intent("p3", Intent::Commit { amount: 40 }).unwrap();
        room.apply_intent("p1", Intent::Commit { amount: 40 }).unwrap();
        assert_eq!(room.phase, Phase::Flop);
    }

    #[test]
    fn test_fold_to_one_ends_hand_without_board() {
        let mut room = started_room(3);
        room.apply_intent("p3", Intent::Fold).unwrap();
        room.apply_intent("p1", Intent::Fold).unwrap();

        assert_eq!(room.phase, Phase::Reveal);
        assert!(room.community_cards.is_empty());
        assert_eq!(room.pot, 0);
        // Big blind collects the blinds uncontested.
        assert_eq!(room.player("p2").unwrap().tiles, 1010);
        assert!(room.history.mentions("uncontested"));
    }

    #[test]
    fn test_forced_fold_records_reason_and_advances() {
        let mut room = started_room(3);
        room.force_fold_active("timed out").unwrap();
        assert!(room.players[2].is_folded);
        assert!(room.history.mentions("timed out"));
        assert_eq!(room.active_player_index, 0);
    }

    #[test]
    fn test_all_in_players_cascade_to_reveal() {
        let mut room = started_room(2);
        // Heads-up: p1 is button/small blind and acts first.
        room.apply_intent("p1", Intent::Commit { amount: 990 }).unwrap();
        room.apply_intent("p2", Intent::Commit { amount: 980 }).unwrap();

        assert_eq!(room.phase, Phase::Reveal);
        assert_eq!(room.pot, 0);
        let total: u64 = room.players.iter().map(|p| p.tiles).sum();
        assert_eq!(total, 2000);
    }

    #[test]
    fn test_chip_conservation_through_hand() {
        let mut room = started_room(3);
        let sum = |room: &GameRoom| -> u64 {
            room.players.iter().map(|p| p.tiles).sum::<u64>() + room.pot
        };
        assert_eq!(sum(&room), 3000);
        room.apply_intent("p3", Intent::Commit { amount: 20 }).unwrap();
        assert_eq!(sum(&room), 3000);
        room.apply_intent("p1", Intent::Commit { amount: 30 }).unwrap();
        assert_eq!(sum(&room), 3000);
        room.apply_intent("p2", Intent::Fold).unwrap();
        room.apply_intent("p3", Intent::Commit { amount: 20 }).unwrap();
        assert_eq!(sum(&room), 3000);
        while room.phase.is_street() {
            let id = room.active_player_id().unwrap().to_string();
            room.apply_intent(&id, Intent::Check).unwrap();
            assert_eq!(sum(&room), 3000);
        }
        assert_eq!(room.phase, Phase::Reveal);
        assert_eq!(sum(&room), 3000);
    }
}
