mod actions;
mod blinds;
mod dealing;
mod history;
mod phase;
mod showdown;
mod snapshot;

pub use actions::Intent;
pub use history::HistoryLog;
pub use snapshot::{PlayerSnapshot, RoomSnapshot};

use crate::game::constants::MAX_SEATS;
use crate::game::deck::{Card, Deck};
use crate::game::error::{GameError, GameResult};
use crate::game::player::Player;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Lobby,
    Dealing,
    PreFlop,
    Flop,
    Turn,
    River,
    Reveal,
    Cleanup,
}

impl Phase {
    /// Returns the set of phases this phase can transition to.
    pub fn valid_transitions(&self) -> &[Phase] {
        match self {
            Phase::Lobby => &[Phase::Dealing],
            Phase::Dealing => &[Phase::PreFlop],
            Phase::PreFlop => &[Phase::Flop, Phase::Reveal],
            Phase::Flop => &[Phase::Turn, Phase::Reveal],
            Phase::Turn => &[Phase::River, Phase::Reveal],
            Phase::River => &[Phase::Reveal],
            Phase::Reveal => &[Phase::Cleanup],
            Phase::Cleanup => &[Phase::Lobby, Phase::Dealing],
        }
    }

    /// Attempt to transition to a target phase. An invalid transition is a
    /// machine bug, not a user error, so callers propagate it upward.
    pub fn transition_to(&self, target: Phase) -> GameResult<Phase> {
        if self.valid_transitions().contains(&target) {
            Ok(target)
        } else {
            tracing::error!(
                "Invalid phase transition: {:?} -> {:?} (valid: {:?})",
                self,
                target,
                self.valid_transitions()
            );
            Err(GameError::InvalidPhaseTransition {
                from: format!("{:?}", self),
                to: format!("{:?}", target),
            })
        }
    }

    /// True for the four betting streets.
    pub fn is_street(&self) -> bool {
        matches!(
            self,
            Phase::PreFlop | Phase::Flop | Phase::Turn | Phase::River
        )
    }
}

/// Full per-room game context. This is the authoritative state the actor
/// persists; clients only ever see the redacted [`RoomSnapshot`] built
/// from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRoom {
    pub room_id: String,
    /// Seating order; rotation order for turns, blinds and the button.
    pub players: Vec<Player>,
    pub deck: Deck,
    pub community_cards: Vec<Card>,
    pub pot: u64,
    /// Highest per-player contribution required to stay in this street.
    pub current_commitment: u64,
    /// Chips contributed per player this street.
    pub round_bets: HashMap<String, u64>,
    /// Players who have voluntarily acted since the last aggression.
    pub players_who_acted: HashSet<String>,
    pub active_player_index: usize,
    pub dealer_index: usize,
    pub phase: Phase,
    pub history: HistoryLog,
    pub hand_no: u64,
    pub small_blind: u64,
    pub big_blind: u64,
    pub starting_tiles: u64,
    /// Test-only deck override, consumed at the next deal.
    #[serde(skip)]
    pub next_deck: Option<Deck>,
    /// Deterministic shuffle hook for reproducible deals.
    #[serde(skip)]
    pub shuffle_seed: Option<u64>,
}

impl GameRoom {
    pub fn new(room_id: String, small_blind: u64, big_blind: u64, starting_tiles: u64) -> Self {
        Self {
            room_id,
            players: Vec::new(),
            deck: Deck::new(),
            community_cards: Vec::new(),
            pot: 0,
            current_commitment: 0,
            round_bets: HashMap::new(),
            players_who_acted: HashSet::new(),
            active_player_index: 0,
            dealer_index: 0,
            phase: Phase::Lobby,
            history: HistoryLog::default(),
            hand_no: 0,
            small_blind,
            big_blind,
            starting_tiles,
            next_deck: None,
            shuffle_seed: None,
        }
    }

    /// Seat a new player. Joining mid-hand is allowed; the player sits out
    /// until the next deal.
    pub fn add_player(&mut self, id: String, name: String) -> GameResult<()> {
        if self.players.len() >= MAX_SEATS {
            return Err(GameError::RoomFull);
        }
        let position = self
            .players
            .iter()
            .map(|p| p.position + 1)
            .max()
            .unwrap_or(0);
        self.history.push(format!("{} joins", name));
        self.players
            .push(Player::new(id, name, self.starting_tiles, position));
        Ok(())
    }

    /// Remove a player entirely. Chips already committed this hand are
    /// forfeited to the pot; the betting flow is settled as if the player
    /// folded before the seat disappears.
    pub fn remove_player(&mut self, player_id: &str) -> GameResult<()> {
        let idx = self
            .seat_of(player_id)
            .ok_or_else(|| GameError::PlayerNotFound {
                player_id: player_id.to_string(),
            })?;
        let name = self.players[idx].name.clone();
        self.history.push(format!("{} leaves", name));

        if self.phase.is_street() && self.players[idx].is_contender() {
            self.players[idx].fold();
            self.players_who_acted.insert(player_id.to_string());
            if self.contender_count() <= 1 {
                self.enter_reveal()?;
            } else if self.active_player_index == idx {
                self.advance_after_action(idx)?;
            } else if self.betting_round_complete() {
                self.advance_street_cascade()?;
            }
        }

        self.round_bets.remove(player_id);
        self.players_who_acted.remove(player_id);
        self.players.remove(idx);

        if self.players.is_empty() {
            self.active_player_index = 0;
            self.dealer_index = 0;
        } else {
            if self.active_player_index > idx {
                self.active_player_index -= 1;
            }
            self.active_player_index = self.active_player_index.min(self.players.len() - 1);
            if self.dealer_index > idx {
                self.dealer_index -= 1;
            }
            self.dealer_index = self.dealer_index.min(self.players.len() - 1);
        }
        Ok(())
    }

    pub fn seat_of(&self, player_id: &str) -> Option<usize> {
        self.players.iter().position(|p| p.id == player_id)
    }

    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn active_player_id(&self) -> Option<&str> {
        self.players
            .get(self.active_player_index)
            .map(|p| p.id.as_str())
    }

    /// Chips this player has contributed in the current street.
    pub fn round_bet(&self, player_id: &str) -> u64 {
        self.round_bets.get(player_id).copied().unwrap_or(0)
    }

    pub fn contender_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_contender()).count()
    }

    pub(crate) fn dealable_count(&self) -> usize {
        self.players.iter().filter(|p| p.can_be_dealt()).count()
    }

    /// Smallest forward step from `from` to a player who can still act.
    /// `None` means nobody can act; the hand short-circuits to reveal.
    pub(crate) fn next_player(&self, from: usize) -> Option<usize> {
        let n = self.players.len();
        if n == 0 {
            return None;
        }
        (1..=n)
            .map(|k| (from + k) % n)
            .find(|&idx| self.players[idx].can_act())
    }

    /// First seat at or after `start` that can act this street.
    pub(crate) fn first_actionable_from(&self, start: usize) -> Option<usize> {
        let n = self.players.len();
        if n == 0 {
            return None;
        }
        (0..n)
            .map(|k| (start + k) % n)
            .find(|&idx| self.players[idx].can_act())
    }

    /// First seat at or after `start` eligible to be dealt in.
    pub(crate) fn first_dealable_from(&self, start: usize) -> Option<usize> {
        let n = self.players.len();
        if n == 0 {
            return None;
        }
        (0..n)
            .map(|k| (start + k) % n)
            .find(|&idx| self.players[idx].can_be_dealt())
    }

    /// Next seat strictly after `from` eligible to be dealt in.
    pub(crate) fn next_dealable(&self, from: usize) -> Option<usize> {
        let n = self.players.len();
        if n == 0 {
            return None;
        }
        (1..=n)
            .map(|k| (from + k) % n)
            .find(|&idx| self.players[idx].can_be_dealt())
    }

    /// Next non-spectator seat strictly after `from` (button rotation).
    pub(crate) fn next_non_spectator(&self, from: usize) -> Option<usize> {
        let n = self.players.len();
        if n == 0 {
            return None;
        }
        (1..=n)
            .map(|k| (from + k) % n)
            .find(|&idx| !self.players[idx].is_spectator)
    }

    pub(crate) fn reset_round_state(&mut self) {
        self.round_bets.clear();
        self.current_commitment = 0;
        self.players_who_acted.clear();
    }
}
