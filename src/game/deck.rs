use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

// Simple card representation for the hold'em core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub rank: u8, // 2-14 (Jack=11, Queen=12, King=13, Ace=14)
    pub suit: u8, // 0-3 (Clubs, Diamonds, Hearts, Spades)
}

impl Card {
    pub fn new(rank: u8, suit: u8) -> Self {
        Self { rank, suit }
    }

    fn suit_char(suit: u8) -> char {
        match suit {
            0 => '♣',
            1 => '♦',
            2 => '♥',
            3 => '♠',
            _ => '?',
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rank_str = match self.rank {
            11 => "J".to_string(),
            12 => "Q".to_string(),
            13 => "K".to_string(),
            14 => "A".to_string(),
            n => n.to_string(),
        };
        write!(f, "{}{}", rank_str, Self::suit_char(self.suit))
    }
}

/// An ordered deck dealt from the top.
///
/// Burned cards are removed from play but counted, so the 52-card
/// accounting invariant stays checkable between deal and cleanup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<Card>,
    burned: usize,
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

impl Deck {
    /// Creates a new standard 52-card deck in canonical order
    pub fn new() -> Self {
        let mut cards = Vec::with_capacity(52);

        // 4 suits: Clubs=0, Diamonds=1, Hearts=2, Spades=3
        // 13 ranks: 2-10, Jack=11, Queen=12, King=13, Ace=14
        for suit in 0..4 {
            for rank in 2..=14 {
                cards.push(Card::new(rank, suit));
            }
        }

        Self { cards, burned: 0 }
    }

    /// A fully shuffled fresh deck using the entropy-seeded RNG.
    pub fn shuffled() -> Self {
        let mut deck = Self::new();
        deck.shuffle();
        deck
    }

    /// A fresh deck shuffled from a fixed seed. Reproducible deals for tests.
    pub fn shuffled_from_seed(seed: u64) -> Self {
        let mut deck = Self::new();
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        deck.shuffle_with(&mut rng);
        deck
    }

    /// A deck with an exact card order. The last card is dealt first.
    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards, burned: 0 }
    }

    /// Shuffles the deck with an unbiased Fisher-Yates pass.
    ///
    /// ChaCha20 seeded from OS entropy; a predictable shuffle would let an
    /// observer reconstruct hole cards, so a non-cryptographic PRNG is not
    /// acceptable here.
    pub fn shuffle(&mut self) {
        let mut rng = ChaCha20Rng::from_entropy();
        self.shuffle_with(&mut rng);
    }

    /// Shuffle with a caller-provided RNG (seedable hook for tests).
    pub fn shuffle_with<R: Rng>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    /// Deals a single card from the top of the deck
    pub fn deal(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    /// Deals multiple cards from the deck
    pub fn deal_multiple(&mut self, count: usize) -> Vec<Card> {
        let mut dealt = Vec::new();
        for _ in 0..count {
            if let Some(card) = self.deal() {
                dealt.push(card);
            }
        }
        dealt
    }

    /// Removes the top card from play without revealing it
    pub fn burn(&mut self) {
        if self.cards.pop().is_some() {
            self.burned += 1;
        }
    }

    /// Returns the number of remaining cards
    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    /// Number of cards burned since the deck was created
    pub fn burned(&self) -> usize {
        self.burned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_new_deck_has_52_cards() {
        let deck = Deck::new();
        assert_eq!(deck.remaining(), 52);
    }

    #[test]
    fn test_new_deck_has_no_duplicates() {
        let mut deck = Deck::new();
        let mut seen = HashSet::new();
        while let Some(card) = deck.deal() {
            assert!(seen.insert((card.rank, card.suit)), "duplicate: {}", card);
        }
        assert_eq!(seen.len(), 52);
    }

    #[test]
    fn test_shuffle_maintains_card_count() {
        let mut deck = Deck::new();
        deck.shuffle();
        assert_eq!(deck.remaining(), 52);
    }

    #[test]
    fn test_deal_reduces_deck_size() {
        let mut deck = Deck::new();
        deck.deal();
        assert_eq!(deck.remaining(), 51);
    }

    #[test]
    fn test_burn_is_counted() {
        let mut deck = Deck::new();
        deck.burn();
        deck.burn();
        assert_eq!(deck.remaining(), 50);
        assert_eq!(deck.burned(), 2);
    }

    #[test]
    fn test_seeded_shuffle_is_reproducible() {
        let mut a = Deck::shuffled_from_seed(7);
        let mut b = Deck::shuffled_from_seed(7);
        for _ in 0..52 {
            assert_eq!(a.deal(), b.deal());
        }
    }

    #[test]
    fn test_deal_multiple() {
        let mut deck = Deck::new();
        let cards = deck.deal_multiple(5);
        assert_eq!(cards.len(), 5);
        assert_eq!(deck.remaining(), 47);
    }

    #[test]
    fn test_card_to_string() {
        let card = Card::new(14, 3); // Ace of Spades
        assert!(card.to_string().contains('A'));
    }
}
