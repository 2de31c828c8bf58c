//! Seven-card hand evaluation.
//!
//! Scores 2..7 cards into a totally ordered key: a category plus a
//! canonical tie-breaker tuple, compared lexicographically. Equal keys
//! split the pot.

use crate::game::deck::Card;
use serde::{Deserialize, Serialize};

/// Hand categories in ascending strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HandCategory {
    HighCard,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
    RoyalFlush,
}

impl HandCategory {
    pub fn label(&self) -> &'static str {
        match self {
            HandCategory::HighCard => "High Card",
            HandCategory::OnePair => "Pair",
            HandCategory::TwoPair => "Two Pair",
            HandCategory::ThreeOfAKind => "Three of a Kind",
            HandCategory::Straight => "Straight",
            HandCategory::Flush => "Flush",
            HandCategory::FullHouse => "Full House",
            HandCategory::FourOfAKind => "Four of a Kind",
            HandCategory::StraightFlush => "Straight Flush",
            HandCategory::RoyalFlush => "Royal Flush",
        }
    }
}

/// Composite comparison key for a hand.
///
/// Derived `Ord` compares `category` first, then `tiebreak`
/// lexicographically, which is exactly the intended ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HandResult {
    pub category: HandCategory,
    pub tiebreak: Vec<u8>,
}

impl HandResult {
    fn new(category: HandCategory, tiebreak: Vec<u8>) -> Self {
        Self { category, tiebreak }
    }
}

/// Top card of the best straight in a descending unique-rank list, if any.
///
/// A window of five qualifies iff first - last == 4. The wheel
/// (A-5-4-3-2) is checked separately with the Ace valued as 1, so its
/// top card is the Five.
fn straight_high(ranks_desc: &[u8]) -> Option<u8> {
    if ranks_desc.len() >= 5 {
        for window in ranks_desc.windows(5) {
            if window[0] - window[4] == 4 {
                return Some(window[0]);
            }
        }
    }
    let has = |r: u8| ranks_desc.contains(&r);
    if has(14) && has(5) && has(4) && has(3) && has(2) {
        return Some(5);
    }
    None
}

/// Distinct ranks in descending order.
fn unique_ranks_desc(sorted_desc: &[u8]) -> Vec<u8> {
    let mut out: Vec<u8> = sorted_desc.to_vec();
    out.dedup();
    out
}

/// Evaluates the best 5-card hand reachable from hole + community cards.
pub fn evaluate_hand(hole_cards: &[Card], community_cards: &[Card]) -> HandResult {
    let mut cards: Vec<Card> = hole_cards
        .iter()
        .chain(community_cards.iter())
        .copied()
        .collect();
    debug_assert!(!cards.is_empty(), "cannot evaluate an empty hand");
    cards.sort_by(|a, b| b.rank.cmp(&a.rank));

    // Per-suit rank buckets, descending within each suit. With at most
    // seven cards only one suit can reach five.
    let mut suits: [Vec<u8>; 4] = Default::default();
    for card in &cards {
        suits[card.suit as usize].push(card.rank);
    }
    let flush_suit = suits.iter().position(|bucket| bucket.len() >= 5);

    // Straight flush / royal flush are detected on the flush-suit subset
    // only; a straight assembled across suits does not count here.
    if let Some(suit) = flush_suit {
        let flush_ranks = unique_ranks_desc(&suits[suit]);
        if let Some(high) = straight_high(&flush_ranks) {
            if high == 14 {
                return HandResult::new(HandCategory::RoyalFlush, vec![]);
            }
            return HandResult::new(HandCategory::StraightFlush, vec![high]);
        }
    }

    // Rank multiplicities, scanned from the highest rank down.
    let mut counts = [0u8; 15];
    for card in &cards {
        counts[card.rank as usize] += 1;
    }
    let ranks_with_count = |n: u8| -> Vec<u8> {
        (2..=14u8)
            .rev()
            .filter(|&r| counts[r as usize] == n)
            .collect()
    };
    let quads = ranks_with_count(4);
    let trips = ranks_with_count(3);
    let pairs = ranks_with_count(2);

    let all_ranks: Vec<u8> = cards.iter().map(|c| c.rank).collect();
    let kickers = |exclude: &[u8], take: usize| -> Vec<u8> {
        all_ranks
            .iter()
            .filter(|r| !exclude.contains(r))
            .take(take)
            .copied()
            .collect()
    };

    if let Some(&quad) = quads.first() {
        let mut tiebreak = vec![quad];
        tiebreak.extend(kickers(&[quad], 1));
        return HandResult::new(HandCategory::FourOfAKind, tiebreak);
    }

    // A second set of trips fills the pair slot of a full house.
    if let Some(&three) = trips.first() {
        let pair_slot = trips.get(1).copied().or_else(|| pairs.first().copied());
        if let Some(two) = pair_slot {
            return HandResult::new(HandCategory::FullHouse, vec![three, two]);
        }
    }

    if let Some(suit) = flush_suit {
        let top5: Vec<u8> = suits[suit].iter().take(5).copied().collect();
        return HandResult::new(HandCategory::Flush, top5);
    }

    let unique = unique_ranks_desc(&all_ranks);
    if let Some(high) = straight_high(&unique) {
        return HandResult::new(HandCategory::Straight, vec![high]);
    }

    if let Some(&three) = trips.first() {
        let mut tiebreak = vec![three];
        tiebreak.extend(kickers(&[three], 2));
        return HandResult::new(HandCategory::ThreeOfAKind, tiebreak);
    }

    if pairs.len() >= 2 {
        let (hi, lo) = (pairs[0], pairs[1]);
        let mut tiebreak = vec![hi, lo];
        tiebreak.extend(kickers(&[hi, lo], 1));
        return HandResult::new(HandCategory::TwoPair, tiebreak);
    }

    if let Some(&pair) = pairs.first() {
        let mut tiebreak = vec![pair];
        tiebreak.extend(kickers(&[pair], 3));
        return HandResult::new(HandCategory::OnePair, tiebreak);
    }

    let top5: Vec<u8> = unique.iter().take(5).copied().collect();
    HandResult::new(HandCategory::HighCard, top5)
}

/// Determines the winner(s) among (seat index, hand) pairs.
/// Ties return every index holding the best key.
pub fn determine_winners(hands: &[(usize, HandResult)]) -> Vec<usize> {
    if hands.is_empty() {
        return vec![];
    }
    let best = hands.iter().map(|(_, result)| result).max().unwrap();
    hands
        .iter()
        .filter(|(_, result)| result == best)
        .map(|(idx, _)| *idx)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(specs: &[(u8, u8)]) -> HandResult {
        let cards: Vec<Card> = specs.iter().map(|&(r, s)| Card::new(r, s)).collect();
        evaluate_hand(&cards[..2], &cards[2..])
    }

    #[test]
    fn test_royal_flush() {
        let result = eval(&[(14, 3), (13, 3), (12, 3), (11, 3), (10, 3)]);
        assert_eq!(result.category, HandCategory::RoyalFlush);
    }

    #[test]
    fn test_straight_flush_beats_quads() {
        let sf = eval(&[(9, 3), (8, 3), (7, 3), (6, 3), (5, 3), (14, 0), (14, 1)]);
        assert_eq!(sf.category, HandCategory::StraightFlush);
        assert_eq!(sf.tiebreak, vec![9]);

        let quads = eval(&[(14, 0), (14, 1), (14, 2), (14, 3), (9, 0)]);
        assert_eq!(quads.category, HandCategory::FourOfAKind);
        assert!(sf > quads);
    }

    #[test]
    fn test_wheel_is_five_high() {
        let result = eval(&[(14, 0), (2, 1), (3, 2), (4, 3), (5, 0), (9, 1), (11, 2)]);
        assert_eq!(result.category, HandCategory::Straight);
        assert_eq!(result.tiebreak, vec![5]);
    }

    #[test]
    fn test_ace_high_straight() {
        let result = eval(&[(10, 0), (11, 1), (12, 2), (13, 3), (14, 0)]);
        assert_eq!(result.category, HandCategory::Straight);
        assert_eq!(result.tiebreak, vec![14]);
    }

    #[test]
    fn test_six_card_straight_picks_top() {
        let result = eval(&[(9, 0), (10, 1), (11, 2), (12, 3), (13, 0), (14, 1), (2, 2)]);
        assert_eq!(result.category, HandCategory::Straight);
        assert_eq!(result.tiebreak, vec![14]);
    }

    #[test]
    fn test_mixed_suit_straight_with_flush_is_flush() {
        // Hearts flush present; the straight uses a spade, so no straight flush.
        let result = eval(&[(9, 2), (8, 2), (7, 2), (6, 2), (5, 3), (2, 2), (3, 0)]);
        assert_eq!(result.category, HandCategory::Flush);
        assert_eq!(result.tiebreak, vec![9, 8, 7, 6, 2]);
    }

    #[test]
    fn test_two_trips_make_full_house() {
        let result = eval(&[(8, 0), (8, 1), (8, 2), (12, 0), (12, 1), (12, 2), (3, 3)]);
        assert_eq!(result.category, HandCategory::FullHouse);
        assert_eq!(result.tiebreak, vec![12, 8]);
    }

    #[test]
    fn test_three_pairs_keep_top_two_with_best_kicker() {
        let result = eval(&[(4, 0), (4, 1), (9, 2), (9, 3), (13, 0), (13, 1), (14, 2)]);
        assert_eq!(result.category, HandCategory::TwoPair);
        assert_eq!(result.tiebreak, vec![13, 9, 14]);
    }

    #[test]
    fn test_pair_with_kickers() {
        let result = eval(&[(14, 3), (14, 2), (2, 1), (5, 0), (9, 3)]);
        assert_eq!(result.category, HandCategory::OnePair);
        assert_eq!(result.tiebreak, vec![14, 9, 5, 2]);
    }

    #[test]
    fn test_high_card_two_cards_only() {
        let cards = [Card::new(13, 0), Card::new(7, 1)];
        let result = evaluate_hand(&cards, &[]);
        assert_eq!(result.category, HandCategory::HighCard);
        assert_eq!(result.tiebreak, vec![13, 7]);
    }

    #[test]
    fn test_kicker_breaks_pair_tie() {
        let a = eval(&[(10, 0), (10, 1), (14, 2), (6, 3), (3, 0)]);
        let b = eval(&[(10, 2), (10, 3), (13, 0), (6, 1), (3, 2)]);
        assert!(a > b);
    }

    #[test]
    fn test_determine_winners_single() {
        let hands = vec![
            (0, HandResult::new(HandCategory::ThreeOfAKind, vec![9, 14, 5])),
            (1, HandResult::new(HandCategory::OnePair, vec![14, 13, 9, 5])),
            (2, HandResult::new(HandCategory::TwoPair, vec![11, 4, 14])),
        ];
        assert_eq!(determine_winners(&hands), vec![0]);
    }

    #[test]
    fn test_determine_winners_tie() {
        let hands = vec![
            (0, HandResult::new(HandCategory::Straight, vec![10])),
            (1, HandResult::new(HandCategory::Straight, vec![10])),
        ];
        let winners = determine_winners(&hands);
        assert_eq!(winners.len(), 2);
        assert!(winners.contains(&0));
        assert!(winners.contains(&1));
    }
}
