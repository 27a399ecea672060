//! Per-rider deck with draw/discard/reshuffle semantics.
//!
//! The draw pile is a shuffled stack (top = end of the vec, as in a
//! face-down pile). When it runs dry the discard pile is shuffled in as the
//! new draw pile. No card is ever created or destroyed except fatigue
//! cards, which are appended and never removed.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::RaceRng;

use super::card::{Card, MAX_CARD_VALUE};

/// The two cards offered to an agent for one move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawnPair(pub [Card; 2]);

impl DrawnPair {
    /// The card at the given slot (0 or 1).
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Card> {
        self.0.get(index).copied()
    }

    /// True if `card` is one of the pair.
    #[must_use]
    pub fn contains(&self, card: Card) -> bool {
        self.0.contains(&card)
    }

    /// The better of the two cards.
    #[must_use]
    pub fn higher(&self) -> Card {
        self.0[0].max(self.0[1])
    }

    /// The worse of the two cards.
    #[must_use]
    pub fn lower(&self) -> Card {
        self.0[0].min(self.0[1])
    }

    /// Given one card of the pair, the other one. The first matching slot
    /// is consumed, so a doubled pair yields its twin.
    #[must_use]
    pub fn other(&self, card: Card) -> Option<Card> {
        if self.0[0] == card {
            Some(self.0[1])
        } else if self.0[1] == card {
            Some(self.0[0])
        } else {
            None
        }
    }
}

/// A rider's deck: face-down draw pile plus face-up discard pile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    draw_pile: Vec<Card>,
    discard_pile: Vec<Card>,
}

impl Deck {
    /// Build a deck from starting cards, shuffled with the engine's RNG.
    #[must_use]
    pub fn new(mut cards: Vec<Card>, rng: &mut RaceRng) -> Self {
        rng.shuffle(&mut cards);
        Self {
            draw_pile: cards,
            discard_pile: Vec::new(),
        }
    }

    /// Cards remaining across both piles.
    #[must_use]
    pub fn total_cards(&self) -> usize {
        self.draw_pile.len() + self.discard_pile.len()
    }

    /// The draw pile, bottom to top.
    #[must_use]
    pub fn draw_pile(&self) -> &[Card] {
        &self.draw_pile
    }

    /// The discard pile, oldest first.
    #[must_use]
    pub fn discard_pile(&self) -> &[Card] {
        &self.discard_pile
    }

    /// All cards in the deck, both piles.
    pub fn iter(&self) -> impl Iterator<Item = Card> + '_ {
        self.draw_pile
            .iter()
            .chain(self.discard_pile.iter())
            .copied()
    }

    /// Count of cards per value across both piles, indexed by value.
    #[must_use]
    pub fn value_counts(&self) -> [u8; MAX_CARD_VALUE as usize + 1] {
        let mut counts = [0u8; MAX_CARD_VALUE as usize + 1];
        for card in self.iter() {
            counts[card.value as usize] += 1;
        }
        counts
    }

    /// Number of fatigue cards accumulated so far.
    #[must_use]
    pub fn fatigue_count(&self) -> usize {
        self.iter().filter(|c| c.is_fatigue()).count()
    }

    fn draw(&mut self, rng: &mut RaceRng) -> Option<Card> {
        if self.draw_pile.is_empty() {
            if self.discard_pile.is_empty() {
                return None;
            }
            debug!(
                discarded = self.discard_pile.len(),
                "reshuffling discard pile into draw pile"
            );
            std::mem::swap(&mut self.draw_pile, &mut self.discard_pile);
            rng.shuffle(&mut self.draw_pile);
        }
        self.draw_pile.pop()
    }

    /// Draw two cards, reshuffling the discard pile as needed.
    ///
    /// Returns `None` only when fewer than two cards exist across both
    /// piles — a deck-bookkeeping violation the engine treats as fatal.
    #[must_use]
    pub fn draw_two(&mut self, rng: &mut RaceRng) -> Option<DrawnPair> {
        if self.total_cards() < 2 {
            return None;
        }
        let first = self.draw(rng)?;
        let second = self.draw(rng)?;
        Some(DrawnPair([first, second]))
    }

    /// Put a card on the discard pile.
    pub fn discard(&mut self, card: Card) {
        self.discard_pile.push(card);
    }

    /// Append a fresh fatigue card to the discard pile and return it as
    /// the forced move for the round.
    pub fn force_exhaustion(&mut self) -> Card {
        let card = Card::fatigue();
        self.discard_pile.push(card);
        card
    }
}
