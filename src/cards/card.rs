//! Immutable movement cards.
//!
//! A card is a movement value plus an origin. Fatigue cards always carry
//! the minimum playable value and, once forced into a deck, are never
//! removed — permanent performance degradation.

use serde::{Deserialize, Serialize};

/// Value printed on every fatigue card; also the deck's minimum playable
/// value.
pub const FATIGUE_VALUE: u8 = 2;

/// Highest card value in the base game (a Sprinteur's top card).
pub const MAX_CARD_VALUE: u8 = 9;

/// Card value counting as a sprint-class play by default.
pub const SPRINT_VALUE: u8 = 9;

/// Where a card came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CardOrigin {
    /// Part of the rider's starting deck.
    Normal,
    /// Added by an exhaustion rule during the race.
    Fatigue,
}

/// A single movement card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    /// Cells moved when played (before terrain adjustment).
    pub value: u8,
    /// Normal or fatigue.
    pub origin: CardOrigin,
}

impl Card {
    /// A starting-deck card with the given value.
    #[must_use]
    pub const fn normal(value: u8) -> Self {
        Self {
            value,
            origin: CardOrigin::Normal,
        }
    }

    /// A fatigue card.
    #[must_use]
    pub const fn fatigue() -> Self {
        Self {
            value: FATIGUE_VALUE,
            origin: CardOrigin::Fatigue,
        }
    }

    /// True for fatigue cards.
    #[must_use]
    pub const fn is_fatigue(self) -> bool {
        matches!(self.origin, CardOrigin::Fatigue)
    }
}

// Higher value wins; at equal value a normal card ranks above a fatigue
// card, so "play the best card" never prefers fatigue.
impl Ord for Card {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.value, !self.is_fatigue()).cmp(&(other.value, !other.is_fatigue()))
    }
}

impl PartialOrd for Card {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_fatigue() {
            write!(f, "{}E", self.value)
        } else {
            write!(f, "{}", self.value)
        }
    }
}
