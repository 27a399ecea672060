//! Rider archetypes, riders, and teams.
//!
//! A team conventionally fields one Rouleur and one Sprinteur
//! ([`TeamSpec::regular`]), but any non-empty rider list is accepted so
//! reduced scenarios (single-rider time trials, odd line-ups) stay
//! expressible.

use serde::{Deserialize, Serialize};

use crate::cards::{Card, Deck, DrawnPair};

/// Rider identifier, unique across the whole race.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RiderId(pub u8);

impl RiderId {
    /// Create a new rider ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for RiderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Rider {}", self.0)
    }
}

/// Team identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamId(pub u8);

impl TeamId {
    /// Create a new team ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Team {}", self.0)
    }
}

/// The two rider archetypes, with different decks and terrain sensitivity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiderType {
    /// Steady climber: 3,4,5,6,7 three times each.
    Rouleur,
    /// Burst specialist: 2,3,4,5,9 three times each; capped on hills.
    Sprinteur,
}

impl RiderType {
    /// The archetype's starting deck (unshuffled).
    #[must_use]
    pub fn starting_deck(self) -> Vec<Card> {
        let values: [u8; 5] = match self {
            RiderType::Rouleur => [3, 4, 5, 6, 7],
            RiderType::Sprinteur => [2, 3, 4, 5, 9],
        };
        values
            .iter()
            .flat_map(|&v| std::iter::repeat(Card::normal(v)).take(3))
            .collect()
    }
}

impl std::fmt::Display for RiderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiderType::Rouleur => write!(f, "Rouleur"),
            RiderType::Sprinteur => write!(f, "Sprinteur"),
        }
    }
}

/// A single racer. Position lives on the track; everything else lives here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rider {
    pub id: RiderId,
    pub team: TeamId,
    pub rider_type: RiderType,
    pub deck: Deck,

    /// The two drawn cards between the rider-choice and card-choice
    /// decision points of a round; `None` otherwise.
    pub hand: Option<DrawnPair>,

    pub finished: bool,

    /// Finish order, 1-based, assigned when the rider crosses the line
    /// (or at abandonment).
    pub rank: Option<u32>,

    /// Consecutive sprint-class plays by this rider.
    pub sprint_streak: u8,

    /// Set when the sprint rule forces a fatigue draw on this rider's
    /// next move.
    pub exhaustion_due: bool,

    /// Cards dealt at race start, for bookkeeping checks.
    pub initial_cards: usize,
}

impl Rider {
    /// Create a rider with a freshly shuffled deck.
    #[must_use]
    pub fn new(id: RiderId, team: TeamId, rider_type: RiderType, deck: Deck) -> Self {
        let initial_cards = deck.total_cards();
        Self {
            id,
            team,
            rider_type,
            deck,
            hand: None,
            finished: false,
            rank: None,
            sprint_streak: 0,
            exhaustion_due: false,
            initial_cards,
        }
    }

    /// Cards currently held between decision points.
    #[must_use]
    pub fn cards_in_hand(&self) -> usize {
        match self.hand {
            Some(_) => 2,
            None => 0,
        }
    }

    /// Every card the rider owns right now: piles plus hand.
    #[must_use]
    pub fn total_card_count(&self) -> usize {
        self.deck.total_cards() + self.cards_in_hand()
    }
}

/// A team as raced: id, name, and its riders.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub riders: Vec<RiderId>,
}

/// Line-up used to build a team at race start.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSpec {
    pub name: String,
    pub riders: Vec<RiderType>,
}

impl TeamSpec {
    /// A custom line-up. Must be non-empty (validated at engine
    /// construction).
    pub fn new(name: impl Into<String>, riders: Vec<RiderType>) -> Self {
        Self {
            name: name.into(),
            riders,
        }
    }

    /// The conventional line-up: one Rouleur, one Sprinteur.
    pub fn regular(name: impl Into<String>) -> Self {
        Self::new(name, vec![RiderType::Rouleur, RiderType::Sprinteur])
    }

    /// A single-rider line-up, for reduced scenarios.
    pub fn solo(name: impl Into<String>, rider_type: RiderType) -> Self {
        Self::new(name, vec![rider_type])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RaceRng;

    #[test]
    fn test_starting_decks() {
        let rouleur = RiderType::Rouleur.starting_deck();
        assert_eq!(rouleur.len(), 15);
        assert_eq!(rouleur.iter().map(|c| c.value as u32).sum::<u32>(), 75);
        assert!(rouleur.iter().all(|c| !c.is_fatigue()));

        let sprinteur = RiderType::Sprinteur.starting_deck();
        assert_eq!(sprinteur.len(), 15);
        assert_eq!(sprinteur.iter().filter(|c| c.value == 9).count(), 3);
    }

    #[test]
    fn test_rider_card_accounting() {
        let mut rng = RaceRng::new(42);
        let deck = Deck::new(RiderType::Rouleur.starting_deck(), &mut rng);
        let mut rider = Rider::new(
            RiderId::new(0),
            TeamId::new(0),
            RiderType::Rouleur,
            deck,
        );

        assert_eq!(rider.total_card_count(), 15);

        rider.hand = rider.deck.draw_two(&mut rng);
        assert_eq!(rider.cards_in_hand(), 2);
        assert_eq!(rider.total_card_count(), 15);
    }

    #[test]
    fn test_team_specs() {
        let regular = TeamSpec::regular("Blue");
        assert_eq!(regular.riders.len(), 2);

        let solo = TeamSpec::solo("Solo", RiderType::Sprinteur);
        assert_eq!(solo.riders, vec![RiderType::Sprinteur]);
    }

    #[test]
    fn test_id_display() {
        assert_eq!(format!("{}", RiderId::new(3)), "Rider 3");
        assert_eq!(format!("{}", TeamId::new(1)), "Team 1");
    }
}
