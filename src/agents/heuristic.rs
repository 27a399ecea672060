//! Deterministic scripted bots.

use crate::cards::{Card, DrawnPair};
use crate::engine::{DecisionKind, Observation};
use crate::riders::{RiderId, RiderType};

use super::Agent;

/// Always plays the higher drawn card with its foremost unfinished rider.
///
/// Burns through the deck fast and exhausts itself doing it; a useful
/// baseline and a handy deterministic opponent in tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct GreedyAgent;

impl GreedyAgent {
    /// Create a greedy agent.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Agent for GreedyAgent {
    fn choose_rider(&mut self, obs: &Observation) -> RiderId {
        obs.unfinished_own()
            .max_by_key(|v| (v.cell, std::cmp::Reverse(v.lane)))
            .expect("a consulted team has at least one unfinished rider")
            .rider
    }

    fn choose_card(&mut self, _obs: &Observation, pair: &DrawnPair) -> Card {
        pair.higher()
    }
}

/// Paces itself: sprints once the line is within reach of its best cards,
/// conserves them otherwise. Moves its Sprinteur before its Rouleur.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeuristicAgent;

impl HeuristicAgent {
    /// Create a heuristic agent.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Agent for HeuristicAgent {
    fn choose_rider(&mut self, obs: &Observation) -> RiderId {
        obs.unfinished_own()
            .min_by_key(|v| v.rider_type == RiderType::Rouleur)
            .expect("a consulted team has at least one unfinished rider")
            .rider
    }

    fn choose_card(&mut self, obs: &Observation, pair: &DrawnPair) -> Card {
        let rider = match obs.decision {
            Some(DecisionKind::ChooseCard { rider, .. }) => rider,
            _ => return pair.higher(),
        };
        let Some(view) = obs.own_view(rider) else {
            return pair.higher();
        };

        // The rider's full remaining card set: piles plus the drawn pair.
        let mut values: Vec<u8> = Vec::new();
        for (value, &count) in view.deck_counts.iter().enumerate() {
            values.extend(std::iter::repeat(value as u8).take(count as usize));
        }
        values.push(pair.0[0].value);
        values.push(pair.0[1].value);
        values.sort_unstable();

        let top: Vec<u8> = values.iter().rev().take(3).copied().collect();
        let reach: usize = top.iter().map(|&v| v as usize).sum();
        let to_go = obs.finish_line.saturating_sub(view.cell);

        // Close enough that the best cards get us home: spend them.
        if to_go <= reach {
            return pair.higher();
        }

        // Otherwise save the top cards and play the best of the rest.
        let threshold = top.last().copied().unwrap_or(0);
        pair.0
            .iter()
            .copied()
            .filter(|c| c.value < threshold)
            .max()
            .unwrap_or_else(|| pair.lower())
    }
}
