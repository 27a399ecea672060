//! Decision-makers: the `Agent` capability trait and its variants.
//!
//! An agent answers exactly two questions per round it is consulted:
//! which of its riders moves, and which of two drawn cards it plays. Both
//! answers must come from the options given, or the engine rejects them
//! (see the runner's fallback policy). Scripted bots and learned policies
//! implement the same trait; the engine depends only on the interface.

mod heuristic;
mod policy;
mod random;

pub use heuristic::{GreedyAgent, HeuristicAgent};
pub use policy::{Policy, PolicyAgent};
pub use random::RandomAgent;

use crate::cards::{Card, DrawnPair};
use crate::engine::Observation;
use crate::riders::RiderId;

/// The decision capability consumed by the engine's runner.
pub trait Agent {
    /// Pick one of the team's unfinished riders to move this round.
    fn choose_rider(&mut self, obs: &Observation) -> RiderId;

    /// Pick one of the two drawn cards; the other is discarded unplayed.
    fn choose_card(&mut self, obs: &Observation, pair: &DrawnPair) -> Card;
}
