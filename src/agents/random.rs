//! Uniformly random legal play, seeded for reproducibility.

use crate::cards::{Card, DrawnPair};
use crate::core::RaceRng;
use crate::engine::Observation;
use crate::riders::RiderId;

use super::Agent;

/// Chooses uniformly among legal options using its own seeded RNG.
#[derive(Clone, Debug)]
pub struct RandomAgent {
    rng: RaceRng,
}

impl RandomAgent {
    /// Create a random agent with its own RNG stream.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: RaceRng::new(seed),
        }
    }
}

impl Agent for RandomAgent {
    fn choose_rider(&mut self, obs: &Observation) -> RiderId {
        let legal: Vec<RiderId> = obs.unfinished_own().map(|v| v.rider).collect();
        *self
            .rng
            .choose(&legal)
            .expect("a consulted team has at least one unfinished rider")
    }

    fn choose_card(&mut self, _obs: &Observation, pair: &DrawnPair) -> Card {
        pair.0[self.rng.gen_index(0..2)]
    }
}
