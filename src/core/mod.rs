//! Core infrastructure: RNG, configuration, errors.

mod config;
mod error;
mod rng;

pub use config::{InvalidActionPolicy, RaceConfig, RewardShaping, TeamScoring};
pub use error::RaceError;
pub use rng::{RaceRng, RaceRngState};
