//! # flamme-rouge
//!
//! A deterministic race engine for the bicycle-racing board game
//! Flamme Rouge, built to serve both as a rules referee and as a decision
//! environment for scripted bots and learning-based policies.
//!
//! ## Design Principles
//!
//! 1. **Bit-reproducible**: Every source of randomness is an explicit,
//!    seedable RNG owned by the engine instance. Same seed + same decisions
//!    = identical state trajectory.
//!
//! 2. **Step-wise state machine**: The engine pauses at well-defined
//!    decision points and resumes on the next call. No callbacks, no
//!    coroutines — agents and training loops drive it from the outside.
//!
//! 3. **Capability interface over inheritance**: Scripted bots and learned
//!    policies implement the same two-method [`Agent`] contract; the engine
//!    never knows which is which.
//!
//! ## Modules
//!
//! - `core`: RNG, configuration, errors
//! - `cards`: Movement cards and per-rider decks
//! - `track`: Terrain segments, cell/lane occupancy, preset courses
//! - `riders`: Rider archetypes and teams
//! - `engine`: Race state machine and round resolution
//! - `agents`: The `Agent` trait, scripted bots, policy adapter
//! - `env`: Sequential decision-process wrapper for training loops

pub mod core;
pub mod cards;
pub mod track;
pub mod riders;
pub mod engine;
pub mod agents;
pub mod env;

// Re-export commonly used types
pub use crate::core::{
    InvalidActionPolicy, RaceConfig, RaceError, RaceRng, RaceRngState, RewardShaping, TeamScoring,
};

pub use crate::cards::{Card, CardOrigin, Deck, DrawnPair, FATIGUE_VALUE, SPRINT_VALUE};

pub use crate::track::{courses, Segment, Terrain, Track};

pub use crate::riders::{Rider, RiderId, RiderType, Team, TeamId, TeamSpec};

pub use crate::engine::{
    Choice, DecisionKind, DecisionPoint, MoveRecord, Observation, Phase, Race, RaceEngine,
    RaceOutcome, RaceSnapshot, RoundRecord, TeamStanding,
};

pub use crate::agents::{Agent, GreedyAgent, HeuristicAgent, Policy, PolicyAgent, RandomAgent};

pub use crate::env::{EnvAction, RaceEnv, StepInfo, StepOutcome};
