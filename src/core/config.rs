//! Race configuration.
//!
//! All options default to the base-game rules; builder methods override
//! individual values. [`RaceConfig::validate`] runs at engine construction
//! and fails fast on nonsensical values, before any round is played.

use serde::{Deserialize, Serialize};

use super::error::RaceError;

/// How a team's final rank derives from its riders' ranks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeamScoring {
    /// Team rank = its best-placed rider (first across the line wins).
    #[default]
    BestRider,
    /// Team rank = its worst-placed rider (a team finishes when both do).
    WorstRider,
}

/// Fallback applied when an agent returns an illegal choice.
///
/// Substitution happens in the runner/adapter layer and is always recorded
/// on the round history — the engine itself rejects and nothing is hidden.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvalidActionPolicy {
    /// Propagate the error to the caller.
    #[default]
    Reject,
    /// Substitute the first legal option and flag the substitution.
    FirstLegal,
}

/// Optional per-step reward shaping for the environment adapter.
///
/// Shaping changes optimal-policy semantics, so it is off by default and
/// fully explicit when on: `Progress` pays `per_cell` for every cell of
/// forward progress the controlled team makes between decision points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum RewardShaping {
    /// Terminal reward only.
    #[default]
    None,
    /// Terminal reward plus `per_cell` per cell of forward progress.
    Progress { per_cell: f32 },
}

/// Complete race configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RaceConfig {
    /// Maximum empty cells behind a group that still draft off it.
    pub slipstream_window: u8,

    /// Empty cells tolerated between consecutive riders of one drafting
    /// group (0 = riders must sit in adjacent cells, as in the base game).
    pub slipstream_max_gap: u8,

    /// Movement cap for a Sprinteur on a Hill cell. Rouleurs climb
    /// unmodified.
    pub hill_sprinteur_cap: u8,

    /// Movement floor on a Downhill cell (free descent).
    pub downhill_minimum: u8,

    /// Round limit; exceeding it abandons the race with ranks assigned
    /// from current positions.
    pub max_rounds: u32,

    /// Card value that counts as a sprint-class play.
    pub sprint_value: u8,

    /// Consecutive sprint-class plays after which the rider's next move is
    /// a forced fatigue draw.
    pub sprint_streak_limit: u8,

    /// Base-game pack-front fatigue: a rider with an empty cell directly
    /// ahead after slipstream takes a fatigue card into its discard pile.
    pub front_exhaustion: bool,

    /// Number of cells from the head of the track available for starting
    /// placement.
    pub start_zone: usize,

    /// Team rank derivation.
    pub team_scoring: TeamScoring,

    /// Fallback for illegal agent responses.
    pub invalid_action_policy: InvalidActionPolicy,

    /// Per-step reward shaping for the environment adapter.
    pub reward_shaping: RewardShaping,

    /// Seed for the engine-owned RNG.
    pub rng_seed: u64,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            slipstream_window: 1,
            slipstream_max_gap: 0,
            hill_sprinteur_cap: 5,
            downhill_minimum: 5,
            max_rounds: 200,
            sprint_value: crate::cards::SPRINT_VALUE,
            sprint_streak_limit: 2,
            front_exhaustion: true,
            start_zone: 5,
            team_scoring: TeamScoring::BestRider,
            invalid_action_policy: InvalidActionPolicy::Reject,
            reward_shaping: RewardShaping::None,
            rng_seed: 0,
        }
    }
}

impl RaceConfig {
    /// Base-game configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the slipstream window.
    #[must_use]
    pub fn with_slipstream_window(mut self, window: u8) -> Self {
        self.slipstream_window = window;
        self
    }

    /// Set the in-group slipstream gap tolerance.
    #[must_use]
    pub fn with_slipstream_max_gap(mut self, gap: u8) -> Self {
        self.slipstream_max_gap = gap;
        self
    }

    /// Set the Sprinteur hill cap.
    #[must_use]
    pub fn with_hill_sprinteur_cap(mut self, cap: u8) -> Self {
        self.hill_sprinteur_cap = cap;
        self
    }

    /// Set the downhill movement floor.
    #[must_use]
    pub fn with_downhill_minimum(mut self, minimum: u8) -> Self {
        self.downhill_minimum = minimum;
        self
    }

    /// Set the round limit.
    #[must_use]
    pub fn with_max_rounds(mut self, rounds: u32) -> Self {
        self.max_rounds = rounds;
        self
    }

    /// Set the sprint-exhaustion trigger.
    #[must_use]
    pub fn with_sprint_rule(mut self, sprint_value: u8, streak_limit: u8) -> Self {
        self.sprint_value = sprint_value;
        self.sprint_streak_limit = streak_limit;
        self
    }

    /// Enable or disable pack-front fatigue.
    #[must_use]
    pub fn with_front_exhaustion(mut self, enabled: bool) -> Self {
        self.front_exhaustion = enabled;
        self
    }

    /// Set the starting zone size.
    #[must_use]
    pub fn with_start_zone(mut self, cells: usize) -> Self {
        self.start_zone = cells;
        self
    }

    /// Set the team scoring rule.
    #[must_use]
    pub fn with_team_scoring(mut self, scoring: TeamScoring) -> Self {
        self.team_scoring = scoring;
        self
    }

    /// Set the fallback policy for illegal agent responses.
    #[must_use]
    pub fn with_invalid_action_policy(mut self, policy: InvalidActionPolicy) -> Self {
        self.invalid_action_policy = policy;
        self
    }

    /// Set the reward shaping mode.
    #[must_use]
    pub fn with_reward_shaping(mut self, shaping: RewardShaping) -> Self {
        self.reward_shaping = shaping;
        self
    }

    /// Set the RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = seed;
        self
    }

    /// Check every option for sanity.
    pub fn validate(&self) -> Result<(), RaceError> {
        if self.slipstream_window == 0 {
            return Err(RaceError::config("slipstream_window must be at least 1"));
        }
        if self.slipstream_window <= self.slipstream_max_gap {
            return Err(RaceError::config(
                "slipstream_window must exceed slipstream_max_gap",
            ));
        }
        if self.hill_sprinteur_cap == 0 {
            return Err(RaceError::config("hill_sprinteur_cap must be at least 1"));
        }
        if self.downhill_minimum == 0 {
            return Err(RaceError::config("downhill_minimum must be at least 1"));
        }
        if self.max_rounds == 0 {
            return Err(RaceError::config("max_rounds must be at least 1"));
        }
        if self.sprint_value < crate::cards::FATIGUE_VALUE {
            return Err(RaceError::config(
                "sprint_value must be at least the fatigue value",
            ));
        }
        if self.sprint_streak_limit == 0 {
            return Err(RaceError::config("sprint_streak_limit must be at least 1"));
        }
        if self.start_zone == 0 {
            return Err(RaceError::config("start_zone must be at least 1"));
        }
        if let RewardShaping::Progress { per_cell } = self.reward_shaping {
            if !per_cell.is_finite() || per_cell < 0.0 {
                return Err(RaceError::config(
                    "progress shaping per_cell must be finite and non-negative",
                ));
            }
        }
        Ok(())
    }
}
