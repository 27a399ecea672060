//! Sequential decision-process wrapper around one race.
//!
//! [`RaceEnv`] exposes a single controlled team to an external training
//! loop through the standard `reset`/`step` interaction; every other team
//! is driven internally by its own agent. Between two controlled-team
//! decision points the adapter advances opponent turns itself, but it never
//! skips a decision the controlled team is required to make.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::agents::Agent;
use crate::core::{InvalidActionPolicy, RaceConfig, RaceError, RewardShaping};
use crate::engine::{Choice, DecisionKind, Observation, Phase, RaceEngine};
use crate::riders::{TeamId, TeamSpec};
use crate::track::{Segment, Track};

/// Size of the discrete action space.
pub const ENV_ACTION_COUNT: usize = 4;

/// The discrete composite actions of the decision process.
///
/// Rider actions answer rider decision points (slot A = the team's first
/// rider); card actions answer card decision points (index into the drawn
/// pair). Which half is legal follows from the pending decision in the
/// observation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnvAction {
    RiderA,
    RiderB,
    CardFirst,
    CardSecond,
}

impl EnvAction {
    /// All actions, index order.
    #[must_use]
    pub const fn all() -> [EnvAction; ENV_ACTION_COUNT] {
        [
            EnvAction::RiderA,
            EnvAction::RiderB,
            EnvAction::CardFirst,
            EnvAction::CardSecond,
        ]
    }

    /// Stable index for learning frameworks.
    #[must_use]
    pub const fn to_index(self) -> usize {
        match self {
            EnvAction::RiderA => 0,
            EnvAction::RiderB => 1,
            EnvAction::CardFirst => 2,
            EnvAction::CardSecond => 3,
        }
    }

    /// Action for an index, if in range.
    #[must_use]
    pub fn from_index(index: usize) -> Option<EnvAction> {
        EnvAction::all().get(index).copied()
    }

    /// The actions legal for the observation's pending decision.
    #[must_use]
    pub fn legal(obs: &Observation) -> Vec<EnvAction> {
        match obs.decision {
            Some(DecisionKind::ChooseRider) => {
                let slots = [EnvAction::RiderA, EnvAction::RiderB];
                obs.own_riders
                    .iter()
                    .take(2)
                    .enumerate()
                    .filter(|(_, v)| !v.finished)
                    .map(|(slot, _)| slots[slot])
                    .collect()
            }
            Some(DecisionKind::ChooseCard { .. }) => {
                vec![EnvAction::CardFirst, EnvAction::CardSecond]
            }
            None => Vec::new(),
        }
    }
}

/// Side information returned with every step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepInfo {
    pub round: u32,
    /// Opponent fallback substitutions so far this episode.
    pub substitutions: u32,
    /// The race hit the round limit and was abandoned.
    pub abandoned: bool,
    /// Controlled team's final rank, once terminal.
    pub final_rank: Option<u32>,
}

/// Result of one environment step.
#[derive(Clone, Debug)]
pub struct StepOutcome {
    pub observation: Observation,
    pub reward: f32,
    pub terminated: bool,
    pub info: StepInfo,
}

const CONTROLLED: TeamId = TeamId::new(0);

/// One race as a decision process for a single controlled team.
pub struct RaceEnv {
    course: Vec<Segment>,
    specs: Vec<TeamSpec>,
    opponents: Vec<Box<dyn Agent>>,
    config: RaceConfig,
    engine: Option<RaceEngine>,
    substitutions: u32,
}

impl RaceEnv {
    /// Build an environment. The controlled team races as team 0; each
    /// opponent team brings its own agent. Fails fast on a bad course or
    /// configuration.
    pub fn new(
        course: Vec<Segment>,
        controlled: TeamSpec,
        opponents: Vec<(TeamSpec, Box<dyn Agent>)>,
        config: RaceConfig,
    ) -> Result<Self, RaceError> {
        config.validate()?;
        Track::new(course.clone())?;

        let mut specs = Vec::with_capacity(opponents.len() + 1);
        specs.push(controlled);
        let mut agents = Vec::with_capacity(opponents.len());
        for (spec, agent) in opponents {
            specs.push(spec);
            agents.push(agent);
        }

        Ok(Self {
            course,
            specs,
            opponents: agents,
            config,
            engine: None,
            substitutions: 0,
        })
    }

    /// The engine of the current episode, if one is running.
    #[must_use]
    pub fn engine(&self) -> Option<&RaceEngine> {
        self.engine.as_ref()
    }

    /// Start a fresh episode and return the controlled team's first
    /// observation.
    pub fn reset(&mut self, seed: u64) -> Result<Observation, RaceError> {
        self.config.rng_seed = seed;
        let track = Track::new(self.course.clone())?;
        self.engine = Some(RaceEngine::new(
            track,
            self.specs.clone(),
            self.config.clone(),
        )?);
        self.substitutions = 0;
        self.advance_opponents()?;
        Ok(self.current_engine().observe(CONTROLLED))
    }

    /// Apply the controlled team's action at its pending decision point,
    /// advance opponent turns, and return the next observation.
    ///
    /// Illegal actions are rejected with [`RaceError::InvalidAction`]
    /// before anything reaches the engine.
    ///
    /// # Panics
    ///
    /// Panics if called before [`Self::reset`].
    pub fn step(&mut self, action: EnvAction) -> Result<StepOutcome, RaceError> {
        let decision = self
            .current_engine()
            .current_decision()
            .copied()
            .ok_or_else(|| RaceError::invalid(CONTROLLED, "the race is already over"))?;
        debug_assert_eq!(decision.team, CONTROLLED, "opponents are driven internally");

        let legal = EnvAction::legal(&self.current_engine().observe(CONTROLLED));
        if !legal.contains(&action) {
            return Err(RaceError::invalid(
                CONTROLLED,
                format!("action {action:?} is not legal at this decision point"),
            ));
        }

        let progress_before = self.controlled_progress();

        let choice = match (decision.kind, action) {
            (DecisionKind::ChooseRider, EnvAction::RiderA) => {
                Choice::Rider(self.current_engine().teams()[CONTROLLED.index()].riders[0])
            }
            (DecisionKind::ChooseRider, EnvAction::RiderB) => {
                Choice::Rider(self.current_engine().teams()[CONTROLLED.index()].riders[1])
            }
            (DecisionKind::ChooseCard { pair, .. }, EnvAction::CardFirst) => {
                Choice::Card(pair.0[0])
            }
            (DecisionKind::ChooseCard { pair, .. }, EnvAction::CardSecond) => {
                Choice::Card(pair.0[1])
            }
            _ => unreachable!("legality checked above"),
        };

        let engine = self.engine.as_mut().expect("call reset() before step()");
        match engine.submit(choice) {
            Ok(_) => {}
            Err(RaceError::RaceTimeout { .. }) => {}
            Err(err) => return Err(err),
        }
        if self.current_engine().phase() != Phase::Finished {
            self.advance_opponents()?;
        }

        let engine = self.current_engine();
        let terminated = engine.phase() == Phase::Finished;

        let mut reward = 0.0_f32;
        if let RewardShaping::Progress { per_cell } = self.config.reward_shaping {
            let delta = self.controlled_progress().saturating_sub(progress_before);
            reward += delta as f32 * per_cell;
        }

        let engine = self.current_engine();
        let mut final_rank = None;
        if terminated {
            let outcome = engine.outcome().expect("race just finished");
            let rank = outcome
                .standings
                .iter()
                .find(|s| s.team == CONTROLLED)
                .expect("the controlled team raced")
                .rank;
            final_rank = Some(rank);
            reward += terminal_reward(rank, engine.teams().len());
        }

        Ok(StepOutcome {
            observation: engine.observe(CONTROLLED),
            reward,
            terminated,
            info: StepInfo {
                round: engine.round(),
                substitutions: self.substitutions,
                abandoned: engine.abandoned(),
                final_rank,
            },
        })
    }

    fn current_engine(&self) -> &RaceEngine {
        self.engine.as_ref().expect("call reset() before step()")
    }

    fn controlled_progress(&self) -> usize {
        let engine = self.current_engine();
        engine.teams()[CONTROLLED.index()]
            .riders
            .iter()
            .map(|&rid| engine.track().position_of(rid).unwrap_or(0))
            .sum()
    }

    /// Drive opponent decision points until it is the controlled team's
    /// turn again or the race ends.
    fn advance_opponents(&mut self) -> Result<(), RaceError> {
        loop {
            let engine = self.engine.as_mut().expect("engine exists");
            let Some(decision) = engine.current_decision().copied() else {
                return Ok(());
            };
            if decision.team == CONTROLLED {
                return Ok(());
            }

            let obs = engine.observe(decision.team);
            let agent = &mut self.opponents[decision.team.index() - 1];
            let choice = match decision.kind {
                DecisionKind::ChooseRider => Choice::Rider(agent.choose_rider(&obs)),
                DecisionKind::ChooseCard { pair, .. } => {
                    Choice::Card(agent.choose_card(&obs, &pair))
                }
            };

            match engine.submit(choice) {
                Ok(_) => {}
                Err(RaceError::InvalidAction { team, reason })
                    if self.config.invalid_action_policy == InvalidActionPolicy::FirstLegal =>
                {
                    warn!(%team, %reason, "illegal opponent response, substituting");
                    self.substitutions += 1;
                    let fallback = match decision.kind {
                        DecisionKind::ChooseRider => {
                            Choice::Rider(engine.legal_riders(team)[0])
                        }
                        DecisionKind::ChooseCard { pair, .. } => Choice::Card(pair.0[0]),
                    };
                    match engine.submit(fallback) {
                        Ok(_) | Err(RaceError::RaceTimeout { .. }) => {}
                        Err(err) => return Err(err),
                    }
                }
                Err(RaceError::RaceTimeout { .. }) => return Ok(()),
                Err(err) => return Err(err),
            }
        }
    }
}

/// Graded terminal reward: +1 for first place, -1 for last, linear in
/// between.
fn terminal_reward(rank: u32, teams: usize) -> f32 {
    if teams <= 1 {
        return 1.0;
    }
    1.0 - 2.0 * (rank as f32 - 1.0) / (teams as f32 - 1.0)
}
