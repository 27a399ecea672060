//! Agent-driven race runner.
//!
//! Pairs an engine with one agent per team and drives the decision loop.
//! Illegal agent responses are handled per the configured
//! [`InvalidActionPolicy`]: either propagated, or replaced with the first
//! legal option — in which case the substitution is logged and recorded,
//! never hidden.

use tracing::warn;

use crate::agents::Agent;
use crate::core::{InvalidActionPolicy, RaceError};
use crate::riders::TeamId;

use super::{Choice, DecisionKind, Phase, RaceEngine, RaceOutcome};

/// A fallback substitution applied to an illegal agent response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Substitution {
    pub round: u32,
    pub team: TeamId,
    pub reason: String,
}

/// An engine plus the agents that answer its decision points.
pub struct Race {
    engine: RaceEngine,
    agents: Vec<Box<dyn Agent>>,
    substitutions: Vec<Substitution>,
}

impl Race {
    /// Pair an engine with one agent per team, in team order.
    pub fn new(engine: RaceEngine, agents: Vec<Box<dyn Agent>>) -> Result<Self, RaceError> {
        if agents.len() != engine.teams().len() {
            return Err(RaceError::config(format!(
                "{} agent(s) supplied for {} team(s)",
                agents.len(),
                engine.teams().len()
            )));
        }
        Ok(Self {
            engine,
            agents,
            substitutions: Vec::new(),
        })
    }

    /// The underlying engine.
    #[must_use]
    pub fn engine(&self) -> &RaceEngine {
        &self.engine
    }

    /// Every substitution applied so far.
    #[must_use]
    pub fn substitutions(&self) -> &[Substitution] {
        &self.substitutions
    }

    /// Drive one decision point through the owning team's agent.
    pub fn play_decision(&mut self) -> Result<Phase, RaceError> {
        let Some(decision) = self.engine.current_decision().copied() else {
            return Ok(Phase::Finished);
        };
        let obs = self.engine.observe(decision.team);
        let agent = &mut self.agents[decision.team.index()];

        let choice = match decision.kind {
            DecisionKind::ChooseRider => Choice::Rider(agent.choose_rider(&obs)),
            DecisionKind::ChooseCard { pair, .. } => Choice::Card(agent.choose_card(&obs, &pair)),
        };

        match self.engine.submit(choice) {
            Err(RaceError::InvalidAction { team, reason })
                if self.engine.config().invalid_action_policy == InvalidActionPolicy::FirstLegal =>
            {
                warn!(%team, %reason, "illegal agent response, substituting first legal choice");
                let fallback = match decision.kind {
                    DecisionKind::ChooseRider => Choice::Rider(self.engine.legal_riders(team)[0]),
                    DecisionKind::ChooseCard { pair, .. } => Choice::Card(pair.0[0]),
                };
                self.substitutions.push(Substitution {
                    round: decision.round,
                    team,
                    reason,
                });
                self.engine.submit(fallback)
            }
            other => other,
        }
    }

    /// Play until the current round resolves or the race ends.
    pub fn play_round(&mut self) -> Result<Phase, RaceError> {
        let round = self.engine.round();
        while self.engine.phase() != Phase::Finished && self.engine.round() == round {
            self.play_decision()?;
        }
        Ok(self.engine.phase())
    }

    /// Play to the end.
    ///
    /// A round-limit abandonment is not an error at this level: the
    /// outcome comes back with its `abandoned` flag set. Everything else
    /// propagates.
    pub fn run(&mut self) -> Result<RaceOutcome, RaceError> {
        loop {
            match self.play_decision() {
                Ok(Phase::Finished) => break,
                Ok(_) => {}
                Err(RaceError::RaceTimeout { .. }) => break,
                Err(err) => return Err(err),
            }
        }
        Ok(self.engine.outcome().expect("race just finished"))
    }
}
