//! Learned-policy adapter.
//!
//! A [`Policy`] is an opaque action-selection function over the discrete
//! environment action space. [`PolicyAgent`] wraps one behind the
//! [`Agent`] contract so a trained policy can race exactly like a scripted
//! bot. Out-of-protocol selections are mapped best-effort and logged; a
//! selection the engine still finds illegal surfaces through the normal
//! rejection path.

use tracing::warn;

use crate::cards::{Card, DrawnPair};
use crate::engine::Observation;
use crate::env::EnvAction;
use crate::riders::RiderId;

use super::Agent;

/// An opaque decision function over the discrete action space.
pub trait Policy {
    /// Select one of the legal actions for this decision point.
    fn select(&mut self, obs: &Observation, legal: &[EnvAction]) -> EnvAction;
}

// Closures work as throwaway policies in tests and evaluation scripts.
impl<F> Policy for F
where
    F: FnMut(&Observation, &[EnvAction]) -> EnvAction,
{
    fn select(&mut self, obs: &Observation, legal: &[EnvAction]) -> EnvAction {
        self(obs, legal)
    }
}

/// Drives both per-round decisions through an external policy.
#[derive(Clone, Debug)]
pub struct PolicyAgent<P> {
    policy: P,
}

impl<P: Policy> PolicyAgent<P> {
    /// Wrap a policy as an agent.
    pub fn new(policy: P) -> Self {
        Self { policy }
    }

    /// The wrapped policy.
    pub fn policy(&self) -> &P {
        &self.policy
    }
}

impl<P: Policy> Agent for PolicyAgent<P> {
    fn choose_rider(&mut self, obs: &Observation) -> RiderId {
        let legal = EnvAction::legal(obs);
        let slot = match self.policy.select(obs, &legal) {
            EnvAction::RiderA => 0,
            EnvAction::RiderB => 1,
            other => {
                warn!(?other, "policy answered a rider decision with a card action");
                0
            }
        };
        obs.own_riders
            .get(slot)
            .or_else(|| obs.own_riders.first())
            .expect("a consulted team has riders")
            .rider
    }

    fn choose_card(&mut self, obs: &Observation, pair: &DrawnPair) -> Card {
        let legal = EnvAction::legal(obs);
        match self.policy.select(obs, &legal) {
            EnvAction::CardFirst => pair.0[0],
            EnvAction::CardSecond => pair.0[1],
            other => {
                warn!(?other, "policy answered a card decision with a rider action");
                pair.0[0]
            }
        }
    }
}
