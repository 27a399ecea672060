//! Error kinds for the race engine and environment adapter.
//!
//! Only [`RaceError::InvalidAction`] is locally recoverable (via the
//! fallback policy applied in the runner/adapter layer, never silently
//! inside the engine). Everything else propagates to the caller.

use thiserror::Error;

use crate::riders::{RiderId, TeamId};

/// Errors surfaced by the engine and the environment adapter.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RaceError {
    /// An agent returned an illegal rider or card choice.
    ///
    /// The offending round is never auto-corrected by the engine; callers
    /// may substitute a legal choice per [`InvalidActionPolicy`], and that
    /// substitution is recorded on the round history.
    ///
    /// [`InvalidActionPolicy`]: crate::core::InvalidActionPolicy
    #[error("invalid action for {team}: {reason}")]
    InvalidAction { team: TeamId, reason: String },

    /// Deck bookkeeping broke: fewer than two cards exist across a rider's
    /// draw and discard piles. Structurally impossible in a correct race;
    /// treated as fatal.
    #[error("{rider} holds only {available} card(s) across draw and discard piles")]
    EmptyDeckInvariant { rider: RiderId, available: usize },

    /// The configured round limit was reached. The race is declared
    /// abandoned, not crashed: final ranks are assigned from current
    /// positions before this propagates.
    #[error("race abandoned after {rounds} rounds")]
    RaceTimeout { rounds: u32 },

    /// Invalid configuration values. Raised at engine construction, before
    /// any round runs.
    #[error("invalid configuration: {reason}")]
    Configuration { reason: String },
}

impl RaceError {
    /// Shorthand for a configuration failure.
    pub(crate) fn config(reason: impl Into<String>) -> Self {
        RaceError::Configuration {
            reason: reason.into(),
        }
    }

    /// Shorthand for an illegal agent response.
    pub(crate) fn invalid(team: TeamId, reason: impl Into<String>) -> Self {
        RaceError::InvalidAction {
            team,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = RaceError::invalid(TeamId::new(1), "chose a finished rider");
        assert_eq!(
            err.to_string(),
            "invalid action for Team 1: chose a finished rider"
        );

        let err = RaceError::RaceTimeout { rounds: 200 };
        assert_eq!(err.to_string(), "race abandoned after 200 rounds");
    }
}
