//! Observable race state, from one team's point of view.
//!
//! Observations carry public information only: every rider's position, the
//! observing team's exact remaining deck composition (a rider's own deck is
//! public to itself), the terrain ahead, and which decision is pending.
//! Opponent deck contents are never included.

use serde::{Deserialize, Serialize};

use crate::cards::MAX_CARD_VALUE;
use crate::riders::{RiderId, RiderType, TeamId};
use crate::track::Terrain;

use super::DecisionKind;

/// Cells of upcoming terrain included per own rider.
pub const TERRAIN_LOOKAHEAD: usize = 8;

/// Own-rider slots in the encoded vector.
pub const ENCODED_OWN_SLOTS: usize = 2;

/// Opponent slots in the encoded vector.
pub const ENCODED_OPPONENT_SLOTS: usize = 10;

/// One of the observing team's riders.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OwnRiderView {
    pub rider: RiderId,
    pub rider_type: RiderType,
    pub cell: usize,
    pub lane: usize,
    pub finished: bool,
    /// The sprint rule will force this rider's next move.
    pub exhaustion_due: bool,
    /// Cards remaining in the draw and discard piles, counted by value.
    pub deck_counts: [u8; MAX_CARD_VALUE as usize + 1],
    /// Fatigue cards accumulated so far.
    pub fatigue_cards: u8,
    /// Terrain of the next [`TERRAIN_LOOKAHEAD`] cells ahead of this rider.
    pub terrain_ahead: Vec<Terrain>,
}

/// A rider on another team: position and archetype, nothing about its deck.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct OpponentView {
    pub rider: RiderId,
    pub team: TeamId,
    pub rider_type: RiderType,
    pub cell: usize,
    pub lane: usize,
    pub finished: bool,
}

/// A snapshot of everything one team may legally observe.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Observation {
    pub round: u32,
    /// The observing team.
    pub team: TeamId,
    /// The decision pending for the observing team, if it is their turn.
    pub decision: Option<DecisionKind>,
    /// The observing team's riders, in team slot order.
    pub own_riders: Vec<OwnRiderView>,
    /// All other riders, in race order (leader first).
    pub opponents: Vec<OpponentView>,
    pub finish_line: usize,
    pub track_len: usize,
}

impl Observation {
    /// The observing team's view of one of its riders.
    #[must_use]
    pub fn own_view(&self, rider: RiderId) -> Option<&OwnRiderView> {
        self.own_riders.iter().find(|v| v.rider == rider)
    }

    /// Own riders still racing, slot order.
    pub fn unfinished_own(&self) -> impl Iterator<Item = &OwnRiderView> {
        self.own_riders.iter().filter(|v| !v.finished)
    }

    /// Flatten to a fixed-length feature vector for network input.
    ///
    /// Layout: round and decision header, then [`ENCODED_OWN_SLOTS`] own
    /// rider blocks, then [`ENCODED_OPPONENT_SLOTS`] opponent blocks, then
    /// track geometry. Absent slots are filled with -1.
    #[must_use]
    pub fn encode(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(Self::encoded_len());

        out.push(self.round as f32);
        let (is_rider, is_card, pair) = match &self.decision {
            Some(DecisionKind::ChooseRider) => (1.0, 0.0, [0.0, 0.0]),
            Some(DecisionKind::ChooseCard { pair, .. }) => (
                0.0,
                1.0,
                [f32::from(pair.0[0].value), f32::from(pair.0[1].value)],
            ),
            None => (0.0, 0.0, [0.0, 0.0]),
        };
        out.push(is_rider);
        out.push(is_card);
        out.extend_from_slice(&pair);

        for slot in 0..ENCODED_OWN_SLOTS {
            match self.own_riders.get(slot) {
                Some(view) => {
                    out.push(1.0);
                    out.push(view.cell as f32);
                    out.push(view.lane as f32);
                    out.push(f32::from(u8::from(view.finished)));
                    out.push(f32::from(u8::from(view.exhaustion_due)));
                    out.extend(view.deck_counts.iter().map(|&c| f32::from(c)));
                    out.push(f32::from(view.fatigue_cards));
                    for i in 0..TERRAIN_LOOKAHEAD {
                        let code = view
                            .terrain_ahead
                            .get(i)
                            .map_or(-1.0, |&t| terrain_code(t));
                        out.push(code);
                    }
                }
                None => {
                    out.push(-1.0);
                    out.extend(std::iter::repeat(-1.0).take(OWN_BLOCK_LEN - 1));
                }
            }
        }

        for slot in 0..ENCODED_OPPONENT_SLOTS {
            match self.opponents.get(slot) {
                Some(view) => {
                    out.push(1.0);
                    out.push(view.cell as f32);
                    out.push(view.lane as f32);
                    out.push(f32::from(u8::from(view.finished)));
                    out.push(f32::from(u8::from(view.rider_type == RiderType::Sprinteur)));
                }
                None => {
                    out.push(-1.0);
                    out.extend(std::iter::repeat(-1.0).take(OPPONENT_BLOCK_LEN - 1));
                }
            }
        }

        out.push(self.finish_line as f32);
        out.push(self.track_len as f32);

        out
    }

    /// Length of the vector returned by [`Observation::encode`].
    #[must_use]
    pub const fn encoded_len() -> usize {
        5 + ENCODED_OWN_SLOTS * OWN_BLOCK_LEN + ENCODED_OPPONENT_SLOTS * OPPONENT_BLOCK_LEN + 2
    }
}

const OWN_BLOCK_LEN: usize = 5 + (MAX_CARD_VALUE as usize + 1) + 1 + TERRAIN_LOOKAHEAD;
const OPPONENT_BLOCK_LEN: usize = 5;

fn terrain_code(terrain: Terrain) -> f32 {
    match terrain {
        Terrain::Flat => 0.0,
        Terrain::Hill => 1.0,
        Terrain::Downhill => 2.0,
        Terrain::Finish => 3.0,
    }
}
