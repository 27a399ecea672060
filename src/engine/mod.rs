//! The race engine: a step-wise, resumable state machine.
//!
//! ## Decision points
//!
//! The engine never calls agents. It pauses at well-defined decision
//! points — [`current_decision`] says what is needed, [`submit`] supplies
//! it — and resumes synchronously. Scripted play, human play, and training
//! loops all drive the same two methods, so every consumer observes
//! identical semantics.
//!
//! ## Round structure
//!
//! Each round, every team with an unfinished rider acts once, in stable
//! team order: choose a rider, then (unless a forced fatigue draw applies)
//! choose one of two drawn cards. The chosen rider moves immediately to its
//! provisional cell. Once every team has acted the round resolves:
//! slipstream to a fixed point, exhaustion bookkeeping, finish detection,
//! round advance.
//!
//! [`current_decision`]: RaceEngine::current_decision
//! [`submit`]: RaceEngine::submit

mod observation;
mod runner;

pub use observation::{
    Observation, OpponentView, OwnRiderView, ENCODED_OPPONENT_SLOTS, ENCODED_OWN_SLOTS,
    TERRAIN_LOOKAHEAD,
};
pub use runner::{Race, Substitution};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cards::{Card, Deck, DrawnPair};
use crate::core::{RaceConfig, RaceError, RaceRng, RaceRngState, TeamScoring};
use crate::riders::{Rider, RiderId, RiderType, Team, TeamId, TeamSpec};
use crate::track::{Terrain, Track};

/// Lifecycle of a race.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Riders are being placed; no decision is pending yet.
    Setup,
    /// Teams are choosing riders and cards.
    RoundInProgress,
    /// All teams have acted; slipstream and exhaustion are being applied.
    RoundResolved,
    /// Every rider has finished, or the race was abandoned.
    Finished,
}

/// What the engine is waiting for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionKind {
    /// Pick one of the team's unfinished riders to move this round.
    ChooseRider,
    /// Pick one of the two cards drawn for the chosen rider.
    ChooseCard { rider: RiderId, pair: DrawnPair },
}

/// A pending decision: which team must answer, and what is being asked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionPoint {
    pub team: TeamId,
    pub kind: DecisionKind,
    pub round: u32,
}

/// An answer to a pending decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Choice {
    Rider(RiderId),
    Card(Card),
}

/// One rider's movement in a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub round: u32,
    pub team: TeamId,
    pub rider: RiderId,
    pub card: Card,
    /// Card value after terrain adjustment.
    pub adjusted: u8,
    pub from: usize,
    pub to: usize,
    /// The move was a forced fatigue draw; the agent chose no card.
    pub forced: bool,
}

/// A rider pulled forward by drafting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlipstreamPull {
    pub rider: RiderId,
    pub from: usize,
    pub to: usize,
}

/// Everything that happened in one round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round: u32,
    pub moves: Vec<MoveRecord>,
    pub slipstream: Vec<SlipstreamPull>,
    /// Riders who took a pack-front fatigue card this round.
    pub exhausted: Vec<RiderId>,
    /// Riders who crossed the line this round, best rank first.
    pub finished: Vec<RiderId>,
}

/// A team's final placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamStanding {
    pub team: TeamId,
    pub rank: u32,
}

/// Final result of a race.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceOutcome {
    /// Every rider with its finish rank, best first.
    pub rider_ranks: Vec<(RiderId, u32)>,
    /// Teams ordered by final rank.
    pub standings: Vec<TeamStanding>,
    pub rounds_played: u32,
    /// The race hit the round limit and was declared abandoned.
    pub abandoned: bool,
}

/// Serializable capture of the full race state, for checkpointing and
/// bit-exact reproducibility checks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RaceSnapshot {
    pub round: u32,
    pub phase: Phase,
    pub riders: Vec<Rider>,
    /// (rider, cell, lane) for every placed rider.
    pub positions: Vec<(RiderId, usize, usize)>,
    pub rng: RaceRngState,
    pub abandoned: bool,
}

/// The race engine. Owns all mutable race state and the RNG.
#[derive(Clone, Debug)]
pub struct RaceEngine {
    config: RaceConfig,
    track: Track,
    teams: Vec<Team>,
    riders: Vec<Rider>,
    rng: RaceRng,
    phase: Phase,
    round: u32,
    turn_order: Vec<TeamId>,
    cursor: usize,
    pending: Option<DecisionPoint>,
    current_moves: Vec<MoveRecord>,
    history: Vec<RoundRecord>,
    next_rank: u32,
    abandoned: bool,
}

impl RaceEngine {
    /// Build a race: validate configuration, deal and shuffle decks, place
    /// riders in the start zone, and open round 1.
    ///
    /// Riders are placed team by team, Sprinteur first, each taking the
    /// furthest free start cell.
    pub fn new(
        track: Track,
        specs: Vec<TeamSpec>,
        config: RaceConfig,
    ) -> Result<Self, RaceError> {
        config.validate()?;
        if specs.is_empty() {
            return Err(RaceError::config("a race needs at least one team"));
        }

        let mut rng = RaceRng::new(config.rng_seed);
        let mut teams = Vec::with_capacity(specs.len());
        let mut riders = Vec::new();

        for (team_idx, spec) in specs.into_iter().enumerate() {
            if spec.riders.is_empty() {
                return Err(RaceError::config(format!(
                    "team '{}' has no riders",
                    spec.name
                )));
            }
            let team_id = TeamId::new(team_idx as u8);
            let mut member_ids = Vec::with_capacity(spec.riders.len());
            for rider_type in spec.riders {
                let rider_id = RiderId::new(riders.len() as u8);
                let deck = Deck::new(rider_type.starting_deck(), &mut rng);
                riders.push(Rider::new(rider_id, team_id, rider_type, deck));
                member_ids.push(rider_id);
            }
            teams.push(Team {
                id: team_id,
                name: spec.name,
                riders: member_ids,
            });
        }

        let mut track = track;
        let zone_end = config.start_zone.min(track.finish_line());
        for team in &teams {
            let mut order = team.riders.clone();
            order.sort_by_key(|rid| riders[rid.index()].rider_type != RiderType::Sprinteur);
            for rid in order {
                let cell = (0..zone_end)
                    .rev()
                    .find(|&c| track.occupants(c).len() < track.lanes_at(c))
                    .ok_or_else(|| RaceError::config("start zone cannot hold the field"))?;
                track.place_start(rid, cell)?;
            }
        }

        let mut engine = Self {
            config,
            track,
            teams,
            riders,
            rng,
            phase: Phase::Setup,
            round: 1,
            turn_order: Vec::new(),
            cursor: 0,
            pending: None,
            current_moves: Vec::new(),
            history: Vec::new(),
            next_rank: 1,
            abandoned: false,
        };
        engine.begin_round();
        Ok(engine)
    }

    // === Accessors ===

    /// The race configuration.
    #[must_use]
    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    /// The track, with live occupancy.
    #[must_use]
    pub fn track(&self) -> &Track {
        &self.track
    }

    /// All teams, in stable order.
    #[must_use]
    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    /// All riders, indexed by [`RiderId`].
    #[must_use]
    pub fn riders(&self) -> &[Rider] {
        &self.riders
    }

    /// One rider.
    #[must_use]
    pub fn rider(&self, id: RiderId) -> &Rider {
        &self.riders[id.index()]
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current round, 1-based.
    #[must_use]
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Resolved rounds so far.
    #[must_use]
    pub fn history(&self) -> &[RoundRecord] {
        &self.history
    }

    /// True once the round limit abandoned the race.
    #[must_use]
    pub fn abandoned(&self) -> bool {
        self.abandoned
    }

    /// The decision the engine is waiting on, or `None` when finished.
    #[must_use]
    pub fn current_decision(&self) -> Option<&DecisionPoint> {
        self.pending.as_ref()
    }

    /// The riders a team may legally choose this round.
    #[must_use]
    pub fn legal_riders(&self, team: TeamId) -> Vec<RiderId> {
        self.teams[team.index()]
            .riders
            .iter()
            .copied()
            .filter(|rid| !self.riders[rid.index()].finished)
            .collect()
    }

    // === Decision protocol ===

    /// Answer the pending decision.
    ///
    /// Illegal choices (a finished rider, a rider from another team, a card
    /// not among the two drawn, or the wrong kind of answer) are rejected
    /// with [`RaceError::InvalidAction`] and the engine stays at the same
    /// decision point — nothing is auto-corrected here.
    ///
    /// Completing the last team's move resolves the round; if that hits the
    /// round limit the race is finalized from current positions and
    /// [`RaceError::RaceTimeout`] is returned (the outcome stays readable).
    ///
    /// # Panics
    ///
    /// Panics if no decision is pending; check [`Self::current_decision`].
    pub fn submit(&mut self, choice: Choice) -> Result<Phase, RaceError> {
        let pending = self
            .pending
            .expect("no decision pending; check current_decision() first");

        match (pending.kind, choice) {
            (DecisionKind::ChooseRider, Choice::Rider(rider)) => {
                self.submit_rider(pending.team, rider)
            }
            (DecisionKind::ChooseCard { rider, pair }, Choice::Card(card)) => {
                self.submit_card(pending.team, rider, pair, card)
            }
            (DecisionKind::ChooseRider, Choice::Card(_)) => Err(RaceError::invalid(
                pending.team,
                "expected a rider choice, got a card",
            )),
            (DecisionKind::ChooseCard { .. }, Choice::Rider(_)) => Err(RaceError::invalid(
                pending.team,
                "expected a card choice, got a rider",
            )),
        }
    }

    fn submit_rider(&mut self, team: TeamId, rider_id: RiderId) -> Result<Phase, RaceError> {
        if !self.teams[team.index()].riders.contains(&rider_id) {
            return Err(RaceError::invalid(
                team,
                format!("{rider_id} belongs to another team"),
            ));
        }
        if self.riders[rider_id.index()].finished {
            return Err(RaceError::invalid(
                team,
                format!("{rider_id} has already finished"),
            ));
        }

        if self.riders[rider_id.index()].exhaustion_due {
            let card = self.riders[rider_id.index()].deck.force_exhaustion();
            self.riders[rider_id.index()].exhaustion_due = false;
            self.riders[rider_id.index()].sprint_streak = 0;
            info!(rider = %rider_id, "forced onto a fatigue card");
            self.apply_move(team, rider_id, card, true);
            return self.advance_cursor();
        }

        let available = self.riders[rider_id.index()].deck.total_cards();
        let pair = self.riders[rider_id.index()]
            .deck
            .draw_two(&mut self.rng)
            .ok_or(RaceError::EmptyDeckInvariant {
                rider: rider_id,
                available,
            })?;
        self.riders[rider_id.index()].hand = Some(pair);
        self.pending = Some(DecisionPoint {
            team,
            kind: DecisionKind::ChooseCard {
                rider: rider_id,
                pair,
            },
            round: self.round,
        });
        Ok(self.phase)
    }

    fn submit_card(
        &mut self,
        team: TeamId,
        rider_id: RiderId,
        pair: DrawnPair,
        card: Card,
    ) -> Result<Phase, RaceError> {
        if !pair.contains(card) {
            return Err(RaceError::invalid(
                team,
                format!("card {card} is not among the two drawn"),
            ));
        }
        let other = pair.other(card).expect("membership checked above");

        let rider = &mut self.riders[rider_id.index()];
        rider.hand = None;
        rider.deck.discard(other);

        if card.value >= self.config.sprint_value {
            rider.sprint_streak += 1;
            if rider.sprint_streak >= self.config.sprint_streak_limit {
                rider.exhaustion_due = true;
                debug!(rider = %rider_id, streak = rider.sprint_streak, "sprint streak hit the limit");
            }
        } else {
            rider.sprint_streak = 0;
        }

        self.apply_move(team, rider_id, card, false);
        self.advance_cursor()
    }

    fn apply_move(&mut self, team: TeamId, rider_id: RiderId, card: Card, forced: bool) {
        let from = self
            .track
            .position_of(rider_id)
            .expect("every rider is placed at setup");
        let terrain = self.track.terrain_at(from);
        let rider_type = self.riders[rider_id.index()].rider_type;
        let adjusted = adjusted_movement(&self.config, rider_type, terrain, card.value);

        let to = self.track.place_rider(rider_id, from + adjusted as usize);
        if !forced {
            // The chosen card reaches the discard pile only after use; a
            // forced fatigue card is already there.
            self.riders[rider_id.index()].deck.discard(card);
        }

        info!(
            rider = %rider_id,
            %card,
            adjusted,
            from,
            to,
            "move applied"
        );
        self.current_moves.push(MoveRecord {
            round: self.round,
            team,
            rider: rider_id,
            card,
            adjusted,
            from,
            to,
            forced,
        });
    }

    fn advance_cursor(&mut self) -> Result<Phase, RaceError> {
        self.pending = None;
        self.cursor += 1;
        if self.cursor < self.turn_order.len() {
            self.pending = Some(DecisionPoint {
                team: self.turn_order[self.cursor],
                kind: DecisionKind::ChooseRider,
                round: self.round,
            });
            Ok(self.phase)
        } else {
            self.resolve_round()
        }
    }

    // === Round resolution ===

    fn resolve_round(&mut self) -> Result<Phase, RaceError> {
        self.phase = Phase::RoundResolved;

        let slipstream = self.resolve_slipstream();
        let exhausted = self.apply_front_exhaustion();
        let finished = self.detect_finishers();

        let record = RoundRecord {
            round: self.round,
            moves: std::mem::take(&mut self.current_moves),
            slipstream,
            exhausted,
            finished,
        };
        info!(
            round = record.round,
            moves = record.moves.len(),
            pulls = record.slipstream.len(),
            "round resolved"
        );
        self.history.push(record);

        if self.riders.iter().all(|r| r.finished) {
            self.phase = Phase::Finished;
            return Ok(self.phase);
        }

        if self.round >= self.config.max_rounds {
            self.abandon();
            return Err(RaceError::RaceTimeout { rounds: self.round });
        }

        self.round += 1;
        self.begin_round();
        Ok(self.phase)
    }

    fn begin_round(&mut self) {
        self.turn_order = self
            .teams
            .iter()
            .filter(|t| {
                t.riders
                    .iter()
                    .any(|rid| !self.riders[rid.index()].finished)
            })
            .map(|t| t.id)
            .collect();
        self.cursor = 0;
        self.phase = Phase::RoundInProgress;
        self.pending = Some(DecisionPoint {
            team: self.turn_order[0],
            kind: DecisionKind::ChooseRider,
            round: self.round,
        });
    }

    /// Pull drafting groups forward until no gap closes any more.
    ///
    /// Scanning back to front, a group whose front rider sits `gap` empty
    /// cells behind the next group (with `max_gap < gap <= window`) snaps
    /// forward by `gap`, the whole group together, front rider first. The
    /// scan restarts after every shift so chains pull chains; a rider never
    /// moves backward and never past the race leader, who has nobody ahead.
    fn resolve_slipstream(&mut self) -> Vec<SlipstreamPull> {
        let window = self.config.slipstream_window as usize;
        let max_gap = self.config.slipstream_max_gap as usize;
        let mut pulls = Vec::new();

        loop {
            let occupied = self.track.occupied_cells();
            let mut moved = false;

            for idx in 0..occupied.len().saturating_sub(1) {
                let cell = occupied[idx];
                let ahead = self.track.riders_within_window(cell + 1, window);
                let Some(&first_ahead) = ahead.first() else {
                    continue;
                };
                let next = self
                    .track
                    .position_of(first_ahead)
                    .expect("windowed riders are placed");
                let gap = self.track.cell_distance(cell, next) - 1;
                if gap <= max_gap {
                    continue;
                }
                if !self.slipstream_legal(cell, next) {
                    continue;
                }

                // Trailing group: maximal run ending here whose internal
                // gaps stay within max_gap on draft-legal terrain.
                let mut start_idx = idx;
                while start_idx > 0 {
                    let prev = occupied[start_idx - 1];
                    let inner_gap = occupied[start_idx] - prev - 1;
                    if inner_gap <= max_gap && self.slipstream_legal(prev, occupied[start_idx]) {
                        start_idx -= 1;
                    } else {
                        break;
                    }
                }

                for &group_cell in occupied[start_idx..=idx].iter().rev() {
                    for rider in self.track.occupants(group_cell).to_vec() {
                        let dest =
                            self.track
                                .place_at_or_behind(rider, group_cell + gap, group_cell);
                        if dest > group_cell {
                            info!(rider = %rider, from = group_cell, to = dest, "slipstream");
                            pulls.push(SlipstreamPull {
                                rider,
                                from: group_cell,
                                to: dest,
                            });
                        }
                    }
                }

                moved = true;
                break;
            }

            if !moved {
                return pulls;
            }
        }
    }

    fn slipstream_legal(&self, from: usize, to: usize) -> bool {
        (from..=to).all(|c| self.track.terrain_at(c).allows_slipstream())
    }

    /// Base-game pack-front fatigue: every rider with an empty cell
    /// directly ahead (before the finish line) takes a fatigue card into
    /// its discard pile.
    fn apply_front_exhaustion(&mut self) -> Vec<RiderId> {
        if !self.config.front_exhaustion {
            return Vec::new();
        }

        let mut out = Vec::new();
        for cell in 0..self.track.finish_line() {
            if self.track.occupants(cell).is_empty() || !self.track.occupants(cell + 1).is_empty()
            {
                continue;
            }
            for rider in self.track.occupants(cell).to_vec() {
                self.riders[rider.index()].deck.discard(Card::fatigue());
                info!(rider = %rider, cell, "uncovered at the front, takes a fatigue card");
                out.push(rider);
            }
        }
        out
    }

    /// Mark riders at or past the line as finished and assign ranks.
    ///
    /// Same-round arrivals rank by further cell, then stable team order,
    /// then team slot — the cell model has no sub-cell resolution to
    /// separate riders stacked in one cell.
    fn detect_finishers(&mut self) -> Vec<RiderId> {
        let finish = self.track.finish_line();
        let mut crossed: Vec<(usize, usize, usize, RiderId)> = Vec::new();

        for rider in &self.riders {
            if rider.finished {
                continue;
            }
            let cell = self
                .track
                .position_of(rider.id)
                .expect("every rider is placed at setup");
            if cell >= finish {
                let team_idx = rider.team.index();
                let slot = self.teams[team_idx]
                    .riders
                    .iter()
                    .position(|&r| r == rider.id)
                    .expect("rider listed on its team");
                crossed.push((cell, team_idx, slot, rider.id));
            }
        }

        crossed.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));

        let mut out = Vec::with_capacity(crossed.len());
        for (_, _, _, rider_id) in crossed {
            let rank = self.next_rank;
            self.next_rank += 1;
            let rider = &mut self.riders[rider_id.index()];
            rider.finished = true;
            rider.rank = Some(rank);
            info!(rider = %rider_id, rank, "crossed the line");
            out.push(rider_id);
        }
        out
    }

    /// Round limit reached: assign ranks from current positions and close
    /// the race.
    fn abandon(&mut self) {
        self.abandoned = true;
        let standing: Vec<RiderId> = self
            .track
            .riders()
            .filter(|rid| !self.riders[rid.index()].finished)
            .collect();
        for rider_id in standing {
            let rank = self.next_rank;
            self.next_rank += 1;
            self.riders[rider_id.index()].rank = Some(rank);
        }
        self.pending = None;
        self.phase = Phase::Finished;
        info!(round = self.round, "race abandoned at the round limit");
    }

    // === Results ===

    /// Final result, once the race is finished or abandoned.
    #[must_use]
    pub fn outcome(&self) -> Option<RaceOutcome> {
        if self.phase != Phase::Finished {
            return None;
        }

        let mut rider_ranks: Vec<(RiderId, u32)> = self
            .riders
            .iter()
            .map(|r| (r.id, r.rank.expect("every rider is ranked at race end")))
            .collect();
        rider_ranks.sort_by_key(|&(_, rank)| rank);

        let mut scored: Vec<(u32, TeamId)> = self
            .teams
            .iter()
            .map(|team| {
                let ranks = team
                    .riders
                    .iter()
                    .map(|rid| self.riders[rid.index()].rank.expect("ranked"));
                let score = match self.config.team_scoring {
                    TeamScoring::BestRider => ranks.min(),
                    TeamScoring::WorstRider => ranks.max(),
                };
                (score.expect("teams are non-empty"), team.id)
            })
            .collect();
        scored.sort();

        let standings = scored
            .into_iter()
            .enumerate()
            .map(|(i, (_, team))| TeamStanding {
                team,
                rank: i as u32 + 1,
            })
            .collect();

        Some(RaceOutcome {
            rider_ranks,
            standings,
            rounds_played: self.history.len() as u32,
            abandoned: self.abandoned,
        })
    }

    /// Capture the full race state for checkpointing or replay checks.
    #[must_use]
    pub fn snapshot(&self) -> RaceSnapshot {
        let positions = self
            .riders
            .iter()
            .map(|r| {
                (
                    r.id,
                    self.track.position_of(r.id).expect("placed"),
                    self.track.lane_of(r.id).expect("placed"),
                )
            })
            .collect();
        RaceSnapshot {
            round: self.round,
            phase: self.phase,
            riders: self.riders.clone(),
            positions,
            rng: self.rng.state(),
            abandoned: self.abandoned,
        }
    }

    // === Observations ===

    /// What `team` may observe right now.
    ///
    /// The pending decision is included only when it belongs to `team`;
    /// opponent deck contents are never included.
    #[must_use]
    pub fn observe(&self, team: TeamId) -> Observation {
        let own_riders = self.teams[team.index()]
            .riders
            .iter()
            .map(|&rid| {
                let rider = &self.riders[rid.index()];
                let cell = self.track.position_of(rid).expect("placed");
                OwnRiderView {
                    rider: rid,
                    rider_type: rider.rider_type,
                    cell,
                    lane: self.track.lane_of(rid).expect("placed"),
                    finished: rider.finished,
                    exhaustion_due: rider.exhaustion_due,
                    deck_counts: rider.deck.value_counts(),
                    fatigue_cards: rider.deck.fatigue_count() as u8,
                    terrain_ahead: (1..=TERRAIN_LOOKAHEAD)
                        .map(|d| self.track.terrain_at(cell + d))
                        .collect(),
                }
            })
            .collect();

        let opponents = self
            .track
            .riders()
            .filter(|rid| self.riders[rid.index()].team != team)
            .map(|rid| {
                let rider = &self.riders[rid.index()];
                OpponentView {
                    rider: rid,
                    team: rider.team,
                    rider_type: rider.rider_type,
                    cell: self.track.position_of(rid).expect("placed"),
                    lane: self.track.lane_of(rid).expect("placed"),
                    finished: rider.finished,
                }
            })
            .collect();

        Observation {
            round: self.round,
            team,
            decision: self
                .pending
                .filter(|p| p.team == team)
                .map(|p| p.kind),
            own_riders,
            opponents,
            finish_line: self.track.finish_line(),
            track_len: self.track.len(),
        }
    }
}

/// Card value after terrain adjustment at the rider's current cell.
fn adjusted_movement(
    config: &RaceConfig,
    rider_type: RiderType,
    terrain: Terrain,
    value: u8,
) -> u8 {
    match terrain {
        Terrain::Hill if rider_type == RiderType::Sprinteur => {
            value.min(config.hill_sprinteur_cap)
        }
        Terrain::Downhill => value.max(config.downhill_minimum),
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::Segment;

    fn flat_track(cells: usize) -> Track {
        Track::new(vec![Segment::flat(cells), Segment::finish(3)]).unwrap()
    }

    fn two_team_engine(seed: u64) -> RaceEngine {
        RaceEngine::new(
            flat_track(30),
            vec![TeamSpec::regular("Blue"), TeamSpec::regular("Red")],
            RaceConfig::new().with_seed(seed),
        )
        .unwrap()
    }

    #[test]
    fn test_setup_places_everyone() {
        let engine = two_team_engine(42);
        assert_eq!(engine.phase(), Phase::RoundInProgress);
        assert_eq!(engine.round(), 1);
        for rider in engine.riders() {
            let cell = engine.track().position_of(rider.id).unwrap();
            assert!(cell < engine.config().start_zone);
        }
    }

    #[test]
    fn test_first_decision_is_first_team_rider_choice() {
        let engine = two_team_engine(42);
        let decision = engine.current_decision().unwrap();
        assert_eq!(decision.team, TeamId::new(0));
        assert_eq!(decision.kind, DecisionKind::ChooseRider);
    }

    #[test]
    fn test_rejects_rider_from_other_team() {
        let mut engine = two_team_engine(42);
        let foreign = engine.teams()[1].riders[0];
        let err = engine.submit(Choice::Rider(foreign)).unwrap_err();
        assert!(matches!(err, RaceError::InvalidAction { .. }));
        // The decision point is unchanged.
        assert_eq!(
            engine.current_decision().unwrap().kind,
            DecisionKind::ChooseRider
        );
    }

    #[test]
    fn test_rejects_wrong_choice_kind() {
        let mut engine = two_team_engine(42);
        let err = engine.submit(Choice::Card(Card::normal(4))).unwrap_err();
        assert!(matches!(err, RaceError::InvalidAction { .. }));
    }

    #[test]
    fn test_rider_choice_deals_two_cards() {
        let mut engine = two_team_engine(42);
        let rider = engine.teams()[0].riders[0];
        engine.submit(Choice::Rider(rider)).unwrap();

        match engine.current_decision().unwrap().kind {
            DecisionKind::ChooseCard { rider: chosen, pair } => {
                assert_eq!(chosen, rider);
                assert_eq!(engine.rider(rider).deck.total_cards(), 13);
                assert!(pair.higher() >= pair.lower());
            }
            DecisionKind::ChooseRider => panic!("expected a card decision"),
        }
    }

    #[test]
    fn test_rejects_card_not_drawn() {
        let mut engine = two_team_engine(42);
        let rider = engine.teams()[0].riders[0];
        engine.submit(Choice::Rider(rider)).unwrap();

        let pair = match engine.current_decision().unwrap().kind {
            DecisionKind::ChooseCard { pair, .. } => pair,
            DecisionKind::ChooseRider => unreachable!(),
        };
        // A Rouleur never holds an 8, and certainly not a fatigue 8.
        let bogus = Card::normal(8);
        assert!(!pair.contains(bogus));
        let err = engine.submit(Choice::Card(bogus)).unwrap_err();
        assert!(matches!(err, RaceError::InvalidAction { .. }));
    }

    #[test]
    fn test_move_applies_card_value_on_flat() {
        let mut engine = two_team_engine(42);
        let rider = engine.teams()[0].riders[0];
        let from = engine.track().position_of(rider).unwrap();

        engine.submit(Choice::Rider(rider)).unwrap();
        let pair = match engine.current_decision().unwrap().kind {
            DecisionKind::ChooseCard { pair, .. } => pair,
            DecisionKind::ChooseRider => unreachable!(),
        };
        engine.submit(Choice::Card(pair.higher())).unwrap();

        let to = engine.track().position_of(rider).unwrap();
        // Lane overflow can push one cell further, never backward.
        assert!(to >= from + pair.higher().value as usize);
    }

    #[test]
    fn test_terrain_adjustment() {
        let config = RaceConfig::default();
        // Sprinteur capped on hills, Rouleur untouched.
        assert_eq!(
            adjusted_movement(&config, RiderType::Sprinteur, Terrain::Hill, 9),
            5
        );
        assert_eq!(
            adjusted_movement(&config, RiderType::Rouleur, Terrain::Hill, 7),
            7
        );
        // Downhill floor for everyone.
        assert_eq!(
            adjusted_movement(&config, RiderType::Rouleur, Terrain::Downhill, 3),
            5
        );
        assert_eq!(
            adjusted_movement(&config, RiderType::Sprinteur, Terrain::Flat, 9),
            9
        );
    }

    #[test]
    fn test_round_advances_after_all_teams_act() {
        let mut engine = two_team_engine(42);
        assert_eq!(engine.round(), 1);

        for _ in 0..2 {
            let decision = *engine.current_decision().unwrap();
            let rider = engine.legal_riders(decision.team)[0];
            engine.submit(Choice::Rider(rider)).unwrap();
            let pair = match engine.current_decision().unwrap().kind {
                DecisionKind::ChooseCard { pair, .. } => pair,
                DecisionKind::ChooseRider => unreachable!(),
            };
            engine.submit(Choice::Card(pair.higher())).unwrap();
        }

        assert_eq!(engine.round(), 2);
        assert_eq!(engine.history().len(), 1);
        assert_eq!(engine.history()[0].moves.len(), 2);
    }

    #[test]
    fn test_observation_hides_opponent_decks() {
        let mut engine = two_team_engine(42);
        let rider = engine.teams()[0].riders[0];
        engine.submit(Choice::Rider(rider)).unwrap();

        let obs = engine.observe(TeamId::new(0));
        assert!(obs.decision.is_some());
        assert_eq!(obs.own_riders.len(), 2);
        assert_eq!(obs.opponents.len(), 2);

        // The other team sees positions but no pending decision.
        let other = engine.observe(TeamId::new(1));
        assert!(other.decision.is_none());
    }

    fn solo_engine(track: Track, teams: usize, config: RaceConfig) -> RaceEngine {
        let specs = (0..teams)
            .map(|i| TeamSpec::solo(format!("Solo {i}"), RiderType::Rouleur))
            .collect();
        RaceEngine::new(track, specs, config).unwrap()
    }

    #[test]
    fn test_slipstream_pulls_chains_to_a_fixed_point() {
        let mut engine = solo_engine(flat_track(30), 3, RaceConfig::new().with_seed(1));
        let (r0, r1, r2) = (RiderId::new(0), RiderId::new(1), RiderId::new(2));

        engine.track.place_rider(r0, 10);
        engine.track.place_rider(r1, 8);
        engine.track.place_rider(r2, 6);

        let pulls = engine.resolve_slipstream();

        // The rear rider closes onto the middle one, then the pair closes
        // onto the leader, who never moves.
        assert_eq!(engine.track.position_of(r0), Some(10));
        assert_eq!(engine.track.position_of(r1), Some(9));
        assert_eq!(engine.track.position_of(r2), Some(8));
        assert_eq!(pulls.len(), 3);

        // Re-running resolution on a resolved state is a no-op.
        assert!(engine.resolve_slipstream().is_empty());
    }

    #[test]
    fn test_slipstream_ignores_gaps_beyond_the_window() {
        let mut engine = solo_engine(flat_track(30), 2, RaceConfig::new().with_seed(1));
        let (r0, r1) = (RiderId::new(0), RiderId::new(1));

        engine.track.place_rider(r0, 12);
        engine.track.place_rider(r1, 9);

        assert!(engine.resolve_slipstream().is_empty());
        assert_eq!(engine.track.position_of(r1), Some(9));
    }

    #[test]
    fn test_slipstream_blocked_on_hills() {
        let track = Track::new(vec![
            Segment::flat(10),
            Segment::hill(5),
            Segment::flat(10),
            Segment::finish(3),
        ])
        .unwrap();
        let mut engine = solo_engine(track, 2, RaceConfig::new().with_seed(1));
        let (r0, r1) = (RiderId::new(0), RiderId::new(1));

        // Leader on the climb, chaser one empty cell behind on the flat:
        // no draft into or on a hill.
        engine.track.place_rider(r0, 11);
        engine.track.place_rider(r1, 9);

        assert!(engine.resolve_slipstream().is_empty());
        assert_eq!(engine.track.position_of(r1), Some(9));
    }

    #[test]
    fn test_slipstream_group_shares_one_pull() {
        let mut engine = solo_engine(flat_track(30), 3, RaceConfig::new().with_seed(1));
        let (r0, r1, r2) = (RiderId::new(0), RiderId::new(1), RiderId::new(2));

        // A two-rider group trailing the leader by one empty cell moves as
        // one, keeping its internal spacing.
        engine.track.place_rider(r0, 12);
        engine.track.place_rider(r1, 10);
        engine.track.place_rider(r2, 9);

        engine.resolve_slipstream();

        assert_eq!(engine.track.position_of(r0), Some(12));
        assert_eq!(engine.track.position_of(r1), Some(11));
        assert_eq!(engine.track.position_of(r2), Some(10));
    }

    #[test]
    fn test_front_exhaustion_hits_uncovered_riders() {
        let mut engine = solo_engine(flat_track(30), 2, RaceConfig::new().with_seed(1));
        let (r0, r1) = (RiderId::new(0), RiderId::new(1));

        engine.track.place_rider(r0, 10);
        engine.track.place_rider(r1, 9);

        let exhausted = engine.apply_front_exhaustion();

        // Only the uncovered front rider pays; the sheltered one does not.
        assert_eq!(exhausted, vec![r0]);
        assert_eq!(engine.rider(r0).deck.fatigue_count(), 1);
        assert_eq!(engine.rider(r1).deck.fatigue_count(), 0);
    }

    #[test]
    fn test_sprint_streak_forces_fatigue_draw_next_round() {
        // With the sprint threshold at 3, every Rouleur card is a sprint.
        let mut engine = solo_engine(
            flat_track(40),
            1,
            RaceConfig::new()
                .with_seed(5)
                .with_sprint_rule(3, 2)
                .with_front_exhaustion(false),
        );
        let rider = RiderId::new(0);

        for _ in 0..2 {
            engine.submit(Choice::Rider(rider)).unwrap();
            let pair = match engine.current_decision().unwrap().kind {
                DecisionKind::ChooseCard { pair, .. } => pair,
                DecisionKind::ChooseRider => unreachable!(),
            };
            engine.submit(Choice::Card(pair.higher())).unwrap();
        }
        assert!(engine.rider(rider).exhaustion_due);

        // Round three: the rider choice is answered with a forced fatigue
        // move, no card decision happens.
        engine.submit(Choice::Rider(rider)).unwrap();
        assert_eq!(engine.round(), 4);

        let record = &engine.history()[2].moves[0];
        assert!(record.forced);
        assert!(record.card.is_fatigue());
        assert_eq!(record.adjusted, 2);
        assert!(!engine.rider(rider).exhaustion_due);
        assert_eq!(engine.rider(rider).sprint_streak, 0);
    }

    #[test]
    fn test_same_cell_finishers_rank_by_team_order() {
        let mut engine = solo_engine(flat_track(10), 2, RaceConfig::new().with_seed(1));
        let (r0, r1) = (RiderId::new(0), RiderId::new(1));

        engine.track.place_rider(r0, 11);
        engine.track.place_rider(r1, 11);

        let finished = engine.detect_finishers();
        assert_eq!(finished, vec![r0, r1]);
        assert_eq!(engine.rider(r0).rank, Some(1));
        assert_eq!(engine.rider(r1).rank, Some(2));
    }

    #[test]
    fn test_team_scoring_modes() {
        let outcome_with = |scoring: TeamScoring| {
            let mut engine = RaceEngine::new(
                flat_track(30),
                vec![TeamSpec::regular("Blue"), TeamSpec::regular("Red")],
                RaceConfig::new().with_seed(1).with_team_scoring(scoring),
            )
            .unwrap();

            // Finish order: Blue's Rouleur, both Red riders, then Blue's
            // Sprinteur — Blue holds the best rank, Red the best worst-rank.
            engine.track.place_rider(RiderId::new(0), 32);
            engine.track.place_rider(RiderId::new(2), 31);
            engine.track.place_rider(RiderId::new(3), 30);
            engine.detect_finishers();
            engine.track.place_rider(RiderId::new(1), 30);
            engine.detect_finishers();
            engine.phase = Phase::Finished;
            engine.outcome().unwrap()
        };

        let best = outcome_with(TeamScoring::BestRider);
        assert_eq!(best.standings[0].team, TeamId::new(0));

        let worst = outcome_with(TeamScoring::WorstRider);
        assert_eq!(worst.standings[0].team, TeamId::new(1));
    }

    #[test]
    fn test_further_cell_outranks_team_order() {
        let mut engine = solo_engine(flat_track(10), 2, RaceConfig::new().with_seed(1));
        let (r0, r1) = (RiderId::new(0), RiderId::new(1));

        engine.track.place_rider(r0, 10);
        engine.track.place_rider(r1, 12);

        engine.detect_finishers();
        assert_eq!(engine.rider(r1).rank, Some(1));
        assert_eq!(engine.rider(r0).rank, Some(2));
    }
}
