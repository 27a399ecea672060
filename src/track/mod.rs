//! The track: segments flattened into cells, with lane occupancy.
//!
//! Positions are absolute cell indices. Within a cell, riders sit in
//! arrival order and the earlier arrival holds the inside lane, counting as
//! ahead for ordering purposes. A racing cell never holds more riders than
//! its lane width; placement resolves overflow laterally first and then
//! forward, never backward. Cells at or past the finish line are uncapped —
//! riders rolling out past the line stack freely.

pub mod courses;
mod segment;

pub use segment::{Segment, Terrain};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::RaceError;
use crate::riders::RiderId;

/// One cell of the flattened track.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct Cell {
    terrain: Terrain,
    lanes: usize,
    /// Occupants in arrival order; index = lane.
    occupants: SmallVec<[RiderId; 2]>,
}

impl Cell {
    // Finish cells are uncapped: riders rolling out past the line stack
    // freely, so the field can never wedge itself against the track end.
    fn has_space(&self) -> bool {
        self.terrain == Terrain::Finish || self.occupants.len() < self.lanes
    }
}

/// An ordered sequence of segments with per-cell rider occupancy.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Track {
    segments: Vec<Segment>,
    cells: Vec<Cell>,
    finish_line: usize,
    positions: FxHashMap<RiderId, usize>,
}

impl Track {
    /// Build a track from segments.
    ///
    /// The last segment must be `Finish`; the finish line is the first cell
    /// of the first finish segment, and at least one racing cell must
    /// precede it.
    pub fn new(segments: Vec<Segment>) -> Result<Self, RaceError> {
        if segments.is_empty() {
            return Err(RaceError::config("track needs at least one segment"));
        }
        for seg in &segments {
            if seg.length == 0 {
                return Err(RaceError::config("segment length must be at least 1"));
            }
            if seg.lanes == 0 {
                return Err(RaceError::config("segment lane count must be at least 1"));
            }
        }
        if segments.last().map(|s| s.terrain) != Some(Terrain::Finish) {
            return Err(RaceError::config("track must end with a finish segment"));
        }

        let mut cells = Vec::new();
        let mut finish_line = None;
        for seg in &segments {
            if seg.terrain == Terrain::Finish && finish_line.is_none() {
                finish_line = Some(cells.len());
            }
            for _ in 0..seg.length {
                cells.push(Cell {
                    terrain: seg.terrain,
                    lanes: seg.lanes,
                    occupants: SmallVec::new(),
                });
            }
        }

        let finish_line = finish_line.expect("finish segment checked above");
        if finish_line == 0 {
            return Err(RaceError::config(
                "track needs at least one cell before the finish line",
            ));
        }

        Ok(Self {
            segments,
            cells,
            finish_line,
            positions: FxHashMap::default(),
        })
    }

    /// Total number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True if the track has no cells (never, for a validated track).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The segments the track was built from.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// First cell at or past which a rider has finished.
    #[must_use]
    pub fn finish_line(&self) -> usize {
        self.finish_line
    }

    /// Terrain at a cell. Cells past the end count as finish terrain.
    #[must_use]
    pub fn terrain_at(&self, cell: usize) -> Terrain {
        self.cells
            .get(cell)
            .map_or(Terrain::Finish, |c| c.terrain)
    }

    /// Lane width at a cell.
    #[must_use]
    pub fn lanes_at(&self, cell: usize) -> usize {
        self.cells.get(cell).map_or(0, |c| c.lanes)
    }

    /// Absolute forward distance from one cell to another (0 if not ahead).
    #[must_use]
    pub fn cell_distance(&self, from: usize, to: usize) -> usize {
        to.saturating_sub(from)
    }

    /// Riders in a cell, arrival order (lane 0 first).
    #[must_use]
    pub fn occupants(&self, cell: usize) -> &[RiderId] {
        self.cells.get(cell).map_or(&[], |c| c.occupants.as_slice())
    }

    /// A rider's cell, if placed.
    #[must_use]
    pub fn position_of(&self, rider: RiderId) -> Option<usize> {
        self.positions.get(&rider).copied()
    }

    /// A rider's lane within its cell, if placed.
    #[must_use]
    pub fn lane_of(&self, rider: RiderId) -> Option<usize> {
        let cell = self.position_of(rider)?;
        self.cells[cell].occupants.iter().position(|&r| r == rider)
    }

    /// All riders from race leader to last. Within a cell the earlier
    /// arrival is ahead.
    pub fn riders(&self) -> impl Iterator<Item = RiderId> + '_ {
        self.cells
            .iter()
            .rev()
            .flat_map(|c| c.occupants.iter().copied())
    }

    /// Riders whose cell lies within `[cell, cell + window]`, ordered by
    /// cell ascending then arrival order.
    #[must_use]
    pub fn riders_within_window(&self, cell: usize, window: usize) -> Vec<RiderId> {
        let end = (cell + window).min(self.cells.len().saturating_sub(1));
        (cell..=end)
            .flat_map(|c| self.occupants(c).iter().copied())
            .collect()
    }

    /// Occupied cells, back to front.
    #[must_use]
    pub fn occupied_cells(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.occupants.is_empty())
            .map(|(i, _)| i)
            .collect()
    }

    /// The race leader, if anyone is placed.
    #[must_use]
    pub fn leader(&self) -> Option<RiderId> {
        self.riders().next()
    }

    fn remove(&mut self, rider: RiderId) {
        if let Some(cell) = self.positions.remove(&rider) {
            self.cells[cell].occupants.retain(|r| *r != rider);
        }
    }

    fn insert(&mut self, rider: RiderId, cell: usize) {
        self.cells[cell].occupants.push(rider);
        self.positions.insert(rider, cell);
    }

    /// Place a rider in the starting zone. Fails if the cell is full or
    /// not ahead of the rider's current position rules (setup only).
    pub fn place_start(&mut self, rider: RiderId, cell: usize) -> Result<(), RaceError> {
        if cell >= self.finish_line {
            return Err(RaceError::config("start cell lies past the finish line"));
        }
        if !self.cells[cell].has_space() {
            return Err(RaceError::config("start cell is full"));
        }
        self.remove(rider);
        self.insert(rider, cell);
        Ok(())
    }

    /// Move a rider to `target`, resolving overflow.
    ///
    /// The target is clamped to the track bounds. A full target cell first
    /// pushes the rider laterally into a free lane (which is simply a later
    /// lane of the same cell); when every lane is taken, the rider spills
    /// forward to the first cell with space. Never backward: if the track
    /// ahead is completely full the rider keeps its current cell.
    ///
    /// Returns the cell actually occupied.
    pub fn place_rider(&mut self, rider: RiderId, target: usize) -> usize {
        let current = self.position_of(rider);
        let target = target.min(self.cells.len() - 1);

        let destination = (target..self.cells.len())
            .find(|&c| self.cells[c].has_space())
            .or(current);

        match destination {
            Some(dest) => {
                self.remove(rider);
                self.insert(rider, dest);
                dest
            }
            // Unplaced rider and a fully packed track ahead: leave it off.
            None => target,
        }
    }

    /// Move a rider to the first cell with space at or behind `target`,
    /// never behind `floor`. Used by slipstream shifts, which may not
    /// leapfrog the group being joined.
    ///
    /// Returns the cell actually occupied.
    pub fn place_at_or_behind(&mut self, rider: RiderId, target: usize, floor: usize) -> usize {
        let target = target.min(self.cells.len() - 1);

        let mut dest = target;
        while dest > floor && !self.cells[dest].has_space() {
            dest -= 1;
        }
        self.remove(rider);
        self.insert(rider, dest);
        dest
    }
}
