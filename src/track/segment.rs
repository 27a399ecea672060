//! Terrain kinds and track segments.

use serde::{Deserialize, Serialize};

/// Terrain of a track segment, modulating movement and drafting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Terrain {
    Flat,
    /// Climb: Sprinteurs are capped, nobody drafts.
    Hill,
    /// Descent: movement is raised to the configured minimum.
    Downhill,
    /// Cells at or past the finish line. No drafting.
    Finish,
}

impl Terrain {
    /// Whether riders on this terrain give and receive slipstream.
    #[must_use]
    pub const fn allows_slipstream(self) -> bool {
        matches!(self, Terrain::Flat | Terrain::Downhill)
    }
}

/// A run of identical cells: terrain, length in cells, lane width.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub terrain: Terrain,
    pub length: usize,
    pub lanes: usize,
}

impl Segment {
    /// A segment with the default two lanes.
    #[must_use]
    pub const fn new(terrain: Terrain, length: usize) -> Self {
        Self {
            terrain,
            length,
            lanes: 2,
        }
    }

    /// Override the lane width.
    #[must_use]
    pub const fn with_lanes(mut self, lanes: usize) -> Self {
        self.lanes = lanes;
        self
    }

    /// Shorthand for a flat segment.
    #[must_use]
    pub const fn flat(length: usize) -> Self {
        Self::new(Terrain::Flat, length)
    }

    /// Shorthand for a hill segment.
    #[must_use]
    pub const fn hill(length: usize) -> Self {
        Self::new(Terrain::Hill, length)
    }

    /// Shorthand for a downhill segment.
    #[must_use]
    pub const fn downhill(length: usize) -> Self {
        Self::new(Terrain::Downhill, length)
    }

    /// Shorthand for a finish segment.
    #[must_use]
    pub const fn finish(length: usize) -> Self {
        Self::new(Terrain::Finish, length)
    }
}
