//! Preset course layouts.
//!
//! The classics of the base game, expressed as segment lists. Build a
//! track with `Track::new(courses::firenze_milano())`. Courses relying on
//! supply-zone or cobblestone content are not modeled.

use super::{Segment, Terrain};

fn run(layout: &[(Terrain, usize)]) -> Vec<Segment> {
    layout
        .iter()
        .map(|&(terrain, length)| Segment::new(terrain, length))
        .collect()
}

/// Dead-flat sprinters' parade: 73 flat cells, 5 finish cells.
#[must_use]
pub fn avenue_corso_paseo() -> Vec<Segment> {
    run(&[(Terrain::Flat, 73), (Terrain::Finish, 5)])
}

/// Two climbs with fast descents.
#[must_use]
pub fn firenze_milano() -> Vec<Segment> {
    run(&[
        (Terrain::Flat, 22),
        (Terrain::Hill, 5),
        (Terrain::Downhill, 3),
        (Terrain::Flat, 16),
        (Terrain::Hill, 7),
        (Terrain::Downhill, 3),
        (Terrain::Flat, 17),
        (Terrain::Finish, 5),
    ])
}

/// Three climbs, each shorter than the last.
#[must_use]
pub fn la_classicissima() -> Vec<Segment> {
    run(&[
        (Terrain::Flat, 14),
        (Terrain::Hill, 10),
        (Terrain::Downhill, 4),
        (Terrain::Flat, 12),
        (Terrain::Hill, 5),
        (Terrain::Downhill, 4),
        (Terrain::Flat, 5),
        (Terrain::Hill, 3),
        (Terrain::Downhill, 3),
        (Terrain::Flat, 13),
        (Terrain::Finish, 5),
    ])
}

/// Summit finish after a long approach.
#[must_use]
pub fn la_haut_montagne() -> Vec<Segment> {
    run(&[
        (Terrain::Flat, 36),
        (Terrain::Hill, 7),
        (Terrain::Downhill, 5),
        (Terrain::Flat, 14),
        (Terrain::Hill, 12),
        (Terrain::Finish, 4),
    ])
}

/// Rolling course with three distinct climbs.
#[must_use]
pub fn le_col_du_ballon() -> Vec<Segment> {
    run(&[
        (Terrain::Flat, 12),
        (Terrain::Hill, 3),
        (Terrain::Downhill, 5),
        (Terrain::Flat, 18),
        (Terrain::Hill, 4),
        (Terrain::Downhill, 4),
        (Terrain::Flat, 10),
        (Terrain::Hill, 5),
        (Terrain::Downhill, 4),
        (Terrain::Flat, 8),
        (Terrain::Finish, 5),
    ])
}

/// Short ramps and a late kicker before the run-in.
#[must_use]
pub fn plateaux_de_wallonie() -> Vec<Segment> {
    run(&[
        (Terrain::Flat, 16),
        (Terrain::Hill, 3),
        (Terrain::Downhill, 3),
        (Terrain::Flat, 6),
        (Terrain::Hill, 2),
        (Terrain::Downhill, 2),
        (Terrain::Flat, 34),
        (Terrain::Hill, 2),
        (Terrain::Flat, 5),
        (Terrain::Finish, 5),
    ])
}

/// Long flat opening, two climbs close to the line.
#[must_use]
pub fn ronde_van_wevelgem() -> Vec<Segment> {
    run(&[
        (Terrain::Flat, 46),
        (Terrain::Hill, 3),
        (Terrain::Downhill, 5),
        (Terrain::Flat, 6),
        (Terrain::Hill, 5),
        (Terrain::Downhill, 3),
        (Terrain::Flat, 5),
        (Terrain::Finish, 5),
    ])
}
