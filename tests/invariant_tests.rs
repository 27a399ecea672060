//! Property tests over whole races.

use proptest::prelude::*;

use flamme_rouge::{
    GreedyAgent, Phase, Race, RaceConfig, RaceEngine, RandomAgent, RiderType, Segment, TeamSpec,
    Track,
};

fn race_for(seed: u64, teams: usize) -> Race {
    let track = Track::new(vec![Segment::flat(25), Segment::finish(3)]).unwrap();
    let specs: Vec<TeamSpec> = (0..teams)
        .map(|i| {
            if i % 2 == 0 {
                TeamSpec::regular(format!("Team {i}"))
            } else {
                TeamSpec::solo(format!("Team {i}"), RiderType::Sprinteur)
            }
        })
        .collect();
    let engine = RaceEngine::new(track, specs, RaceConfig::new().with_seed(seed)).unwrap();

    let agents: Vec<Box<dyn flamme_rouge::Agent>> = (0..teams)
        .map(|i| {
            if i % 2 == 0 {
                Box::new(GreedyAgent::new()) as Box<dyn flamme_rouge::Agent>
            } else {
                Box::new(RandomAgent::new(seed ^ i as u64)) as Box<dyn flamme_rouge::Agent>
            }
        })
        .collect();
    Race::new(engine, agents).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// The deck multiset never loses a card, positions never decrease,
    /// and finished riders never move again — for any seed and field size.
    #[test]
    fn race_invariants_hold_for_any_seed(seed in any::<u64>(), teams in 1usize..=4) {
        let mut race = race_for(seed, teams);

        let rider_count = race.engine().riders().len();
        let mut last_positions = vec![0usize; rider_count];
        for rider in race.engine().riders() {
            last_positions[rider.id.index()] =
                race.engine().track().position_of(rider.id).unwrap();
        }

        loop {
            let phase = race.play_round().unwrap();
            let engine = race.engine();

            for rider in engine.riders() {
                // Deck bookkeeping: initial cards plus fatigue added.
                prop_assert_eq!(
                    rider.total_card_count(),
                    rider.initial_cards + rider.deck.fatigue_count()
                );

                // Monotonic progress.
                let cell = engine.track().position_of(rider.id).unwrap();
                prop_assert!(cell >= last_positions[rider.id.index()]);
                last_positions[rider.id.index()] = cell;

                // A finished rider sits at or past the line.
                if rider.finished {
                    prop_assert!(cell >= engine.track().finish_line());
                }
            }

            if phase == Phase::Finished {
                break;
            }
        }

        // Final ranks are a permutation of 1..=riders.
        let outcome = race.engine().outcome().unwrap();
        let mut ranks: Vec<u32> = outcome.rider_ranks.iter().map(|&(_, r)| r).collect();
        ranks.sort_unstable();
        let expected: Vec<u32> = (1..=rider_count as u32).collect();
        prop_assert_eq!(ranks, expected);
    }

    /// No rider is ever double-booked: every placed rider occupies exactly
    /// one cell, and no cell exceeds its lane width.
    #[test]
    fn occupancy_stays_consistent(seed in any::<u64>()) {
        let mut race = race_for(seed, 3);

        loop {
            let phase = race.play_round().unwrap();
            let engine = race.engine();
            let track = engine.track();

            let mut seen = 0usize;
            for cell in 0..track.len() {
                let occupants = track.occupants(cell);
                // Finish cells are uncapped; everything before the line
                // respects its lane width.
                if cell < track.finish_line() {
                    prop_assert!(occupants.len() <= track.lanes_at(cell));
                }
                for &rider in occupants {
                    prop_assert_eq!(track.position_of(rider), Some(cell));
                    seen += 1;
                }
            }
            prop_assert_eq!(seen, engine.riders().len());

            if phase == Phase::Finished {
                break;
            }
        }
    }
}
