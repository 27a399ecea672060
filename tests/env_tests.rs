//! Environment adapter: reset/step contract, action validation, rewards.

use flamme_rouge::{
    DecisionKind, EnvAction, GreedyAgent, Observation, RaceConfig, RaceEnv, RaceError,
    RewardShaping, RiderType, Segment, TeamSpec,
};

fn course(cells: usize) -> Vec<Segment> {
    vec![Segment::flat(cells), Segment::finish(3)]
}

fn two_team_env(seed_independent_config: RaceConfig) -> RaceEnv {
    RaceEnv::new(
        course(20),
        TeamSpec::regular("Learner"),
        vec![(
            TeamSpec::regular("Bot"),
            Box::new(GreedyAgent::new()) as Box<dyn flamme_rouge::Agent>,
        )],
        seed_independent_config,
    )
    .unwrap()
}

fn first_legal(obs: &Observation) -> EnvAction {
    EnvAction::legal(obs)[0]
}

#[test]
fn reset_returns_the_controlled_teams_first_decision() {
    let mut env = two_team_env(RaceConfig::new());
    let obs = env.reset(7).unwrap();

    assert_eq!(obs.decision, Some(DecisionKind::ChooseRider));
    assert_eq!(obs.own_riders.len(), 2);
    assert_eq!(obs.opponents.len(), 2);
    assert_eq!(
        EnvAction::legal(&obs),
        vec![EnvAction::RiderA, EnvAction::RiderB]
    );
}

#[test]
fn illegal_actions_are_rejected_before_reaching_the_engine() {
    let mut env = two_team_env(RaceConfig::new());
    let obs = env.reset(7).unwrap();
    assert_eq!(obs.decision, Some(DecisionKind::ChooseRider));

    let err = env.step(EnvAction::CardFirst).unwrap_err();
    assert!(matches!(err, RaceError::InvalidAction { .. }));

    // The decision point is still there, nothing was skipped.
    let obs = env.engine().unwrap().observe(flamme_rouge::TeamId::new(0));
    assert_eq!(obs.decision, Some(DecisionKind::ChooseRider));
}

#[test]
fn an_episode_runs_to_a_graded_terminal_reward() {
    let mut env = two_team_env(RaceConfig::new());
    let mut obs = env.reset(11).unwrap();

    let mut steps = 0;
    let outcome = loop {
        let outcome = env.step(first_legal(&obs)).unwrap();
        steps += 1;
        assert!(steps < 10_000, "episode failed to terminate");

        if outcome.terminated {
            break outcome;
        }
        // Every intermediate step pays zero without shaping.
        assert_eq!(outcome.reward, 0.0);
        assert!(outcome.info.final_rank.is_none());
        // A live episode always has a pending controlled-team decision.
        assert!(outcome.observation.decision.is_some());
        obs = outcome.observation;
    };

    assert!(!outcome.info.abandoned);
    let rank = outcome.info.final_rank.unwrap();
    // Two teams: +1 for winning, -1 otherwise.
    let expected = if rank == 1 { 1.0 } else { -1.0 };
    assert_eq!(outcome.reward, expected);
    assert!(outcome.observation.decision.is_none());
}

#[test]
fn rider_and_card_decisions_alternate_within_a_round() {
    let mut env = two_team_env(RaceConfig::new());
    let obs = env.reset(3).unwrap();

    assert_eq!(obs.decision, Some(DecisionKind::ChooseRider));
    let after_rider = env.step(EnvAction::RiderA).unwrap();
    // Same round: the card for the chosen rider is now being decided.
    match after_rider.observation.decision {
        Some(DecisionKind::ChooseCard { rider, .. }) => {
            assert_eq!(rider, obs.own_riders[0].rider);
        }
        other => panic!("expected a card decision, got {other:?}"),
    }

    let after_card = env.step(EnvAction::CardFirst).unwrap();
    // Opponent turns were advanced internally; we are back at a rider
    // decision for the next round.
    assert_eq!(
        after_card.observation.decision,
        Some(DecisionKind::ChooseRider)
    );
    assert_eq!(after_card.info.round, after_rider.info.round + 1);
}

#[test]
fn progress_shaping_pays_for_forward_motion() {
    let mut env = two_team_env(
        RaceConfig::new().with_reward_shaping(RewardShaping::Progress { per_cell: 0.1 }),
    );
    env.reset(5).unwrap();

    // Choosing a rider moves nobody.
    let after_rider = env.step(EnvAction::RiderA).unwrap();
    assert_eq!(after_rider.reward, 0.0);

    // Playing the card moves the rider at least two cells.
    let after_card = env.step(EnvAction::CardFirst).unwrap();
    assert!(after_card.reward >= 0.2 - 1e-6);
}

#[test]
fn a_solo_controlled_team_only_offers_rider_a() {
    let mut env = RaceEnv::new(
        course(15),
        TeamSpec::solo("Solo", RiderType::Sprinteur),
        vec![(
            TeamSpec::regular("Bot"),
            Box::new(GreedyAgent::new()) as Box<dyn flamme_rouge::Agent>,
        )],
        RaceConfig::new(),
    )
    .unwrap();

    let obs = env.reset(2).unwrap();
    assert_eq!(EnvAction::legal(&obs), vec![EnvAction::RiderA]);
    assert!(env.step(EnvAction::RiderB).is_err());
    assert!(env.step(EnvAction::RiderA).is_ok());
}

#[test]
fn observation_encoding_is_fixed_length_throughout() {
    let mut env = two_team_env(RaceConfig::new());
    let mut obs = env.reset(13).unwrap();
    let expected = Observation::encoded_len();

    for _ in 0..50 {
        assert_eq!(obs.encode().len(), expected);
        let outcome = env.step(first_legal(&obs)).unwrap();
        if outcome.terminated {
            assert_eq!(outcome.observation.encode().len(), expected);
            return;
        }
        obs = outcome.observation;
    }
}

#[test]
fn episodes_are_reproducible_per_seed() {
    let run = |seed: u64| {
        let mut env = two_team_env(RaceConfig::new());
        let mut obs = env.reset(seed).unwrap();
        let mut rewards = Vec::new();
        loop {
            let outcome = env.step(first_legal(&obs)).unwrap();
            rewards.push(outcome.reward.to_bits());
            if outcome.terminated {
                return (rewards, outcome.info);
            }
            obs = outcome.observation;
        }
    };

    assert_eq!(run(99), run(99));
}
