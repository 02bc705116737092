//! Property-based tests for roster, turn and score invariants

use proptest::prelude::*;
use riddle_party::{
    party::{PhaseKind, Team, TurnEngine},
    Applied, DareOptions, RoundContent, Score, TimerConfig,
};

/// How a round ends
#[derive(Debug, Clone, Copy)]
enum RoundEnd {
    Answer,
    DeclineThenFinish,
    TimeoutThenDareTimeout,
}

fn arb_round_end() -> impl Strategy<Value = RoundEnd> {
    prop_oneof![
        Just(RoundEnd::Answer),
        Just(RoundEnd::DeclineThenFinish),
        Just(RoundEnd::TimeoutThenDareTimeout),
    ]
}

fn arb_player_count() -> impl Strategy<Value = usize> {
    (1usize..=5).prop_map(|half| half * 2)
}

fn names(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("P{}", i)).collect()
}

fn started(count: usize, seed: u64) -> TurnEngine {
    let mut engine = TurnEngine::seeded(TimerConfig::default(), seed);
    engine.choose_player_count(count).unwrap();
    engine.submit_names(names(count).as_slice()).unwrap();
    engine
}

fn dares() -> DareOptions {
    DareOptions::from_options(vec!["Sing".into(), "Dance".into(), "Juggle".into()]).unwrap()
}

/// Play one round to the next turn, returning the target's team
fn play_round(engine: &mut TurnEngine, end: RoundEnd, dare: usize) -> Team {
    let ticket = engine.ask_question().unwrap();
    assert_eq!(engine.content_ready(ticket, RoundContent::Text("Truth?".into())), Applied::Accepted);
    let target_team = engine.target_player().unwrap().team;

    match end {
        RoundEnd::Answer => engine.answered().unwrap(),
        RoundEnd::DeclineThenFinish => {
            let ticket = engine.declined().unwrap();
            engine.content_ready(ticket, RoundContent::Dares(dares()));
            engine.select_dare(dare).unwrap();
            engine.advance_turn().unwrap();
        }
        RoundEnd::TimeoutThenDareTimeout => {
            let generation = engine.timer().unwrap().generation;
            let ticket = match engine.timer_elapsed(generation) {
                riddle_party::party::TimerOutcome::DareRequested(ticket) => ticket,
                other => panic!("question timeout produced {:?}", other),
            };
            engine.content_ready(ticket, RoundContent::Dares(dares()));
            engine.select_dare(dare).unwrap();
            let dare_timer = engine.start_dare_timer().unwrap();
            engine.timer_elapsed(dare_timer.generation);
        }
    }
    target_team
}

proptest! {
    #[test]
    fn prop_roster_alternates_teams(count in arb_player_count(), seed in any::<u64>()) {
        let engine = started(count, seed);
        let players = engine.roster().players();

        prop_assert_eq!(players.len(), count);
        for (index, player) in players.iter().enumerate() {
            let expected = if index % 2 == 0 { Team::A } else { Team::B };
            prop_assert_eq!(player.team, expected);
        }
        prop_assert_eq!(engine.score(), Score { a: 0, b: 0 });
        prop_assert_eq!(engine.turn(), 0);
    }

    #[test]
    fn prop_rounds_keep_turn_target_and_score_invariants(
        count in arb_player_count(),
        seed in any::<u64>(),
        rounds in prop::collection::vec((arb_round_end(), 0usize..3), 1..40),
    ) {
        let mut engine = started(count, seed);
        let mut expected = Score::default();

        for (round, (end, dare)) in rounds.into_iter().enumerate() {
            let turn = engine.turn();
            prop_assert_eq!(turn, round as u64);

            let asking = engine.asking_player().unwrap().clone();
            prop_assert_eq!(&asking.name, &format!("P{}", (round % count) + 1));

            let target_team = play_round(&mut engine, end, dare);
            prop_assert_ne!(target_team, asking.team);

            if let RoundEnd::Answer = end {
                match target_team {
                    Team::A => expected.a += 1,
                    Team::B => expected.b += 1,
                }
            }

            prop_assert_eq!(engine.turn(), turn + 1);
            prop_assert_eq!(engine.phase_kind(), PhaseKind::Idle);
            prop_assert_eq!(engine.score(), expected);
        }
    }

    #[test]
    fn prop_reset_clears_everything(
        count in arb_player_count(),
        seed in any::<u64>(),
        rounds in 0usize..10,
        stop_in_question in any::<bool>(),
    ) {
        let mut engine = started(count, seed);
        for _ in 0..rounds {
            play_round(&mut engine, RoundEnd::Answer, 0);
        }
        if stop_in_question {
            let ticket = engine.ask_question().unwrap();
            engine.content_ready(ticket, RoundContent::Text("Truth?".into()));
        }
        let generation = engine.generation();

        engine.reset();
        let snapshot = engine.snapshot();
        prop_assert_eq!(snapshot.phase, PhaseKind::SelectingPlayerCount);
        prop_assert!(snapshot.roster.is_empty());
        prop_assert_eq!(snapshot.score, Score::default());
        prop_assert_eq!(snapshot.turn, 0);
        prop_assert!(snapshot.content.is_none());
        prop_assert!(snapshot.target.is_none());
        prop_assert!(snapshot.timer.is_none());
        prop_assert!(snapshot.generation > generation);
    }

    #[test]
    fn prop_odd_or_out_of_range_counts_rejected(count in 0usize..40) {
        let mut engine = TurnEngine::seeded(TimerConfig::default(), 0);
        let valid = count >= 2 && count <= 10 && count % 2 == 0;
        prop_assert_eq!(engine.choose_player_count(count).is_ok(), valid);
    }
}
