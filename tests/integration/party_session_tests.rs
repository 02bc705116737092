//! Integration tests for the party session on paused tokio time

use std::time::Duration;
use riddle_party::{
    party::{PartySession, PartyUpdate, PhaseKind, Team},
    ContentProvider, Deck, DeckProvider, GenerationError, RoundContent, Score, TimerConfig,
};
use crate::mocks::ScriptedProvider;

fn timers() -> TimerConfig {
    TimerConfig {
        question_seconds: 10,
        dare_seconds: 15,
        speed_seconds: 10,
    }
}

fn four_players<P: ContentProvider + Clone + 'static>(provider: P, seed: u64) -> PartySession<P> {
    let mut session = PartySession::seeded(provider, timers(), seed);
    session.choose_player_count(4).unwrap();
    session.submit_names(&["P1", "P2", "P3", "P4"]).unwrap();
    session
}

/// Next update that is not a countdown tick
async fn next_event<P: ContentProvider + Clone + 'static>(session: &mut PartySession<P>) -> PartyUpdate {
    loop {
        match session.next_update().await {
            PartyUpdate::Tick { .. } => continue,
            other => return other,
        }
    }
}

/// Assert the session stays silent for longer than any round timer
async fn assert_quiet<P: ContentProvider + Clone + 'static>(session: &mut PartySession<P>) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(300);
    while let Ok(update) = tokio::time::timeout_at(deadline, session.next_update()).await {
        assert_eq!(update, PartyUpdate::Discarded, "unexpected update after round ended");
    }
}

#[tokio::test(start_paused = true)]
async fn test_four_player_answer_scenario() {
    let provider = ScriptedProvider::new();
    provider.push_truth("What is the last lie you told?");
    let mut session = four_players(provider.clone(), 5);

    let roster = session.engine().roster().clone();
    assert_eq!(roster.team_names(Team::A), vec!["P1", "P3"]);
    assert_eq!(roster.team_names(Team::B), vec!["P2", "P4"]);
    assert_eq!(session.snapshot().score, Score { a: 0, b: 0 });

    assert_eq!(session.snapshot().asking.unwrap().name, "P1");
    session.ask_question().unwrap();
    assert_eq!(session.snapshot().phase, PhaseKind::AwaitingContent);
    assert_eq!(next_event(&mut session).await, PartyUpdate::ContentApplied(PhaseKind::Question));

    let target = session.snapshot().target.unwrap();
    assert!(target.name == "P2" || target.name == "P4");
    assert_eq!(target.team, Team::B);
    assert_eq!(session.remaining(), Some(10));

    session.answered().unwrap();
    let snapshot = session.snapshot();
    assert_eq!(snapshot.score, Score { a: 0, b: 1 });
    assert_eq!(snapshot.turn, 1);
    assert_eq!(snapshot.asking.unwrap().name, "P2");
    assert_eq!(snapshot.phase, PhaseKind::Idle);
    assert!(snapshot.content.is_none());
    assert_eq!(session.remaining(), None);

    // The cancelled question timer never fires
    assert_quiet(&mut session).await;
    assert_eq!(session.snapshot().turn, 1);
}

#[tokio::test(start_paused = true)]
async fn test_question_timeout_matches_explicit_decline() {
    let script = |provider: &ScriptedProvider| {
        provider
            .push_truth("Who here would you trust with a secret?")
            .push_dares(&["Sing", "Dance", "Whistle"]);
    };

    // Let the question timer run out
    let timed_out = ScriptedProvider::new();
    script(&timed_out);
    let mut waiting = four_players(timed_out.clone(), 21);
    waiting.ask_question().unwrap();
    assert_eq!(next_event(&mut waiting).await, PartyUpdate::ContentApplied(PhaseKind::Question));

    let mut ticks = Vec::new();
    let update = loop {
        match waiting.next_update().await {
            PartyUpdate::Tick { remaining, .. } => ticks.push(remaining),
            other => break other,
        }
    };
    assert_eq!(update, PartyUpdate::QuestionTimedOut);
    assert_eq!(ticks, (1..10).rev().collect::<Vec<u32>>());
    assert_eq!(next_event(&mut waiting).await, PartyUpdate::ContentApplied(PhaseKind::DareChoosing));

    // Decline explicitly
    let declined = ScriptedProvider::new();
    script(&declined);
    let mut explicit = four_players(declined.clone(), 21);
    explicit.ask_question().unwrap();
    next_event(&mut explicit).await;
    explicit.declined().unwrap();
    assert_eq!(next_event(&mut explicit).await, PartyUpdate::ContentApplied(PhaseKind::DareChoosing));

    assert_eq!(waiting.snapshot(), explicit.snapshot());
    assert_eq!(waiting.snapshot().score, Score::default());
    assert_eq!(timed_out.calls(), declined.calls());
}

#[tokio::test(start_paused = true)]
async fn test_dare_timer_runs_out_and_turn_passes() {
    let provider = ScriptedProvider::new();
    provider.push_truth("Worst date ever?").push_dares(&["Sing", "Dance", "Whistle"]);
    let mut session = four_players(provider, 8);

    session.ask_question().unwrap();
    next_event(&mut session).await;
    session.declined().unwrap();
    assert_eq!(next_event(&mut session).await, PartyUpdate::ContentApplied(PhaseKind::DareChoosing));

    // The dare timer is not running until asked for
    assert_eq!(session.remaining(), None);
    session.select_dare(2).unwrap();
    assert_eq!(session.engine().selected_dare(), Some("Whistle"));
    session.start_dare_timer().unwrap();
    assert_eq!(session.remaining(), Some(15));

    assert_eq!(next_event(&mut session).await, PartyUpdate::DareTimedOut);
    let snapshot = session.snapshot();
    assert_eq!(snapshot.turn, 1);
    assert_eq!(snapshot.phase, PhaseKind::Idle);
    assert_eq!(snapshot.score, Score::default());
}

#[tokio::test(start_paused = true)]
async fn test_manual_advance_silences_running_dare_timer() {
    let provider = ScriptedProvider::new();
    provider.push_truth("Biggest regret?").push_dares(&["Sing", "Dance", "Whistle"]);
    let mut session = four_players(provider, 8);

    session.ask_question().unwrap();
    next_event(&mut session).await;
    session.declined().unwrap();
    next_event(&mut session).await;
    session.select_dare(0).unwrap();
    session.start_dare_timer().unwrap();

    // Let a few ticks queue up unread, then finish the dare by hand
    tokio::time::sleep(Duration::from_secs(4)).await;
    session.advance_turn().unwrap();
    assert_eq!(session.snapshot().turn, 1);

    assert_quiet(&mut session).await;
    assert_eq!(session.snapshot().turn, 1);
    assert_eq!(session.snapshot().phase, PhaseKind::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_fetch_failure_keeps_turn_and_allows_retry() {
    let provider = ScriptedProvider::new();
    provider
        .fail_truth(GenerationError::network("connection reset"))
        .push_truth("Second try?");
    let mut session = four_players(provider.clone(), 2);

    session.ask_question().unwrap();
    match next_event(&mut session).await {
        PartyUpdate::ContentFailed(message) => assert!(message.contains("connection reset")),
        other => panic!("expected a failure, got {:?}", other),
    }
    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase, PhaseKind::Idle);
    assert_eq!(snapshot.turn, 0);
    assert!(snapshot.target.is_none());
    assert!(snapshot.error.is_some());

    session.ask_question().unwrap();
    assert_eq!(next_event(&mut session).await, PartyUpdate::ContentApplied(PhaseKind::Question));
    assert_eq!(
        session.snapshot().content,
        Some(RoundContent::Text("Second try?".to_string()))
    );
    assert!(session.snapshot().error.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_dare_fetch_failure_returns_to_idle() {
    let provider = ScriptedProvider::new();
    provider
        .push_truth("Secret crush?")
        .fail_dares(GenerationError::schema("expected a dares array"));
    let mut session = four_players(provider, 4);

    session.ask_question().unwrap();
    next_event(&mut session).await;
    session.declined().unwrap();
    assert!(matches!(next_event(&mut session).await, PartyUpdate::ContentFailed(_)));

    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase, PhaseKind::Idle);
    assert_eq!(snapshot.turn, 0);
    assert_eq!(snapshot.score, Score::default());
    assert_eq!(snapshot.error.unwrap().intent, "declined");
}

#[tokio::test(start_paused = true)]
async fn test_reset_during_fetch_discards_late_content() {
    let provider = ScriptedProvider::new();
    provider.push_truth_after(Duration::from_secs(5), "Too late?");
    let mut session = four_players(provider, 1);

    session.ask_question().unwrap();
    session.reset();

    assert_eq!(session.next_update().await, PartyUpdate::Discarded);
    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase, PhaseKind::SelectingPlayerCount);
    assert!(snapshot.roster.is_empty());
    assert_eq!(snapshot.turn, 0);
    assert!(snapshot.content.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_reset_during_question_stops_timer() {
    let provider = ScriptedProvider::new();
    provider.push_truth("Last thing you searched?");
    let mut session = four_players(provider, 1);

    session.ask_question().unwrap();
    next_event(&mut session).await;
    session.reset();

    assert_quiet(&mut session).await;
    assert_eq!(session.snapshot().phase, PhaseKind::SelectingPlayerCount);
}

#[tokio::test(start_paused = true)]
async fn test_full_game_with_builtin_deck() {
    let provider = DeckProvider::seeded(Deck::builtin(), 77);
    let mut session = four_players(provider, 77);

    for round in 0..8u64 {
        session.ask_question().unwrap();
        assert_eq!(next_event(&mut session).await, PartyUpdate::ContentApplied(PhaseKind::Question));
        if round % 2 == 0 {
            session.answered().unwrap();
        } else {
            session.declined().unwrap();
            assert_eq!(next_event(&mut session).await, PartyUpdate::ContentApplied(PhaseKind::DareChoosing));
            session.select_dare(1).unwrap();
            session.advance_turn().unwrap();
        }
        assert_eq!(session.snapshot().turn, round + 1);
    }

    let score = session.snapshot().score;
    assert_eq!(score.a + score.b, 4);
    assert_eq!(session.snapshot().asking.unwrap().name, "P1");
}
