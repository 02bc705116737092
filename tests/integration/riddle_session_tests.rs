//! Integration tests for solo riddle mode

use std::time::Duration;
use riddle_party::{
    riddle::{GuessOutcome, RiddleSession, RiddleStatus},
    Applied, Difficulty, FetchKind, GenerationError,
};
use crate::mocks::ScriptedProvider;

#[tokio::test]
async fn test_solve_a_riddle() {
    let provider = ScriptedProvider::new();
    provider.push_riddle("What has one eye but cannot see?", "A needle");
    let mut session = RiddleSession::new(provider.clone());

    session.request(Difficulty::Easy);
    assert_eq!(session.next_update().await, Applied::Accepted);
    assert_eq!(provider.calls(), vec![FetchKind::Riddle(Difficulty::Easy)]);

    let engine = session.engine_mut();
    assert_eq!(engine.status(), RiddleStatus::Ready);
    assert_eq!(engine.check_guess("a pin").unwrap(), GuessOutcome::Incorrect);
    assert_eq!(engine.check_guess("A NEEDLE ").unwrap(), GuessOutcome::Correct);
    assert!(engine.is_revealed());
    assert!(engine.share_text().unwrap().contains("\"What has one eye but cannot see?\""));
}

#[tokio::test(start_paused = true)]
async fn test_only_the_latest_request_lands() {
    let provider = ScriptedProvider::new();
    provider
        .push_riddle_after(Duration::from_secs(5), "Slow riddle", "slow")
        .push_riddle("Fast riddle", "fast");
    let mut session = RiddleSession::new(provider);

    session.request(Difficulty::Easy);
    // Let the first fetch pick up the slow response
    tokio::task::yield_now().await;
    session.request(Difficulty::Hard);

    assert_eq!(session.next_update().await, Applied::Accepted);
    assert_eq!(session.next_update().await, Applied::Stale);

    let snapshot = session.engine().snapshot();
    assert_eq!(snapshot.difficulty, Difficulty::Hard);
    assert_eq!(snapshot.riddle.unwrap().riddle, "Fast riddle");
}

#[tokio::test]
async fn test_failure_is_reported_and_retry_works() {
    let provider = ScriptedProvider::new();
    provider
        .fail_riddle(GenerationError::schema("missing answer"))
        .push_riddle("What goes up but never comes down?", "Your age");
    let mut session = RiddleSession::new(provider);

    session.request(Difficulty::Medium);
    assert_eq!(session.next_update().await, Applied::Failed);
    assert_eq!(session.engine().status(), RiddleStatus::Failed);
    assert!(session.engine().last_error().is_some());

    session.request(Difficulty::Medium);
    assert_eq!(session.next_update().await, Applied::Accepted);
    assert_eq!(session.engine_mut().reveal().unwrap(), "Your age");
}

#[test]
fn test_nothing_to_apply_before_a_request() {
    let mut session = RiddleSession::new(ScriptedProvider::new());
    let mut update = tokio_test::task::spawn(session.next_update());
    tokio_test::assert_pending!(update.poll());
}
