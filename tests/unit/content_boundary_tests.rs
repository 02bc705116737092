//! Raw payload validation and the scripted provider contract

use riddle_party::content::{clean_category, parse_dares, parse_riddle};
use riddle_party::{ContentProvider, Difficulty, FetchKind, GenerationError};
use crate::mocks::ScriptedProvider;

#[test]
fn test_raw_payloads_to_typed_content() {
    let riddle = parse_riddle(r#"{"riddle": "What has a head and a tail but no body?", "answer": "A coin"}"#).unwrap();
    assert_eq!(riddle.answer, "A coin");

    let dares = parse_dares(r#"{"dares": ["Hop on one foot", "Tell a joke"]}"#).unwrap();
    assert_eq!(dares.iter().collect::<Vec<_>>(), vec!["Hop on one foot", "Tell a joke", "Hop on one foot"]);

    assert_eq!(clean_category("\"Famous painters\"\n").unwrap(), "Famous painters");
}

#[test]
fn test_bad_payloads_are_generation_errors() {
    assert!(matches!(parse_riddle("riddle: none"), Err(GenerationError::Malformed { .. })));
    assert!(matches!(parse_dares(r#"{"dares": []}"#), Err(GenerationError::SchemaMismatch { .. })));
    assert!(matches!(parse_dares(r#"{"options": ["a"]}"#), Err(GenerationError::SchemaMismatch { .. })));
}

#[tokio::test]
async fn test_scripted_provider_replays_in_order() {
    let provider = ScriptedProvider::new();
    provider
        .push_truth("first")
        .fail_truth(GenerationError::network("down"))
        .push_dares(&["a", "b", "c", "d"]);

    assert_eq!(provider.fetch_truth_question().await.unwrap(), "first");
    assert!(matches!(provider.fetch_truth_question().await, Err(GenerationError::Network { .. })));
    assert!(matches!(provider.fetch_truth_question().await, Err(GenerationError::EmptyPool { .. })));
    assert_eq!(provider.fetch_dare_options().await.unwrap().iter().count(), 3);
    assert!(provider.fetch_riddle(Difficulty::Hard).await.is_err());

    assert_eq!(provider.calls(), vec![
        FetchKind::TruthQuestion,
        FetchKind::TruthQuestion,
        FetchKind::TruthQuestion,
        FetchKind::DareOptions,
        FetchKind::Riddle(Difficulty::Hard),
    ]);
}

#[test]
fn test_deck_provider_outside_a_runtime() {
    let provider = riddle_party::DeckProvider::seeded(riddle_party::Deck::builtin(), 12);
    let category = tokio_test::block_on(provider.fetch_speed_category()).unwrap();
    assert!(!category.contains('"'));
}
