//! QA tests against the real Upstage Solar API.
//!
//! Run with: `UPSTAGE_API_KEY=... cargo test -p ashfall-core qa_live -- --ignored --nocapture`

use ashfall_core::resolver::{ChoiceClassifier, ClassifyRequest, SolarClassifier};
use ashfall_core::{EncounterCatalog, GadgetCatalog, GameSession, SessionConfig};
use serde_json::json;
use std::sync::Arc;

/// Load environment variables from .env file
fn setup() {
    let _ = dotenvy::dotenv();
}

/// Check if API key is available
fn has_api_key() -> bool {
    std::env::var("UPSTAGE_API_KEY").is_ok()
}

fn raider_content() -> serde_json::Value {
    json!([{
        "id": "enc_raiders",
        "name": "약탈자들",
        "description": "세 명의 약탈자가 길을 막고 있다.",
        "choices": [
            { "id": "choice_fight", "text": "싸운다", "description": "정면으로 맞서 싸운다" },
            { "id": "choice_run", "text": "도망간다", "description": "골목으로 도망간다" },
            { "id": "choice_talk", "text": "말을 건다", "description": "협상을 시도한다" }
        ]
    }])
}

#[tokio::test]
#[ignore]
async fn test_live_classification_picks_listed_id() {
    setup();
    if !has_api_key() {
        eprintln!("Skipping test: UPSTAGE_API_KEY not set");
        return;
    }

    let classifier = SolarClassifier::from_env().unwrap();
    let request = ClassifyRequest {
        player_input: "그냥 도망치자".to_string(),
        scenario_name: Some("약탈자들".to_string()),
        scenario_description: Some("세 명의 약탈자가 길을 막고 있다.".to_string()),
        candidates: vec![
            ashfall_core::resolver::CandidateSummary {
                id: "choice_fight".to_string(),
                description: "정면으로 맞서 싸운다".to_string(),
                requirement_hint: None,
            },
            ashfall_core::resolver::CandidateSummary {
                id: "choice_run".to_string(),
                description: "골목으로 도망간다".to_string(),
                requirement_hint: None,
            },
        ],
    };

    let proposal = classifier.classify(&request).await.unwrap();
    println!("proposal: {}", proposal.choice_id);
    assert_eq!(proposal.choice_id, "choice_run");
}

#[tokio::test]
#[ignore]
async fn test_live_session_turn() {
    setup();
    if !has_api_key() {
        eprintln!("Skipping test: UPSTAGE_API_KEY not set");
        return;
    }

    let mut catalog = EncounterCatalog::new();
    catalog.load_value(raider_content()).unwrap();
    let config = SessionConfig::new(Arc::new(catalog), Arc::new(GadgetCatalog::new()));

    let classifier = SolarClassifier::from_env().unwrap();
    let mut session = GameSession::with_classifier(config, Box::new(classifier));

    session.start().unwrap();
    let report = session.resolve_and_apply("조용히 뒤로 빠져서 도망간다").await.unwrap();
    println!("resolved: {} / {}", report.choice_id, report.story);
    assert_eq!(report.choice_id, "choice_run");
}
