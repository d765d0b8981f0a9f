//! GameSession - the primary public API for running one player's game.
//!
//! A session composes the engine and the choice resolver: it hands raw
//! player text to the resolver, applies the resolved choice, and draws the
//! next encounter. Transports own session identifiers and envelopes; one
//! session never shares state with another.

use crate::catalog::{ContentError, EncounterCatalog};
use crate::encounter::{Choice, Encounter};
use crate::engine::{ApplyOutcome, GameEngine, Snapshot};
use crate::gadget::GadgetCatalog;
use crate::resolver::{ChoiceClassifier, ChoiceResolver, Scenario};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Errors from GameSession operations.
///
/// Classifier failures never appear here; they are absorbed by the
/// resolver's fallback tier.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Content error: {0}")]
    Content(#[from] ContentError),

    #[error("Player input was empty")]
    EmptyInput,

    #[error("No encounter is active")]
    NoActiveEncounter,

    #[error("The active encounter offers no available choices")]
    NoChoices,

    #[error("The game is already over")]
    GameOver,
}

/// Configuration for creating a game session.
pub struct SessionConfig {
    catalog: Arc<EncounterCatalog>,
    gadgets: Arc<GadgetCatalog>,
    starting_gadgets: Vec<(String, u32)>,
    rng_seed: Option<u64>,
}

impl SessionConfig {
    /// Configure a session over already-loaded, shared content.
    pub fn new(catalog: Arc<EncounterCatalog>, gadgets: Arc<GadgetCatalog>) -> Self {
        Self {
            catalog,
            gadgets,
            starting_gadgets: Vec::new(),
            rng_seed: None,
        }
    }

    /// Load content from files. Missing or malformed encounter content is a
    /// hard error; the gadget metadata file is optional.
    pub fn from_files(
        encounters: impl AsRef<Path>,
        gadget_metadata: Option<&Path>,
    ) -> Result<Self, SessionError> {
        let mut catalog = EncounterCatalog::new();
        catalog.load_file(encounters)?;

        let mut gadgets = GadgetCatalog::new();
        if let Some(path) = gadget_metadata {
            let raw = std::fs::read_to_string(path).map_err(ContentError::Io)?;
            let value = serde_json::from_str(&raw).map_err(ContentError::Json)?;
            gadgets.load_value(value).map_err(ContentError::Json)?;
        }

        Ok(Self::new(Arc::new(catalog), Arc::new(gadgets)))
    }

    /// Grant a gadget at game start.
    pub fn with_starting_gadget(mut self, id: impl Into<String>, amount: u32) -> Self {
        self.starting_gadgets.push((id.into(), amount));
        self
    }

    /// Seed the encounter draw rng for reproducible runs.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }
}

/// What one resolved turn did.
#[derive(Debug, Clone)]
pub struct TurnReport {
    /// Identifier of the choice the input resolved to (possibly a failure
    /// variant).
    pub choice_id: String,
    /// Short text of that choice.
    pub choice_text: String,
    /// Narrative for the resolution: story text or a templated sentence.
    pub story: String,
    /// State mutations and termination outcome.
    pub outcome: ApplyOutcome,
    /// The next encounter drawn after a non-terminal turn.
    pub next_encounter_id: Option<String>,
}

/// One player's game: engine plus resolver.
pub struct GameSession {
    engine: GameEngine,
    resolver: ChoiceResolver,
}

impl GameSession {
    /// Create a session that resolves input with the lexical fallback only.
    pub fn new(config: SessionConfig) -> Self {
        Self::build(config, ChoiceResolver::new())
    }

    /// Create a session that consults a classifier before the fallback.
    pub fn with_classifier(config: SessionConfig, classifier: Box<dyn ChoiceClassifier>) -> Self {
        Self::build(config, ChoiceResolver::with_classifier(classifier))
    }

    fn build(config: SessionConfig, resolver: ChoiceResolver) -> Self {
        let mut engine = GameEngine::new(config.catalog, config.gadgets);
        if let Some(seed) = config.rng_seed {
            engine = engine.with_rng_seed(seed);
        }
        for (id, amount) in config.starting_gadgets {
            engine.state_mut().gadgets.acquire(id, amount);
        }
        Self { engine, resolver }
    }

    /// Draw and activate the first encounter.
    ///
    /// None means the catalog has no eligible content.
    pub fn start(&mut self) -> Option<&Encounter> {
        self.engine.trigger(None)
    }

    /// The currently active encounter.
    pub fn current_encounter(&self) -> Option<&Encounter> {
        self.engine.current_encounter()
    }

    /// Choices of the active encounter the player currently qualifies for.
    pub fn available_choices(&self) -> Vec<&Choice> {
        self.engine.available_choices()
    }

    /// Resolve player text against the active encounter, apply the result,
    /// and draw the next encounter when the game continues.
    pub async fn resolve_and_apply(&mut self, input: &str) -> Result<TurnReport, SessionError> {
        if self.engine.is_game_over() {
            return Err(SessionError::GameOver);
        }
        if input.trim().is_empty() {
            return Err(SessionError::EmptyInput);
        }

        let encounter = self
            .engine
            .current_encounter()
            .ok_or(SessionError::NoActiveEncounter)?
            .clone();

        if self.engine.available_choices().is_empty() {
            return Err(SessionError::NoChoices);
        }

        // Resolution runs over the full choice list so unmet-requirement
        // paths can land on their failure variants.
        let scenario = Scenario::from_encounter(&encounter);
        let state = self.engine.state();
        let resolved = self
            .resolver
            .resolve(
                input,
                &encounter.choices,
                &scenario,
                &state.gadgets,
                &state.resources,
            )
            .await
            .ok_or(SessionError::NoChoices)?
            .clone();

        let story = self.resolver.explain(&resolved);
        let outcome = self.engine.apply(&resolved);

        let next_encounter_id = if outcome.game_over {
            None
        } else {
            self.engine.trigger(None).map(|next| next.id.clone())
        };

        Ok(TurnReport {
            choice_id: resolved.id,
            choice_text: resolved.text,
            story,
            outcome,
            next_encounter_id,
        })
    }

    /// Serializable view of the player's state.
    pub fn snapshot(&self) -> Snapshot {
        self.engine.snapshot()
    }

    /// Whether the game has ended.
    pub fn is_game_over(&self) -> bool {
        self.engine.is_game_over()
    }

    /// Why the game ended, when it has.
    pub fn game_over_reason(&self) -> Option<String> {
        self.engine.game_over_reason()
    }

    /// The underlying engine.
    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    /// Mutable engine access, for setup and tests.
    pub fn engine_mut(&mut self) -> &mut GameEngine {
        &mut self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config_with(content: serde_json::Value) -> SessionConfig {
        let mut catalog = EncounterCatalog::new();
        catalog.load_value(content).unwrap();
        SessionConfig::new(Arc::new(catalog), Arc::new(GadgetCatalog::new())).with_rng_seed(3)
    }

    fn lethal_content() -> serde_json::Value {
        json!([{
            "id": "enc_cold",
            "name": "한파",
            "description": "밤이 깊어지고 기온이 떨어진다.",
            "choices": [{
                "id": "choice_endure",
                "text": "버틴다",
                "results": { "resources": { "health": -1 } }
            }]
        }])
    }

    #[tokio::test]
    async fn test_three_hits_then_death() {
        let mut session = GameSession::new(config_with(lethal_content()));
        assert!(session.start().is_some());

        for expected_over in [false, false, true] {
            let report = session.resolve_and_apply("버틴다").await.unwrap();
            assert_eq!(report.outcome.game_over, expected_over);
        }

        assert!(session.is_game_over());
        assert!(session.game_over_reason().unwrap().contains("체력"));
        assert_eq!(session.snapshot().turn, 3);
    }

    #[tokio::test]
    async fn test_next_encounter_drawn_after_turn() {
        let mut session = GameSession::new(config_with(json!([{
            "id": "enc_walk",
            "description": "거리를 걷는다.",
            "choices": [{ "id": "choice_on", "text": "계속 간다" }]
        }])));
        session.start().unwrap();

        let report = session.resolve_and_apply("계속 간다").await.unwrap();
        assert_eq!(report.next_encounter_id.as_deref(), Some("enc_walk"));
        assert_eq!(session.engine().state().history.len(), 2);
    }

    #[tokio::test]
    async fn test_no_next_encounter_after_game_over() {
        let mut session = GameSession::new(config_with(json!([{
            "id": "enc_end",
            "choices": [{
                "id": "choice_doom",
                "text": "어둠 속으로",
                "results": { "resources": { "mental": -3 } }
            }]
        }])));
        session.start().unwrap();

        let report = session.resolve_and_apply("어둠 속으로 간다").await.unwrap();
        assert!(report.outcome.game_over);
        assert!(report.next_encounter_id.is_none());

        let after = session.resolve_and_apply("다시").await;
        assert!(matches!(after, Err(SessionError::GameOver)));
    }

    #[tokio::test]
    async fn test_empty_input_rejected() {
        let mut session = GameSession::new(config_with(lethal_content()));
        session.start().unwrap();
        assert!(matches!(
            session.resolve_and_apply("  ").await,
            Err(SessionError::EmptyInput)
        ));
    }

    #[tokio::test]
    async fn test_no_active_encounter() {
        let mut session = GameSession::new(config_with(lethal_content()));
        // start() never called
        assert!(matches!(
            session.resolve_and_apply("버틴다").await,
            Err(SessionError::NoActiveEncounter)
        ));
    }

    #[tokio::test]
    async fn test_no_available_choices() {
        let mut session = GameSession::new(config_with(json!([{
            "id": "enc_locked",
            "choices": [{
                "id": "choice_open",
                "text": "연다",
                "requirements": { "gadgets": ["keycard"] }
            }]
        }])));
        session.start().unwrap();
        assert!(matches!(
            session.resolve_and_apply("연다").await,
            Err(SessionError::NoChoices)
        ));
    }

    #[tokio::test]
    async fn test_starting_gadgets_granted() {
        let config = config_with(lethal_content()).with_starting_gadget("근력", 1);
        let session = GameSession::new(config);
        assert!(session.engine().state().gadgets.has("근력"));
    }

    #[test]
    fn test_missing_content_file_is_fatal() {
        let result = SessionConfig::from_files("/nonexistent/encounters.json", None);
        assert!(matches!(result, Err(SessionError::Content(_))));
    }
}
