//! The game engine: one player's state and the encounter-choice-result loop.
//!
//! The engine is a synchronous state machine. It draws encounters from a
//! shared catalog, filters choices by requirements, applies declared
//! results, and detects death. Resolution of free-form input lives in the
//! resolver; the session module composes the two.

use crate::catalog::EncounterCatalog;
use crate::encounter::{Choice, Encounter, Results};
use crate::flag::FlagStore;
use crate::gadget::{GadgetCatalog, GadgetInventory};
use crate::resource::{ResourceKind, ResourceLedger};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Which resource depletion ended the game.
///
/// Vitality is checked first, so it wins when both deplete on the same turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    VitalityDepleted,
    ComposureDepleted,
}

impl fmt::Display for DeathCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeathCause::VitalityDepleted => f.write_str("체력이 0이 되어 사망했습니다."),
            DeathCause::ComposureDepleted => {
                f.write_str("멘탈이 0이 되어 스트레스로 사망했습니다.")
            }
        }
    }
}

/// What applying a choice did.
#[derive(Debug, Clone)]
pub struct ApplyOutcome {
    /// The declared results that were applied.
    pub results: Results,
    /// Whether the game ended on this turn.
    pub game_over: bool,
    /// The cause, when it did.
    pub cause: Option<DeathCause>,
}

/// One player's mutable state. Never shared across sessions.
#[derive(Debug, Clone)]
pub struct GameState {
    pub resources: ResourceLedger,
    pub gadgets: GadgetInventory,
    pub flags: FlagStore,
    pub turn: u32,
    pub level: u32,
    current_encounter: Option<String>,
    pub history: Vec<String>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            resources: ResourceLedger::new(),
            gadgets: GadgetInventory::new(),
            flags: FlagStore::new(),
            turn: 0,
            level: 1,
            current_encounter: None,
            history: Vec::new(),
        }
    }
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Serializable view of the game state for transports and UIs.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub resources: ResourceLedger,
    pub gadgets: HashMap<String, u32>,
    pub flags: Vec<String>,
    pub turn: u32,
    pub level: u32,
}

/// Drives encounter-choice-result cycles for one player.
pub struct GameEngine {
    catalog: Arc<EncounterCatalog>,
    gadget_catalog: Arc<GadgetCatalog>,
    state: GameState,
    rng: StdRng,
    game_over: bool,
    cause: Option<DeathCause>,
}

impl GameEngine {
    /// Create an engine over shared, read-only content.
    pub fn new(catalog: Arc<EncounterCatalog>, gadget_catalog: Arc<GadgetCatalog>) -> Self {
        Self {
            catalog,
            gadget_catalog,
            state: GameState::new(),
            rng: StdRng::from_entropy(),
            game_over: false,
            cause: None,
        }
    }

    /// Seed the draw rng, for reproducible runs and tests.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// The player's state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Mutable access to the player's state.
    ///
    /// Direct modifications bypass the rules; intended for setup (starting
    /// gadgets) and tests.
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    /// Gadget display metadata.
    pub fn gadget_catalog(&self) -> &GadgetCatalog {
        &self.gadget_catalog
    }

    /// Activate an encounter: by id when given, otherwise a weighted draw
    /// of type "basic".
    ///
    /// Returns None when the id is unknown or nothing is eligible — that is
    /// "no more content", not an error.
    pub fn trigger(&mut self, id: Option<&str>) -> Option<&Encounter> {
        let encounter = match id {
            Some(id) => self.catalog.get(id),
            None => self.catalog.draw("basic", &self.state.gadgets, &mut self.rng),
        }?;

        self.state.current_encounter = Some(encounter.id.clone());
        self.state.history.push(encounter.id.clone());
        Some(encounter)
    }

    /// The currently active encounter, if any.
    pub fn current_encounter(&self) -> Option<&Encounter> {
        self.state
            .current_encounter
            .as_deref()
            .and_then(|id| self.catalog.get(id))
    }

    /// Choices of the active encounter whose requirements the player meets.
    ///
    /// May be empty; the caller must detect that rather than expect the
    /// engine to advance on its own.
    pub fn available_choices(&self) -> Vec<&Choice> {
        self.current_encounter()
            .map(|encounter| {
                encounter.available_choices(&self.state.gadgets, &self.state.resources)
            })
            .unwrap_or_default()
    }

    /// Apply a choice's declared results and advance the turn.
    ///
    /// Order: resource deltas, gadget actions in list order, flag actions,
    /// turn increment, death check. A refused currency gain or a lose on a
    /// never-owned gadget is logged and skipped, never fatal.
    pub fn apply(&mut self, choice: &Choice) -> ApplyOutcome {
        let results = choice.results.clone();

        if let Some(deltas) = &results.resources {
            for (kind, delta) in deltas {
                if !self.state.resources.change(*kind, *delta) {
                    tracing::debug!(resource = %kind, delta, "resource change refused at cap");
                }
            }
        }

        if let Some(actions) = &results.gadgets {
            for action in actions {
                if !self.state.gadgets.apply(action) {
                    tracing::debug!(gadget = %action.id, "lose on a gadget never owned");
                }
            }
        }

        if let Some(actions) = &results.flags {
            self.state.flags.apply(actions);
        }

        self.state.turn += 1;

        if self.state.resources.is_dead() {
            self.game_over = true;
            self.cause = if self.state.resources.get(ResourceKind::Vitality) <= 0 {
                Some(DeathCause::VitalityDepleted)
            } else {
                Some(DeathCause::ComposureDepleted)
            };
            tracing::info!(turn = self.state.turn, cause = ?self.cause, "game over");
        }

        ApplyOutcome {
            results,
            game_over: self.game_over,
            cause: self.cause,
        }
    }

    /// Whether the game has ended.
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Why the game ended, when it has.
    pub fn game_over_reason(&self) -> Option<String> {
        self.cause.map(|cause| cause.to_string())
    }

    /// Serializable view of the current state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            resources: self.state.resources.clone(),
            gadgets: self.state.gadgets.counts().clone(),
            flags: self.state.flags.all().iter().cloned().collect(),
            turn: self.state.turn,
            level: self.state.level,
        }
    }

    /// Discard all player state and start over. Content stays loaded.
    pub fn reset(&mut self) {
        self.state = GameState::new();
        self.game_over = false;
        self.cause = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn engine_with(content: serde_json::Value) -> GameEngine {
        let mut catalog = EncounterCatalog::new();
        catalog.load_value(content).unwrap();
        GameEngine::new(Arc::new(catalog), Arc::new(GadgetCatalog::new())).with_rng_seed(1)
    }

    fn choice_with_results(results: serde_json::Value) -> Choice {
        serde_json::from_value(json!({
            "id": "choice_test",
            "text": "test",
            "results": results
        }))
        .unwrap()
    }

    #[test]
    fn test_trigger_by_id_and_history() {
        let mut engine = engine_with(json!([{ "id": "enc_a" }, { "id": "enc_b" }]));

        let drawn = engine.trigger(Some("enc_b")).unwrap().id.clone();
        assert_eq!(drawn, "enc_b");
        assert_eq!(engine.current_encounter().unwrap().id, "enc_b");
        assert_eq!(engine.state().history, vec!["enc_b"]);

        assert!(engine.trigger(Some("enc_missing")).is_none());
        // A failed trigger leaves the active encounter alone.
        assert_eq!(engine.current_encounter().unwrap().id, "enc_b");
    }

    #[test]
    fn test_trigger_draw_returns_none_on_empty_catalog() {
        let mut engine = engine_with(json!([]));
        assert!(engine.trigger(None).is_none());
    }

    #[test]
    fn test_apply_resource_deltas_and_turn() {
        let mut engine = engine_with(json!([{ "id": "enc" }]));
        let choice = choice_with_results(json!({ "resources": { "health": -1, "money": 2 } }));

        let outcome = engine.apply(&choice);
        assert!(!outcome.game_over);
        assert_eq!(engine.state().resources.get(ResourceKind::Vitality), 2);
        assert_eq!(engine.state().resources.get(ResourceKind::Currency), 2);
        assert_eq!(engine.state().turn, 1);
    }

    #[test]
    fn test_apply_gadget_actions_in_order() {
        let mut engine = engine_with(json!([{ "id": "enc" }]));
        let choice = choice_with_results(json!({
            "gadgets": [
                { "action": "acquire", "id": "rope", "amount": 2 },
                { "action": "lose", "id": "rope", "amount": 1 }
            ]
        }));

        engine.apply(&choice);
        assert_eq!(engine.state().gadgets.count("rope"), 1);
    }

    #[test]
    fn test_apply_flags() {
        let mut engine = engine_with(json!([{ "id": "enc" }]));
        let choice = choice_with_results(json!({
            "flags": [{ "flag": "storm_seen", "action": "set", "persistent": true }]
        }));

        engine.apply(&choice);
        assert!(engine.state().flags.is_set("storm_seen"));
        assert!(engine.state().flags.persistent().contains("storm_seen"));
    }

    #[test]
    fn test_death_after_third_hit() {
        let mut engine = engine_with(json!([{ "id": "enc" }]));
        let hit = choice_with_results(json!({ "resources": { "health": -1 } }));

        assert!(!engine.apply(&hit).game_over);
        assert!(!engine.apply(&hit).game_over);

        let outcome = engine.apply(&hit);
        assert!(outcome.game_over);
        assert_eq!(outcome.cause, Some(DeathCause::VitalityDepleted));
        assert!(engine.is_game_over());
        assert!(engine.game_over_reason().unwrap().contains("체력"));
    }

    #[test]
    fn test_vitality_takes_priority_over_composure() {
        let mut engine = engine_with(json!([{ "id": "enc" }]));
        let both = choice_with_results(json!({ "resources": { "health": -3, "mental": -3 } }));

        let outcome = engine.apply(&both);
        assert_eq!(outcome.cause, Some(DeathCause::VitalityDepleted));
    }

    #[test]
    fn test_composure_death() {
        let mut engine = engine_with(json!([{ "id": "enc" }]));
        let dread = choice_with_results(json!({ "resources": { "mental": -3 } }));

        let outcome = engine.apply(&dread);
        assert_eq!(outcome.cause, Some(DeathCause::ComposureDepleted));
    }

    #[test]
    fn test_available_choices_filtering() {
        let mut engine = engine_with(json!([{
            "id": "enc",
            "choices": [
                { "id": "choice_fight", "text": "싸운다",
                  "requirements": { "gadgets": ["pistol"] } },
                { "id": "choice_run", "text": "도망간다" }
            ]
        }]));

        engine.trigger(Some("enc"));
        let ids: Vec<_> = engine.available_choices().iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids, vec!["choice_run"]);

        engine.state_mut().gadgets.acquire("pistol", 1);
        assert_eq!(engine.available_choices().len(), 2);
    }

    #[test]
    fn test_snapshot_and_reset() {
        let mut engine = engine_with(json!([{ "id": "enc" }]));
        engine.state_mut().gadgets.acquire("crowbar", 1);
        engine.apply(&choice_with_results(json!({ "resources": { "health": -3 } })));

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.turn, 1);
        assert_eq!(snapshot.gadgets.get("crowbar"), Some(&1));

        engine.reset();
        assert!(!engine.is_game_over());
        assert_eq!(engine.state().turn, 0);
        assert!(engine.state().gadgets.counts().is_empty());
    }
}
