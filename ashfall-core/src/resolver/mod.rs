//! Choice resolution: free-form player text to one discrete choice.
//!
//! Resolution is tiered. A lone candidate short-circuits everything. When a
//! classifier is configured its proposal is reconciled against the
//! candidate ids; on any failure — transport, timeout, bad payload, or a
//! proposal matching nothing — the deterministic lexical fallback decides.
//! Resolution deliberately runs over the encounter's full choice list, not
//! the available subset, so unmet requirements can route to a failure
//! variant.

pub mod classifier;
pub mod fallback;

pub use classifier::{
    CandidateSummary, ChoiceClassifier, ClassifyError, ClassifyRequest, Proposal, SolarClassifier,
};

use crate::encounter::{Choice, Encounter};
use crate::gadget::GadgetInventory;
use crate::resource::ResourceLedger;

/// Suffix naming a choice's failure variant, e.g. `choice_fight_fail`.
const FAILURE_SUFFIX: &str = "_fail";

/// Scenario context handed to the classifier.
#[derive(Debug, Clone, Default)]
pub struct Scenario {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl Scenario {
    /// Context from the active encounter.
    pub fn from_encounter(encounter: &Encounter) -> Self {
        Self {
            name: (!encounter.name.is_empty()).then(|| encounter.name.clone()),
            description: (!encounter.description.is_empty())
                .then(|| encounter.description.clone()),
        }
    }
}

/// Resolves player text to a choice, via classifier when available and the
/// lexical fallback otherwise.
#[derive(Default)]
pub struct ChoiceResolver {
    classifier: Option<Box<dyn ChoiceClassifier>>,
}

impl ChoiceResolver {
    /// A resolver using only the deterministic fallback.
    pub fn new() -> Self {
        Self { classifier: None }
    }

    /// A resolver that consults the given classifier first.
    pub fn with_classifier(classifier: Box<dyn ChoiceClassifier>) -> Self {
        Self {
            classifier: Some(classifier),
        }
    }

    /// Whether a classifier is configured.
    pub fn has_classifier(&self) -> bool {
        self.classifier.is_some()
    }

    /// Resolve player input against an encounter's full choice list.
    ///
    /// Returns None only for blank input or an empty choice list. The
    /// resolved choice may have unmet requirements; when it does and a
    /// `_fail` sibling exists, the sibling is substituted.
    pub async fn resolve<'a>(
        &self,
        input: &str,
        choices: &'a [Choice],
        scenario: &Scenario,
        inventory: &GadgetInventory,
        ledger: &ResourceLedger,
    ) -> Option<&'a Choice> {
        if input.trim().is_empty() {
            return None;
        }
        if choices.is_empty() {
            return None;
        }

        let resolved = if choices.len() == 1 {
            &choices[0]
        } else {
            self.resolve_ambiguous(input, choices, scenario).await?
        };

        Some(self.back_off(resolved, choices, inventory, ledger))
    }

    async fn resolve_ambiguous<'a>(
        &self,
        input: &str,
        choices: &'a [Choice],
        scenario: &Scenario,
    ) -> Option<&'a Choice> {
        if let Some(classifier) = &self.classifier {
            let request = ClassifyRequest {
                player_input: input.to_string(),
                scenario_name: scenario.name.clone(),
                scenario_description: scenario.description.clone(),
                candidates: choices.iter().map(CandidateSummary::from_choice).collect(),
            };

            match classifier.classify(&request).await {
                Ok(proposal) => {
                    if let Some(choice) = reconcile(&proposal.choice_id, choices) {
                        return Some(choice);
                    }
                    tracing::debug!(
                        proposed = %proposal.choice_id,
                        "proposal matched no candidate, using fallback"
                    );
                }
                Err(error) => {
                    tracing::warn!(%error, "classifier failed, using fallback");
                }
            }
        }

        fallback::pick(input, choices)
    }

    /// Substitute the failure variant when the resolved choice's own
    /// requirements are unmet and a `<id>_fail` sibling exists.
    fn back_off<'a>(
        &self,
        resolved: &'a Choice,
        choices: &'a [Choice],
        inventory: &GadgetInventory,
        ledger: &ResourceLedger,
    ) -> &'a Choice {
        if resolved.requirements_met(inventory, ledger) {
            return resolved;
        }

        let failure_id = format!("{}{}", resolved.id, FAILURE_SUFFIX);
        match choices.iter().find(|choice| choice.id == failure_id) {
            Some(failure) => {
                tracing::debug!(from = %resolved.id, to = %failure.id, "failure variant substituted");
                failure
            }
            None => resolved,
        }
    }

    /// Narrative for a resolved choice: its story text when present, else a
    /// templated sentence naming it.
    pub fn explain(&self, choice: &Choice) -> String {
        if let Some(story) = &choice.story {
            let story = story.trim();
            if !story.is_empty() {
                return story.to_string();
            }
        }
        format!("'{}' 선택지를 선택했습니다.", choice.match_text())
    }
}

/// Reconcile a proposed identifier against the candidate list.
///
/// Priority: exact id, 1-based numeric index (`3`, `choice_3`), then
/// substring containment in either direction.
fn reconcile<'a>(proposed: &str, choices: &'a [Choice]) -> Option<&'a Choice> {
    let proposed = proposed.trim();
    if proposed.is_empty() {
        return None;
    }

    if let Some(choice) = choices.iter().find(|choice| choice.id == proposed) {
        return Some(choice);
    }

    let digits = proposed.strip_prefix("choice_").unwrap_or(proposed);
    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(index) = digits.parse::<usize>() {
            if (1..=choices.len()).contains(&index) {
                return Some(&choices[index - 1]);
            }
        }
    }

    choices
        .iter()
        .find(|choice| choice.id.contains(proposed) || proposed.contains(&choice.id))
}
