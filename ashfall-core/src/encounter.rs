//! Encounter content types: scripted situations and their choices.
//!
//! These types mirror the JSON content format. Parsing is strict at the
//! boundary: unknown resource names, gadget verbs, or flag verbs are load
//! errors, not values to be skipped at apply time.

use crate::flag::FlagAction;
use crate::gadget::{GadgetAction, GadgetInventory};
use crate::resource::{ResourceKind, ResourceLedger};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Gating conditions on offering a choice or accepting it.
///
/// Both categories must hold when both are present; within the gadget list
/// owning any one entry is enough.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Requirements {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gadgets: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<BTreeMap<ResourceKind, i64>>,
}

impl Requirements {
    /// Whether the player's current state satisfies these requirements.
    pub fn satisfied_by(&self, inventory: &GadgetInventory, ledger: &ResourceLedger) -> bool {
        if let Some(gadgets) = &self.gadgets {
            if !inventory.satisfies(gadgets) {
                return false;
            }
        }
        if let Some(resources) = &self.resources {
            if !ledger.meets(resources) {
                return false;
            }
        }
        true
    }
}

/// Declared state mutations applied when a choice is taken.
///
/// Each category is explicitly optional; an absent category is distinct
/// from an empty one and round-trips as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Results {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<BTreeMap<ResourceKind, i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gadgets: Option<Vec<GadgetAction>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<Vec<FlagAction>>,
}

impl Results {
    /// Whether the results declare any gadget mutation.
    ///
    /// The resolver uses this to decide when to show a choice's gadget
    /// requirement to the classifier.
    pub fn touches_gadgets(&self) -> bool {
        self.gadgets.as_ref().is_some_and(|actions| !actions.is_empty())
    }
}

/// A player-selectable action within an encounter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<Requirements>,
    #[serde(default)]
    pub results: Results,
}

impl Choice {
    /// Whether the player's current state meets this choice's requirements.
    pub fn requirements_met(&self, inventory: &GadgetInventory, ledger: &ResourceLedger) -> bool {
        self.requirements
            .as_ref()
            .map(|req| req.satisfied_by(inventory, ledger))
            .unwrap_or(true)
    }

    /// Text the resolver scores against: description, or the short text
    /// when no description was authored.
    pub fn match_text(&self) -> &str {
        if self.description.is_empty() {
            &self.text
        } else {
            &self.description
        }
    }

    fn normalize(&mut self) {
        if self.description.is_empty() {
            self.description = self.text.clone();
        }
    }
}

/// One display message in an encounter: a chat bubble or an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Message {
    Text {
        content: String,
    },
    Image {
        url: String,
        #[serde(default)]
        alt: String,
    },
}

/// Conditions gating whether an encounter can be drawn at all.
///
/// Evaluated against the player's current inventory, not any choice's.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conditions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gadgets: Option<Vec<String>>,
}

fn default_kind() -> String {
    "basic".to_string()
}

fn default_weight() -> u32 {
    1
}

/// A scripted situation offering a set of choices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Encounter {
    /// Absent or empty ids are rejected by the catalog loader.
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub conditions: Conditions,
    #[serde(default = "default_weight")]
    pub weight: u32,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub choices: Vec<Choice>,
}

impl Encounter {
    /// Whether this encounter may be drawn given the player's inventory.
    ///
    /// An encounter without a gadget condition is always eligible.
    pub fn is_eligible(&self, inventory: &GadgetInventory) -> bool {
        self.conditions
            .gadgets
            .as_ref()
            .map(|gadgets| inventory.satisfies(gadgets))
            .unwrap_or(true)
    }

    /// Choices whose own requirements the player currently meets.
    pub fn available_choices(
        &self,
        inventory: &GadgetInventory,
        ledger: &ResourceLedger,
    ) -> Vec<&Choice> {
        self.choices
            .iter()
            .filter(|choice| choice.requirements_met(inventory, ledger))
            .collect()
    }

    /// Fill defaults that depend on other fields: choice descriptions and
    /// the synthesized message when none were authored.
    pub(crate) fn normalize(&mut self) {
        for choice in &mut self.choices {
            choice.normalize();
        }
        if self.messages.is_empty() {
            self.messages = vec![Message::Text {
                content: self.description.clone(),
            }];
        }
    }
}
