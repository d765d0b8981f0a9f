//! Gadgets: stackable capabilities the player accumulates.
//!
//! Items, abilities, and narrative states are all gadgets — an identifier
//! owned in some positive quantity. Requirement lists use OR semantics:
//! owning any one of the listed gadgets satisfies the list.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What a gadget represents, from the metadata document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GadgetKind {
    Item,
    Ability,
    State,
}

/// Static display metadata for one gadget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GadgetInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: GadgetKind,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub stackable: bool,
}

/// Read-only gadget metadata, loaded once and shared across sessions.
///
/// Only affects display; the rules never consult it.
#[derive(Debug, Clone, Default)]
pub struct GadgetCatalog {
    entries: HashMap<String, GadgetInfo>,
}

/// Wrapper shape of the metadata document: `{"gadgets": {...}}`.
#[derive(Deserialize)]
struct GadgetDocument {
    gadgets: HashMap<String, GadgetInfo>,
}

impl GadgetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load metadata from a document that is either a bare map or an object
    /// with a `gadgets` key. Duplicate ids overwrite earlier entries.
    pub fn load_value(&mut self, value: serde_json::Value) -> Result<(), serde_json::Error> {
        let entries = match serde_json::from_value::<GadgetDocument>(value.clone()) {
            Ok(doc) => doc.gadgets,
            Err(_) => serde_json::from_value::<HashMap<String, GadgetInfo>>(value)?,
        };
        self.entries.extend(entries);
        Ok(())
    }

    /// Look up metadata for a gadget.
    pub fn get(&self, id: &str) -> Option<&GadgetInfo> {
        self.entries.get(id)
    }

    /// Display name for a gadget, falling back to the raw id.
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.entries.get(id).map(|info| info.name.as_str()).unwrap_or(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Gadget mutation verbs allowed in choice results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GadgetOp {
    Acquire,
    Lose,
}

/// One gadget mutation declared by a choice's results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GadgetAction {
    pub action: GadgetOp,
    pub id: String,
    #[serde(default = "default_amount")]
    pub amount: u32,
}

fn default_amount() -> u32 {
    1
}

/// The gadgets a player currently owns, by count/level.
///
/// Invariant: a gadget with count zero is absent from the map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GadgetInventory {
    owned: HashMap<String, u32>,
}

impl GadgetInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gain `amount` of a gadget, inserting it if not yet owned.
    ///
    /// A zero amount is a no-op: the map never holds a zero-count entry, so
    /// `has` stays false for gadgets that were never actually gained.
    pub fn acquire(&mut self, id: impl Into<String>, amount: u32) {
        if amount == 0 {
            return;
        }
        *self.owned.entry(id.into()).or_insert(0) += amount;
    }

    /// Lose `amount` of a gadget, removing it when the count reaches zero.
    ///
    /// Returns false without mutating when the gadget was never owned.
    pub fn lose(&mut self, id: &str, amount: u32) -> bool {
        let Some(count) = self.owned.get_mut(id) else {
            return false;
        };
        *count = count.saturating_sub(amount);
        if *count == 0 {
            self.owned.remove(id);
        }
        true
    }

    /// Whether the player owns the gadget at all.
    pub fn has(&self, id: &str) -> bool {
        self.owned.contains_key(id)
    }

    /// Whether the player owns the gadget at at least `level`.
    pub fn has_level(&self, id: &str, level: u32) -> bool {
        self.owned.get(id).is_some_and(|count| *count >= level)
    }

    /// Whether the player owns any of the listed gadgets.
    pub fn has_any<S: AsRef<str>>(&self, ids: &[S]) -> bool {
        ids.iter().any(|id| self.has(id.as_ref()))
    }

    /// OR-semantics requirement check: an empty list is trivially satisfied.
    pub fn satisfies<S: AsRef<str>>(&self, required: &[S]) -> bool {
        required.is_empty() || self.has_any(required)
    }

    /// Current count of a gadget (zero when not owned).
    pub fn count(&self, id: &str) -> u32 {
        self.owned.get(id).copied().unwrap_or(0)
    }

    /// Snapshot of everything owned.
    pub fn counts(&self) -> &HashMap<String, u32> {
        &self.owned
    }

    /// Apply one declared gadget action.
    ///
    /// Returns false when a lose targeted a gadget that was never owned.
    pub fn apply(&mut self, action: &GadgetAction) -> bool {
        match action.action {
            GadgetOp::Acquire => {
                self.acquire(action.id.clone(), action.amount);
                true
            }
            GadgetOp::Lose => self.lose(&action.id, action.amount),
        }
    }
}
