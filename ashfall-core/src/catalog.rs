//! The encounter catalog: loading content and drawing the next situation.
//!
//! Content is loaded once, validated strictly, and shared read-only across
//! sessions. Draws are weighted and never exclude previously seen
//! encounters; repeat-avoidance is the caller's policy, not the catalog's.

use crate::encounter::Encounter;
use crate::gadget::GadgetInventory;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Errors from loading encounter content.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed content: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Encounter '{id}' has invalid weight {weight} (must be >= 1)")]
    InvalidWeight { id: String, weight: u32 },

    #[error("Encounter record is missing an id")]
    MissingId,
}

/// Document shapes accepted by the loader: a bare array of encounters or
/// an object with an `encounters` list.
#[derive(Deserialize)]
#[serde(untagged)]
enum ContentDocument {
    Wrapped { encounters: Vec<Encounter> },
    Bare(Vec<Encounter>),
}

/// The loaded collection of encounters.
///
/// Keyed in id order so that draws over a seeded rng reproduce the same
/// sequence for the same content.
#[derive(Debug, Clone, Default)]
pub struct EncounterCatalog {
    encounters: BTreeMap<String, Encounter>,
}

impl EncounterCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load encounters from a parsed JSON document.
    ///
    /// Later records with a duplicate id overwrite earlier ones.
    pub fn load_value(&mut self, value: serde_json::Value) -> Result<(), ContentError> {
        let records = match serde_json::from_value::<ContentDocument>(value)? {
            ContentDocument::Wrapped { encounters } => encounters,
            ContentDocument::Bare(encounters) => encounters,
        };

        for mut encounter in records {
            if encounter.id.is_empty() {
                return Err(ContentError::MissingId);
            }
            if encounter.weight < 1 {
                return Err(ContentError::InvalidWeight {
                    id: encounter.id,
                    weight: encounter.weight,
                });
            }
            encounter.normalize();
            self.encounters.insert(encounter.id.clone(), encounter);
        }
        Ok(())
    }

    /// Load encounters from a JSON string.
    pub fn load_str(&mut self, raw: &str) -> Result<(), ContentError> {
        self.load_value(serde_json::from_str(raw)?)
    }

    /// Load encounters from a file.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<(), ContentError> {
        let raw = std::fs::read_to_string(path)?;
        self.load_str(&raw)
    }

    /// Look up an encounter by id.
    pub fn get(&self, id: &str) -> Option<&Encounter> {
        self.encounters.get(id)
    }

    pub fn len(&self) -> usize {
        self.encounters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encounters.is_empty()
    }

    /// Draw a random encounter of the given type whose conditions the
    /// player's inventory satisfies, weighted by each encounter's weight.
    ///
    /// Returns None when nothing is eligible — the caller decides whether
    /// that means the game is complete.
    pub fn draw<R: Rng + ?Sized>(
        &self,
        kind: &str,
        inventory: &GadgetInventory,
        rng: &mut R,
    ) -> Option<&Encounter> {
        let eligible: Vec<&Encounter> = self
            .encounters
            .values()
            .filter(|encounter| encounter.kind == kind && encounter.is_eligible(inventory))
            .collect();

        if eligible.is_empty() {
            return None;
        }

        let weights: Vec<u32> = eligible.iter().map(|encounter| encounter.weight).collect();
        // Weights are validated >= 1 at load, so the distribution is valid.
        let index = WeightedIndex::new(&weights).ok()?;
        Some(eligible[index.sample(rng)])
    }
}
