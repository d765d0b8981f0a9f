//! Player resources: three bounded counters with death detection.
//!
//! Vitality and composure start full; running either down to zero ends the
//! game. Currency starts empty, floors at zero, and refuses further gains
//! once it hits its cap.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The three player resources.
///
/// Serialized with the content-format names used by encounter documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    #[serde(rename = "health")]
    Vitality,
    #[serde(rename = "mental")]
    Composure,
    #[serde(rename = "money")]
    Currency,
}

impl ResourceKind {
    /// All resource kinds, in display order.
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::Vitality,
        ResourceKind::Composure,
        ResourceKind::Currency,
    ];

    /// Maximum value for this resource.
    pub fn cap(&self) -> i64 {
        3
    }

    /// Content-format name for this resource.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Vitality => "health",
            ResourceKind::Composure => "mental",
            ResourceKind::Currency => "money",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The player's resource counters, each clamped to `[0, cap]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLedger {
    #[serde(rename = "health")]
    vitality: i64,
    #[serde(rename = "mental")]
    composure: i64,
    #[serde(rename = "money")]
    currency: i64,
}

impl Default for ResourceLedger {
    fn default() -> Self {
        Self {
            vitality: ResourceKind::Vitality.cap(),
            composure: ResourceKind::Composure.cap(),
            currency: 0,
        }
    }
}

impl ResourceLedger {
    /// Create a ledger with the default starting values (3/3/0).
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a resource.
    pub fn get(&self, kind: ResourceKind) -> i64 {
        match kind {
            ResourceKind::Vitality => self.vitality,
            ResourceKind::Composure => self.composure,
            ResourceKind::Currency => self.currency,
        }
    }

    /// Set a resource, clamping into `[0, cap]`.
    pub fn set(&mut self, kind: ResourceKind, value: i64) {
        let value = value.clamp(0, kind.cap());
        match kind {
            ResourceKind::Vitality => self.vitality = value,
            ResourceKind::Composure => self.composure = value,
            ResourceKind::Currency => self.currency = value,
        }
    }

    /// Apply a signed delta to a resource, clamping the result.
    ///
    /// Returns false without changing anything for the one refused case:
    /// a positive currency delta while currency is already at its cap.
    pub fn change(&mut self, kind: ResourceKind, delta: i64) -> bool {
        let current = self.get(kind);

        if kind == ResourceKind::Currency && current >= kind.cap() && delta > 0 {
            return false;
        }

        self.set(kind, current.saturating_add(delta));
        true
    }

    /// Whether every listed minimum is met.
    pub fn meets(&self, minimums: &BTreeMap<ResourceKind, i64>) -> bool {
        minimums.iter().all(|(kind, min)| self.get(*kind) >= *min)
    }

    /// Whether the player is dead: vitality or composure depleted.
    ///
    /// Currency has no death condition.
    pub fn is_dead(&self) -> bool {
        self.vitality <= 0 || self.composure <= 0
    }
}
