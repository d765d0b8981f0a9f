//! Narrative flags: boolean markers with a persistent subset.
//!
//! Flags gate nothing inside the engine today; they exist for content to
//! record story beats. The persistent subset is tracked but carries no
//! behavior beyond being queryable.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Flag mutation verbs allowed in choice results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagOp {
    Set,
    Unset,
    Toggle,
}

/// One flag mutation declared by a choice's results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagAction {
    pub flag: String,
    pub action: FlagOp,
    #[serde(default)]
    pub persistent: bool,
}

/// The set of flags currently raised for one player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagStore {
    flags: BTreeSet<String>,
    persistent: BTreeSet<String>,
}

impl FlagStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise a flag, optionally marking it persistent.
    pub fn set(&mut self, flag: impl Into<String>, persistent: bool) {
        let flag = flag.into();
        if persistent {
            self.persistent.insert(flag.clone());
        }
        self.flags.insert(flag);
    }

    /// Clear a flag, including its persistent marker.
    pub fn unset(&mut self, flag: &str) {
        self.flags.remove(flag);
        self.persistent.remove(flag);
    }

    /// Flip a flag.
    pub fn toggle(&mut self, flag: &str, persistent: bool) {
        if self.is_set(flag) {
            self.unset(flag);
        } else {
            self.set(flag, persistent);
        }
    }

    /// Whether a flag is currently raised.
    pub fn is_set(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    /// Whether every listed flag is raised.
    pub fn all_set<S: AsRef<str>>(&self, flags: &[S]) -> bool {
        flags.iter().all(|flag| self.is_set(flag.as_ref()))
    }

    /// Whether any listed flag is raised.
    pub fn any_set<S: AsRef<str>>(&self, flags: &[S]) -> bool {
        flags.iter().any(|flag| self.is_set(flag.as_ref()))
    }

    /// All raised flags.
    pub fn all(&self) -> &BTreeSet<String> {
        &self.flags
    }

    /// The persistent subset.
    pub fn persistent(&self) -> &BTreeSet<String> {
        &self.persistent
    }

    /// Apply a batch of declared flag actions in order.
    pub fn apply(&mut self, actions: &[FlagAction]) {
        for action in actions {
            match action.action {
                FlagOp::Set => self.set(action.flag.clone(), action.persistent),
                FlagOp::Unset => self.unset(&action.flag),
                FlagOp::Toggle => self.toggle(&action.flag, action.persistent),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_unset() {
        let mut flags = FlagStore::new();
        flags.set("met_trader", false);
        assert!(flags.is_set("met_trader"));

        flags.unset("met_trader");
        assert!(!flags.is_set("met_trader"));
    }

    #[test]
    fn test_persistent_subset() {
        let mut flags = FlagStore::new();
        flags.set("found_shelter", true);
        flags.set("heard_rumor", false);

        assert!(flags.persistent().contains("found_shelter"));
        assert!(!flags.persistent().contains("heard_rumor"));

        flags.unset("found_shelter");
        assert!(flags.persistent().is_empty());
    }

    #[test]
    fn test_toggle() {
        let mut flags = FlagStore::new();
        flags.toggle("alarm", false);
        assert!(flags.is_set("alarm"));
        flags.toggle("alarm", false);
        assert!(!flags.is_set("alarm"));
    }

    #[test]
    fn test_batch_apply() {
        let mut flags = FlagStore::new();
        flags.apply(&[
            FlagAction {
                flag: "a".into(),
                action: FlagOp::Set,
                persistent: true,
            },
            FlagAction {
                flag: "b".into(),
                action: FlagOp::Toggle,
                persistent: false,
            },
            FlagAction {
                flag: "a".into(),
                action: FlagOp::Unset,
                persistent: false,
            },
        ]);

        assert!(!flags.is_set("a"));
        assert!(flags.is_set("b"));
        assert!(flags.persistent().is_empty());
    }

    #[test]
    fn test_all_any() {
        let mut flags = FlagStore::new();
        flags.set("a", false);
        flags.set("b", false);
        assert!(flags.all_set(&["a", "b"]));
        assert!(!flags.all_set(&["a", "c"]));
        assert!(flags.any_set(&["c", "b"]));
        assert!(!flags.any_set(&["c", "d"]));
    }
}
