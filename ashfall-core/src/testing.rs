//! Testing utilities.
//!
//! `MockClassifier` stands in for the Solar-backed classifier so resolver
//! tiering and full game flows can be tested deterministically without
//! network access.

use crate::resolver::{ChoiceClassifier, ClassifyError, ClassifyRequest, Proposal};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// One scripted classifier outcome.
#[derive(Debug, Clone)]
enum Scripted {
    Proposal(String),
    Failure(String),
}

/// A classifier that replays scripted outcomes in order.
///
/// When the script runs out the last entry repeats; an unscripted mock
/// always reports itself unavailable, which exercises the fallback tier.
#[derive(Default)]
pub struct MockClassifier {
    script: Mutex<Vec<Scripted>>,
    next: AtomicUsize,
    calls: Arc<AtomicUsize>,
}

impl MockClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a successful proposal.
    pub fn with_proposal(self, choice_id: impl Into<String>) -> Self {
        self.script
            .lock()
            .expect("mock script lock")
            .push(Scripted::Proposal(choice_id.into()));
        self
    }

    /// Script a classification failure.
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.script
            .lock()
            .expect("mock script lock")
            .push(Scripted::Failure(message.into()));
        self
    }

    /// Shared counter of classify calls, for asserting tiers short-circuit.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl ChoiceClassifier for MockClassifier {
    async fn classify(&self, _request: &ClassifyRequest) -> Result<Proposal, ClassifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let script = self.script.lock().expect("mock script lock");
        if script.is_empty() {
            return Err(ClassifyError::Unavailable(
                "no scripted response".to_string(),
            ));
        }

        let index = self.next.fetch_add(1, Ordering::SeqCst).min(script.len() - 1);
        match &script[index] {
            Scripted::Proposal(choice_id) => Ok(Proposal {
                choice_id: choice_id.clone(),
            }),
            Scripted::Failure(message) => Err(ClassifyError::Unavailable(message.clone())),
        }
    }
}
