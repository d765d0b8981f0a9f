//! Turn-based survival narrative engine with LLM choice mapping.
//!
//! This crate provides:
//! - A deterministic rules engine: bounded resources, stackable gadgets,
//!   narrative flags, weighted encounter selection, death detection
//! - Choice resolution from free-form player text, with an injected
//!   classifier tier (Upstage Solar) over a deterministic lexical fallback
//! - A session API composing the two for transports and UIs
//!
//! # Quick Start
//!
//! ```ignore
//! use ashfall_core::{GameSession, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SessionConfig::from_files("data/encounters.json", None)?;
//!     let mut session = GameSession::new(config);
//!
//!     let encounter = session.start().expect("no content");
//!     println!("{}", encounter.description);
//!
//!     let report = session.resolve_and_apply("도망갈게").await?;
//!     println!("{}", report.story);
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod encounter;
pub mod engine;
pub mod flag;
pub mod gadget;
pub mod resolver;
pub mod resource;
pub mod session;
pub mod testing;

// Primary public API
pub use catalog::{ContentError, EncounterCatalog};
pub use encounter::{Choice, Conditions, Encounter, Message, Requirements, Results};
pub use engine::{ApplyOutcome, DeathCause, GameEngine, GameState, Snapshot};
pub use flag::{FlagAction, FlagOp, FlagStore};
pub use gadget::{GadgetAction, GadgetCatalog, GadgetInventory, GadgetOp};
pub use resolver::{ChoiceClassifier, ChoiceResolver, Scenario, SolarClassifier};
pub use resource::{ResourceKind, ResourceLedger};
pub use session::{GameSession, SessionConfig, SessionError, TurnReport};
