//! Dialogue state for the conversational recommender.
//!
//! This crate owns everything that lives across turns of one conversation:
//!
//! - `Session` and the `SessionStore` that keeps sessions in memory
//! - `EmotionAggregator`, which folds classifier output into a running
//!   estimate and a confidence scalar
//! - the slot registry (`SlotRegistry`) and `SlotFillingController`, which
//!   decides between asking another clarifying question and declaring the
//!   session ready for recommendations
//! - `EmotionIndividual`, the bridge from classifier labels to the emotion
//!   ontology
//!
//! # Example
//!
//! ```
//! use dialogue::{Decision, Session, SlotFillingController};
//! use rand::SeedableRng;
//!
//! let controller = SlotFillingController::default();
//! let mut session = Session::new("demo", 50);
//! let mut rng = rand::rngs::StdRng::seed_from_u64(1);
//!
//! let decision = controller.step(&mut session, "hello", &mut rng);
//! assert!(matches!(decision, Decision::Ask { .. }));
//! ```

pub mod controller;
pub mod emotion;
pub mod error;
pub mod ontology;
pub mod session;
pub mod slots;
pub mod store;
pub mod text;

pub use controller::{
    DEFAULT_MINIMUM_SLOTS, DEFAULT_READINESS_THRESHOLD, Decision, DialogueState, FALLBACK_SLOT, Flow,
    SlotFillingController,
};
pub use emotion::{AggregationPolicy, EmotionAggregator, NEUTRAL_LABEL};
pub use error::DialogueError;
pub use ontology::EmotionIndividual;
pub use session::{DEFAULT_SEEN_CAPACITY, Observation, SeenItems, Session};
pub use slots::{SlotDefinition, SlotId, SlotMap, SlotRegistry, SlotValue, SynonymTarget, is_comfort_seeking};
pub use store::{DEFAULT_SESSION_CAPACITY, InMemorySessionStore, SessionHandle, SessionStore};
