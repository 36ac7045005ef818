//! Core traits for the ranking pipeline.
//!
//! This module defines the Filter trait that allows composable content
//! vetoes, and the context they are evaluated against.

use anyhow::Result;
use catalog::Era;
use dialogue::{SlotId, SlotMap, is_comfort_seeking};
use retrieval::Candidate;

/// What a filter may look at when deciding on candidates
#[derive(Debug, Clone)]
pub struct RankingContext {
    pub slots: SlotMap,
}

impl RankingContext {
    pub fn new(slots: SlotMap) -> Self {
        Self { slots }
    }

    pub fn slot_is(&self, slot: SlotId, value: &str) -> bool {
        self.slots.get(&slot).is_some_and(|v| v.is(value))
    }

    pub fn is_comfort_seeking(&self) -> bool {
        is_comfort_seeking(&self.slots)
    }

    /// Era requested through `era_preference`, if any
    pub fn era_preference(&self) -> Option<Era> {
        if self.slot_is(SlotId::EraPreference, "classic") {
            Some(Era::Classic)
        } else if self.slot_is(SlotId::EraPreference, "modern") {
            Some(Era::Modern)
        } else {
            None
        }
    }
}

/// Core trait for filtering candidates.
///
/// All filters must implement this trait to be used in the FilterPipeline.
///
/// ## Design Note
/// - `Send + Sync` allows filters to be shared across concurrent sessions
/// - Filters take ownership of the Vec<Candidate> and return a filtered Vec
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Apply this filter to a set of candidates.
    ///
    /// # Returns
    /// * `Ok(Vec<Candidate>)` - The filtered candidates
    /// * `Err` - If filtering fails
    fn apply(&self, candidates: Vec<Candidate>, context: &RankingContext) -> Result<Vec<Candidate>>;
}
