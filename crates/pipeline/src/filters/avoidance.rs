//! Explicit avoidance answers as hard vetoes.

use crate::traits::{Filter, RankingContext};
use anyhow::Result;
use catalog::Genre;
use dialogue::SlotId;
use retrieval::Candidate;

pub const VIOLENT_GENRES: [Genre; 4] = [Genre::Action, Genre::Crime, Genre::War, Genre::Horror];

/// Drops candidates the user asked to avoid:
/// - `violence_tolerance = none` or `content_sensitivity = avoid_violence`:
///   action, crime, war and horror
/// - `content_sensitivity = avoid_horror`: horror
pub struct AvoidanceFilter;

impl AvoidanceFilter {
    fn blocked(context: &RankingContext) -> Vec<Genre> {
        let mut blocked = Vec::new();
        if context.slot_is(SlotId::ViolenceTolerance, "none")
            || context.slot_is(SlotId::ContentSensitivity, "avoid_violence")
        {
            blocked.extend(VIOLENT_GENRES);
        }
        if context.slot_is(SlotId::ContentSensitivity, "avoid_horror") && !blocked.contains(&Genre::Horror) {
            blocked.push(Genre::Horror);
        }
        blocked
    }
}

impl Filter for AvoidanceFilter {
    fn name(&self) -> &str {
        "AvoidanceFilter"
    }

    fn apply(&self, candidates: Vec<Candidate>, context: &RankingContext) -> Result<Vec<Candidate>> {
        let blocked = Self::blocked(context);
        if blocked.is_empty() {
            return Ok(candidates);
        }

        Ok(candidates
            .into_iter()
            .filter(|candidate| !blocked.iter().any(|g| candidate.has_genre(*g)))
            .collect())
    }
}
