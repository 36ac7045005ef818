//! Drops dark genres for comfort-seeking sessions.

use crate::traits::{Filter, RankingContext};
use anyhow::Result;
use catalog::Genre;
use retrieval::Candidate;

/// Genres never shown to a session looking for comfort
pub const COMFORT_BLOCKED: [Genre; 3] = [Genre::Horror, Genre::War, Genre::Crime];

/// Removes every candidate carrying a blocked genre when the session is
/// comfort-seeking (direction comforting, outcome feel_better, or a calm or
/// heartwarming comfort style).
pub struct ComfortBlockFilter;

impl Filter for ComfortBlockFilter {
    fn name(&self) -> &str {
        "ComfortBlockFilter"
    }

    fn apply(&self, candidates: Vec<Candidate>, context: &RankingContext) -> Result<Vec<Candidate>> {
        if !context.is_comfort_seeking() {
            return Ok(candidates);
        }

        Ok(candidates
            .into_iter()
            .filter(|candidate| !COMFORT_BLOCKED.iter().any(|g| candidate.has_genre(*g)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dialogue::{SlotId, SlotMap, SlotValue};

    fn pool() -> Vec<Candidate> {
        vec![
            Candidate::new("Paddington", Some(2014), vec![Genre::Comedy, Genre::Children]),
            Candidate::new("Se7en", Some(1995), vec![Genre::Crime, Genre::Thriller]),
            Candidate::new("Das Boot", Some(1981), vec![Genre::War, Genre::Drama]),
        ]
    }

    #[test]
    fn test_blocks_for_comfort_seeking_session() {
        let mut slots = SlotMap::new();
        slots.insert(SlotId::ComfortStyle, SlotValue::plain("calm"));
        let context = RankingContext::new(slots);

        let kept = ComfortBlockFilter.apply(pool(), &context).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "Paddington");
    }

    #[test]
    fn test_passes_through_otherwise() {
        let mut slots = SlotMap::new();
        slots.insert(SlotId::ComfortStyle, SlotValue::plain("uplifting"));
        let context = RankingContext::new(slots);

        assert_eq!(ComfortBlockFilter.apply(pool(), &context).unwrap().len(), 3);
    }
}
