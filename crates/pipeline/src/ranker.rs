//! End-to-end ranking of retrieved candidates.

use anyhow::Result;
use dialogue::SeenItems;
use rand::Rng;
use retrieval::Candidate;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::diversify::Diversifier;
use crate::filter_pipeline::FilterPipeline;
use crate::filters::{AvoidanceFilter, ComfortBlockFilter};
use crate::scoring::score_candidates;
use crate::traits::RankingContext;
use crate::weights::GenreWeights;

/// External-facing shape of one recommended movie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    /// Display label of the best matching genre
    pub genre: String,
    pub year: Option<u16>,
}

impl From<&Candidate> for Recommendation {
    fn from(candidate: &Candidate) -> Self {
        let genre = candidate
            .best_genre
            .or_else(|| candidate.genres.first().copied())
            .map(|g| g.label().to_string())
            .unwrap_or_else(|| "Unknown".to_string());

        Self {
            title: candidate.title.clone(),
            genre,
            year: candidate.year,
        }
    }
}

/// score -> content vetoes -> diversify -> record seen -> project
pub struct RankingPipeline {
    filters: FilterPipeline,
    diversifier: Diversifier,
}

impl Default for RankingPipeline {
    fn default() -> Self {
        Self::standard()
    }
}

impl RankingPipeline {
    pub fn new(filters: FilterPipeline, diversifier: Diversifier) -> Self {
        Self { filters, diversifier }
    }

    /// Comfort blocking and explicit avoidance vetoes
    pub fn standard() -> Self {
        let filters = FilterPipeline::new()
            .add_filter(ComfortBlockFilter)
            .add_filter(AvoidanceFilter);
        Self::new(filters, Diversifier::new())
    }

    pub fn with_modern_cutoff(mut self, cutoff: u16) -> Self {
        self.diversifier = self.diversifier.with_modern_cutoff(cutoff);
        self
    }

    /// Rank `candidates` and record the returned titles in `seen`
    #[instrument(skip_all, fields(candidates = candidates.len(), k))]
    pub fn rank<R: Rng + ?Sized>(
        &self,
        candidates: Vec<Candidate>,
        weights: &GenreWeights,
        context: &RankingContext,
        seen: &mut SeenItems,
        k: usize,
        rng: &mut R,
    ) -> Result<Vec<Recommendation>> {
        let scored = score_candidates(candidates, weights);
        let vetted = self.filters.apply(scored, context)?;
        let selected = self
            .diversifier
            .select(vetted, seen, context.era_preference(), k, rng);

        for candidate in &selected {
            seen.record(&candidate.title);
        }
        debug!("Selected {} recommendations", selected.len());

        Ok(selected.iter().map(Recommendation::from).collect())
    }
}
