//! Candidate scoring against a genre weight vector.

use catalog::Genre;
use rayon::prelude::*;
use retrieval::Candidate;
use std::cmp::Ordering;

use crate::weights::GenreWeights;

/// Fill in `score` (sum of the weights of every genre the candidate was
/// retrieved under) and `best_genre` (its highest-weighted such genre, ties
/// to the earlier label).
///
/// Genres outside the weight vector count as zero.
pub fn score_candidates(mut candidates: Vec<Candidate>, weights: &GenreWeights) -> Vec<Candidate> {
    candidates.par_iter_mut().for_each(|candidate| {
        let weighted: Vec<(Genre, f32)> = candidate
            .genres
            .iter()
            .map(|&genre| (genre, weights.weight(genre).unwrap_or(0.0)))
            .collect();

        candidate.score = weighted.iter().map(|(_, w)| w).sum();
        candidate.best_genre = weighted
            .iter()
            .min_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then_with(|| a.0.cmp(&b.0)))
            .map(|(genre, _)| *genre);
    });
    candidates
}
