//! Genre weighting and candidate ranking.
//!
//! This crate provides:
//! - `GenreWeights`: slot answers + emotion -> signed weight per genre
//! - `score_candidates`: candidate score = sum of its genre weights
//! - `Filter` trait and `FilterPipeline` for hard content vetoes
//! - `Diversifier`: seen/unseen partition, era mixing and backfill
//! - `RankingPipeline`: all of the above in one call
//!
//! ## Architecture
//! Candidates flow through the stages in order:
//! 1. Scoring against the weight vector
//! 2. Veto filters remove content the session must never see
//! 3. Diversification picks k titles and shuffles them
//! 4. Picked titles are recorded as seen and projected for output
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{GenreWeights, RankingContext, RankingPipeline};
//!
//! let weights = GenreWeights::compute(&universe, &session.slots, dominant, selected, mention);
//! let context = RankingContext::new(session.slots.clone());
//! let movies = RankingPipeline::standard()
//!     .rank(candidates, &weights, &context, &mut session.seen_items, 5, &mut rng)?;
//! ```

pub mod diversify;
pub mod filter_pipeline;
pub mod filters;
pub mod ranker;
pub mod scoring;
pub mod traits;
pub mod weights;

// Re-export main types
pub use diversify::Diversifier;
pub use filter_pipeline::FilterPipeline;
pub use ranker::{Recommendation, RankingPipeline};
pub use scoring::score_candidates;
pub use traits::{Filter, RankingContext};
pub use weights::{EMOTION_SEED_BOOST, GenreWeights, NEUTRAL_PRIOR, detect_genre_mention, slot_adjustments};
