//! Content veto filters.
//!
//! Vetoes are hard: a vetoed candidate is dropped regardless of its score.

pub mod avoidance;
pub mod comfort_block;

// Re-export for convenience
pub use avoidance::AvoidanceFilter;
pub use comfort_block::ComfortBlockFilter;
