//! Running emotion estimate per session.
//!
//! ## Algorithm
//!
//! Every turn appends each label's score to the session history, tagged
//! with the turn index. Aggregation then folds the history per label:
//!
//! - `Mean`: arithmetic mean of all observations, recency-agnostic
//! - `Decay { factor }`: `sum(score * factor^age)` where `age` is how many
//!   turns ago the observation arrived, so old turns fade out
//!
//! Confidence is the highest single score ever observed, clamped to [0, 1],
//! and therefore never decreases.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use crate::ontology::EmotionIndividual;
use crate::session::{Observation, Session};

/// Label reported when nothing has been observed
pub const NEUTRAL_LABEL: &str = "neutral";

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum AggregationPolicy {
    #[default]
    Mean,
    Decay { factor: f32 },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EmotionAggregator {
    policy: AggregationPolicy,
}

impl EmotionAggregator {
    pub fn new(policy: AggregationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> AggregationPolicy {
        self.policy
    }

    /// Fold one turn of classifier output into the session.
    ///
    /// Advances the turn counter even when `scores` is empty. Non-finite
    /// scores are ignored and the rest are clamped to [0, 1].
    pub fn update(&self, session: &mut Session, scores: &HashMap<String, f32>) {
        session.turns += 1;
        let turn = session.turns;

        let mut turn_max = 0.0_f32;
        for (label, &score) in scores {
            if !score.is_finite() || label.trim().is_empty() {
                continue;
            }
            let score = score.clamp(0.0, 1.0);
            turn_max = turn_max.max(score);
            session
                .emotion_history
                .entry(label.clone())
                .or_default()
                .push(Observation { turn, score });
        }

        session.confidence = session.confidence.max(turn_max).clamp(0.0, 1.0);
    }

    /// Aggregated score for every label observed so far
    pub fn aggregate(&self, session: &Session) -> BTreeMap<String, f32> {
        session
            .emotion_history
            .iter()
            .filter(|(_, observations)| !observations.is_empty())
            .map(|(label, observations)| (label.clone(), self.fold(observations, session.turns)))
            .collect()
    }

    /// Highest aggregated label; ties go to the lexicographically smaller
    /// label
    pub fn dominant(&self, session: &Session) -> Option<(String, f32)> {
        self.top(session, 1).into_iter().next()
    }

    /// Dominant label, or `neutral` for a session with no signal
    pub fn dominant_label(&self, session: &Session) -> String {
        self.dominant(session)
            .map(|(label, _)| label)
            .unwrap_or_else(|| NEUTRAL_LABEL.to_string())
    }

    /// The `k` strongest labels, descending
    pub fn top(&self, session: &Session, k: usize) -> Vec<(String, f32)> {
        let mut ranked: Vec<(String, f32)> = self.aggregate(session).into_iter().collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        ranked.truncate(k);
        ranked
    }

    /// Strongest aggregated label that has an ontology counterpart
    pub fn dominant_individual(&self, session: &Session) -> Option<EmotionIndividual> {
        self.top(session, usize::MAX)
            .iter()
            .find_map(|(label, _)| EmotionIndividual::from_label(label))
    }

    fn fold(&self, observations: &[Observation], current_turn: u64) -> f32 {
        match self.policy {
            AggregationPolicy::Mean => {
                let sum: f32 = observations.iter().map(|o| o.score).sum();
                sum / observations.len() as f32
            }
            AggregationPolicy::Decay { factor } => observations
                .iter()
                .map(|o| {
                    let age = current_turn.saturating_sub(o.turn).min(i32::MAX as u64) as i32;
                    o.score * factor.powi(age)
                })
                .sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(pairs: &[(&str, f32)]) -> HashMap<String, f32> {
        pairs.iter().map(|(l, s)| (l.to_string(), *s)).collect()
    }

    #[test]
    fn test_mean_aggregation() {
        let aggregator = EmotionAggregator::default();
        let mut session = Session::new("s", 10);
        aggregator.update(&mut session, &scores(&[("sadness", 0.8), ("joy", 0.1)]));
        aggregator.update(&mut session, &scores(&[("sadness", 0.4)]));

        let aggregated = aggregator.aggregate(&session);
        assert!((aggregated["sadness"] - 0.6).abs() < 1e-6);
        assert!((aggregated["joy"] - 0.1).abs() < 1e-6);
        assert_eq!(aggregator.dominant_label(&session), "sadness");
        assert_eq!(session.turns, 2);
    }

    #[test]
    fn test_decay_favours_recent_turns() {
        let aggregator = EmotionAggregator::new(AggregationPolicy::Decay { factor: 0.5 });
        let mut session = Session::new("s", 10);
        aggregator.update(&mut session, &scores(&[("fear", 0.8)]));
        aggregator.update(&mut session, &scores(&[("joy", 0.6)]));

        let aggregated = aggregator.aggregate(&session);
        assert!((aggregated["fear"] - 0.4).abs() < 1e-6);
        assert!((aggregated["joy"] - 0.6).abs() < 1e-6);
        assert_eq!(aggregator.dominant_label(&session), "joy");
    }

    #[test]
    fn test_confidence_is_monotonic_and_bounded() {
        let aggregator = EmotionAggregator::default();
        let mut session = Session::new("s", 10);
        let turns = [
            scores(&[("joy", 0.3)]),
            scores(&[("joy", 1.7)]),
            scores(&[("anger", 0.2)]),
            HashMap::new(),
            scores(&[("fear", f32::NAN)]),
        ];

        let mut previous = 0.0;
        for turn in &turns {
            aggregator.update(&mut session, turn);
            assert!(session.confidence >= previous);
            assert!((0.0..=1.0).contains(&session.confidence));
            previous = session.confidence;
        }
        assert_eq!(session.confidence, 1.0);
        assert!(!session.emotion_history.contains_key("fear"));
    }

    #[test]
    fn test_empty_session_is_neutral() {
        let aggregator = EmotionAggregator::default();
        let session = Session::new("s", 10);
        assert_eq!(aggregator.dominant(&session), None);
        assert_eq!(aggregator.dominant_label(&session), NEUTRAL_LABEL);
        assert_eq!(aggregator.dominant_individual(&session), None);
    }

    #[test]
    fn test_dominant_individual_skips_unmapped_labels() {
        let aggregator = EmotionAggregator::default();
        let mut session = Session::new("s", 10);
        aggregator.update(&mut session, &scores(&[("neutral", 0.9), ("gratitude", 0.5)]));
        assert_eq!(aggregator.dominant_label(&session), "neutral");
        assert_eq!(aggregator.dominant_individual(&session), Some(EmotionIndividual::Uplifting));
    }

    #[test]
    fn test_top_breaks_ties_by_label() {
        let aggregator = EmotionAggregator::default();
        let mut session = Session::new("s", 10);
        aggregator.update(&mut session, &scores(&[("joy", 0.5), ("anger", 0.5), ("fear", 0.1)]));
        let top = aggregator.top(&session, 2);
        assert_eq!(top[0].0, "anger");
        assert_eq!(top[1].0, "joy");
    }
}
