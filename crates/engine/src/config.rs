//! Engine configuration.

use dialogue::{
    AggregationPolicy, DEFAULT_MINIMUM_SLOTS, DEFAULT_READINESS_THRESHOLD, DEFAULT_SEEN_CAPACITY,
    DEFAULT_SESSION_CAPACITY,
};
use retrieval::{DEFAULT_QUERY_LIMIT, DEFAULT_QUERY_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::EngineError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Confidence at which the controller stops asking
    pub readiness_threshold: f32,
    /// Filled slots at which the controller stops asking
    pub minimum_slots: usize,
    /// Titles remembered per session
    pub seen_capacity: usize,
    /// Live sessions kept in memory
    pub session_capacity: usize,
    pub default_top_k: usize,
    pub max_top_k: usize,
    pub classifier_timeout: Duration,
    pub query_timeout: Duration,
    /// Row limit per knowledge-store query
    pub query_limit: usize,
    /// How many of the ranked genres are sent to retrieval
    pub genre_query_count: usize,
    pub aggregation: AggregationPolicy,
    pub cross_slot_detection: bool,
    /// First year counted as modern
    pub modern_cutoff: u16,
    /// Fixed seed for question choice and shuffling
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            readiness_threshold: DEFAULT_READINESS_THRESHOLD,
            minimum_slots: DEFAULT_MINIMUM_SLOTS,
            seen_capacity: DEFAULT_SEEN_CAPACITY,
            session_capacity: DEFAULT_SESSION_CAPACITY,
            default_top_k: 5,
            max_top_k: 20,
            classifier_timeout: Duration::from_secs(15),
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            query_limit: DEFAULT_QUERY_LIMIT,
            genre_query_count: 5,
            aggregation: AggregationPolicy::Mean,
            cross_slot_detection: true,
            modern_cutoff: catalog::DEFAULT_MODERN_CUTOFF,
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn with_readiness_threshold(mut self, threshold: f32) -> Self {
        self.readiness_threshold = threshold;
        self
    }

    pub fn with_minimum_slots(mut self, minimum_slots: usize) -> Self {
        self.minimum_slots = minimum_slots;
        self
    }

    pub fn with_seen_capacity(mut self, capacity: usize) -> Self {
        self.seen_capacity = capacity;
        self
    }

    pub fn with_session_capacity(mut self, capacity: usize) -> Self {
        self.session_capacity = capacity;
        self
    }

    pub fn with_top_k(mut self, default_top_k: usize) -> Self {
        self.default_top_k = default_top_k;
        self
    }

    pub fn with_classifier_timeout(mut self, timeout: Duration) -> Self {
        self.classifier_timeout = timeout;
        self
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    pub fn with_aggregation(mut self, policy: AggregationPolicy) -> Self {
        self.aggregation = policy;
        self
    }

    pub fn with_cross_slot_detection(mut self, enabled: bool) -> Self {
        self.cross_slot_detection = enabled;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if !(0.0..=1.0).contains(&self.readiness_threshold) {
            return Err(EngineError::InvalidConfig(format!(
                "readiness_threshold must be within [0, 1], got {}",
                self.readiness_threshold
            )));
        }
        if self.default_top_k == 0 || self.default_top_k > self.max_top_k {
            return Err(EngineError::InvalidConfig(format!(
                "default_top_k must be within 1..={}, got {}",
                self.max_top_k, self.default_top_k
            )));
        }
        if self.seen_capacity == 0 || self.session_capacity == 0 {
            return Err(EngineError::InvalidConfig("capacities must be positive".to_string()));
        }
        if self.genre_query_count == 0 {
            return Err(EngineError::InvalidConfig("genre_query_count must be positive".to_string()));
        }
        if let AggregationPolicy::Decay { factor } = self.aggregation {
            if !(factor > 0.0 && factor <= 1.0) {
                return Err(EngineError::InvalidConfig(format!(
                    "decay factor must be within (0, 1], got {factor}"
                )));
            }
        }
        Ok(())
    }

    /// Requested result count, defaulted and capped
    pub fn resolve_top_k(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.default_top_k).min(self.max_top_k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.readiness_threshold, 0.9);
        assert_eq!(config.minimum_slots, 3);
        assert_eq!(config.seen_capacity, 50);
        assert_eq!(config.query_timeout, Duration::from_secs(15));
        assert_eq!(config.aggregation, AggregationPolicy::Mean);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(EngineConfig::default().with_readiness_threshold(1.5).validate().is_err());
        assert!(EngineConfig::default().with_top_k(0).validate().is_err());
        assert!(EngineConfig::default().with_top_k(50).validate().is_err());
        assert!(
            EngineConfig::default()
                .with_aggregation(AggregationPolicy::Decay { factor: 0.0 })
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_resolve_top_k() {
        let config = EngineConfig::default();
        assert_eq!(config.resolve_top_k(None), 5);
        assert_eq!(config.resolve_top_k(Some(3)), 3);
        assert_eq!(config.resolve_top_k(Some(500)), 20);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{ "minimum_slots": 5, "seed": 7 }"#).unwrap();
        assert_eq!(config.minimum_slots, 5);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.default_top_k, 5);
    }
}
