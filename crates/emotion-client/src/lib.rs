//! Emotion classifier collaborators.
//!
//! The recommender treats emotion classification as an opaque oracle:
//! text in, per-label scores in [0, 1] out. This crate provides:
//! - the `EmotionClassifier` trait the engine depends on
//! - `GrpcEmotionClassifier`, a tonic client for the model service
//!   described in `proto/emotion.proto`
//! - `KeywordEmotionClassifier`, an offline lexicon fallback
//!
//! Callers are expected to treat any error as "no signal this turn".

use async_trait::async_trait;
use std::collections::HashMap;

pub mod error;
pub mod grpc;
pub mod keyword;

// Include the generated protobuf code
pub mod proto {
    tonic::include_proto!("emotion");
}

pub use error::ClassifierError;
pub use grpc::GrpcEmotionClassifier;
pub use keyword::KeywordEmotionClassifier;

/// Label -> score in [0, 1]
pub type EmotionScores = HashMap<String, f32>;

#[async_trait]
pub trait EmotionClassifier: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    async fn classify(&self, text: &str) -> Result<EmotionScores, ClassifierError>;
}
