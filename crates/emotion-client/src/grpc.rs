use async_trait::async_trait;
use tonic::transport::Channel;
use tracing::{debug, error, info};

use crate::proto::emotion_classifier_client::EmotionClassifierClient;
use crate::proto::{ClassifyRequest, EmotionScore};
use crate::{ClassifierError, EmotionClassifier, EmotionScores};

/// Client for the emotion model service.
///
/// Wraps the generated gRPC client. The underlying channel is cheap to
/// clone, so one instance can serve concurrent sessions.
#[derive(Debug, Clone)]
pub struct GrpcEmotionClassifier {
    client: EmotionClassifierClient<Channel>,
    service_addr: String,
}

impl GrpcEmotionClassifier {
    /// Connect to the service at `addr` (e.g. "http://localhost:50052")
    pub async fn connect(addr: impl Into<String>) -> Result<Self, ClassifierError> {
        let addr = addr.into();
        info!("Connecting to emotion service at {}", addr);

        let channel = Channel::from_shared(addr.clone())
            .map_err(|e| ClassifierError::ConnectionError(format!("invalid address {addr}: {e}")))?
            .connect()
            .await
            .map_err(|e| {
                error!("Connection to emotion service failed: {}", e);
                ClassifierError::ConnectionError(e.to_string())
            })?;

        Ok(Self {
            client: EmotionClassifierClient::new(channel),
            service_addr: addr,
        })
    }

    pub fn service_address(&self) -> &str {
        &self.service_addr
    }
}

#[async_trait]
impl EmotionClassifier for GrpcEmotionClassifier {
    fn name(&self) -> &str {
        "grpc"
    }

    async fn classify(&self, text: &str) -> Result<EmotionScores, ClassifierError> {
        debug!("Classifying {} chars", text.len());
        let mut client = self.client.clone();
        let request = tonic::Request::new(ClassifyRequest {
            text: text.to_string(),
        });

        let response = client.classify(request).await.map_err(|e| {
            error!("gRPC error while classifying: {}", e);
            ClassifierError::ClassificationError(e.to_string())
        })?;

        validate_scores(response.into_inner().scores)
    }
}

/// Convert wire scores into a label map.
///
/// Blank labels and non-finite scores are rejected. Scores are clamped to
/// [0, 1]; a label reported twice keeps its highest score.
pub fn validate_scores(scores: Vec<EmotionScore>) -> Result<EmotionScores, ClassifierError> {
    let mut validated = EmotionScores::with_capacity(scores.len());

    for EmotionScore { label, score } in scores {
        let label = label.trim().to_lowercase();
        if label.is_empty() {
            return Err(ClassifierError::InvalidResponse("blank emotion label".into()));
        }
        if !score.is_finite() {
            return Err(ClassifierError::InvalidResponse(format!(
                "non-finite score for {label}"
            )));
        }

        let score = score.clamp(0.0, 1.0);
        let entry = validated.entry(label).or_insert(score);
        *entry = entry.max(score);
    }

    Ok(validated)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(label: &str, score: f32) -> EmotionScore {
        EmotionScore {
            label: label.to_string(),
            score,
        }
    }

    #[test]
    fn test_validate_clamps_and_merges() {
        let scores = validate_scores(vec![
            score("Joy", 1.4),
            score("sadness", -0.2),
            score("joy", 0.3),
        ])
        .unwrap();

        assert_eq!(scores.len(), 2);
        assert_eq!(scores["joy"], 1.0);
        assert_eq!(scores["sadness"], 0.0);
    }

    #[test]
    fn test_validate_rejects_bad_entries() {
        assert!(matches!(
            validate_scores(vec![score("  ", 0.5)]),
            Err(ClassifierError::InvalidResponse(_))
        ));
        assert!(matches!(
            validate_scores(vec![score("fear", f32::NAN)]),
            Err(ClassifierError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_connect_rejects_invalid_address() {
        let result = GrpcEmotionClassifier::connect("not a uri").await;
        assert!(matches!(result, Err(ClassifierError::ConnectionError(_))));
    }
}
