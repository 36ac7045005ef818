use thiserror::Error;

/// Errors that can occur when classifying text
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Failed to connect to emotion service: {0}")]
    ConnectionError(String),

    #[error("Failed to classify text: {0}")]
    ClassificationError(String),

    #[error("Invalid response from emotion service: {0}")]
    InvalidResponse(String),
}
