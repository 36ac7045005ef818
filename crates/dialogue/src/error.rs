use thiserror::Error;

/// Errors raised when slot identifiers or values arrive as free strings
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DialogueError {
    #[error("Unknown slot: {0}")]
    UnknownSlot(String),

    #[error("Value {value} is outside the domain of slot {slot}")]
    InvalidSlotValue { slot: String, value: String },

    #[error("Unknown emotion individual: {0}")]
    UnknownEmotion(String),
}
