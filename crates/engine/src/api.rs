//! Request and response shapes of one conversation turn.

use pipeline::Recommendation;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Absent to start a new session
    #[serde(default)]
    pub session_id: Option<String>,
    pub text: String,
    #[serde(default)]
    pub top_k: Option<usize>,
}

impl ChatRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            session_id: None,
            text: text.into(),
            top_k: None,
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Fresh for every call
    pub request_id: Uuid,
    pub session_id: String,
    pub reply: String,
    pub dominant_emotion: String,
    pub genres: Vec<String>,
    pub movies: Vec<Recommendation>,
}
