use thiserror::Error;

/// Errors raised by knowledge stores and the retrieval cascade
#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Query timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Knowledge store returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse query results: {0}")]
    Parse(String),

    #[error("Knowledge store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, RetrievalError>;
