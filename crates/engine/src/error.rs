use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum EngineError {
    #[error("Input text is empty")]
    EmptyInput,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
