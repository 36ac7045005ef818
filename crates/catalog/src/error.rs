//! Error types for the catalog crate.
//!
//! Every failure carries enough context (file, line, offending value) to
//! point at the broken snapshot row without re-reading the file.

use thiserror::Error;

/// Errors that can occur while loading or validating a catalog snapshot
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Snapshot file could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading the snapshot
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Line in the snapshot couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A field had a value outside its domain (unknown genre, bad year)
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Line has neither the 3-field nor the 4-field layout
    #[error("Expected 3 or 4 fields but found {found} in line {line}")]
    FieldCountMismatch { found: usize, line: usize },

    /// Two rows share the same movie id
    #[error("Duplicate movie id {id}")]
    DuplicateId { id: u32 },

    /// Data validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, CatalogError>;
