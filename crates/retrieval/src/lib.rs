//! # Retrieval Crate
//!
//! Candidate retrieval for the recommender.
//!
//! ## Components
//!
//! - `KnowledgeStore`: async access to a movie knowledge base
//! - `SnapshotStore`: serves the bundled catalog snapshot from memory
//! - `SparqlStore`: queries the movie graph over SPARQL HTTP
//! - `RetrievalAdapter`: runs the staged fallback cascade and merges rows
//!   into title-keyed `Candidate`s
//!
//! ## Example Usage
//!
//! ```ignore
//! use retrieval::{RetrievalAdapter, SnapshotStore};
//! use std::sync::Arc;
//!
//! let snapshot = Arc::new(SnapshotStore::new(index));
//! let adapter = RetrievalAdapter::new(snapshot.clone(), snapshot);
//! let retrieval = adapter.retrieve(&[Genre::Comedy], EraFilter::Modern).await;
//! ```

pub mod adapter;
pub mod error;
pub mod snapshot;
pub mod sparql;
pub mod store;
pub mod types;

pub use adapter::{DEFAULT_QUERY_LIMIT, DEFAULT_QUERY_TIMEOUT, Retrieval, RetrievalAdapter, RetrievalStage, merge_rows};
pub use error::{Result, RetrievalError};
pub use snapshot::SnapshotStore;
pub use sparql::SparqlStore;
pub use store::KnowledgeStore;
pub use types::{Candidate, CatalogQuery, CatalogRow};
