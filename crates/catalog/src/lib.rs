//! # Catalog Crate
//!
//! Domain types for the movie catalog and the local snapshot that backs the
//! last-resort retrieval stage.
//!
//! ## Main Components
//!
//! - **types**: `Genre`, `Movie`, `Era`, `EraFilter`, `CatalogIndex`
//! - **parser**: Parse `::`-separated snapshot files into `Movie`s
//! - **index**: Build secondary indices and run filtered scans
//! - **error**: Error types for snapshot loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::{CatalogIndex, EraFilter, Genre, DEFAULT_MODERN_CUTOFF};
//! use std::path::Path;
//!
//! let index = CatalogIndex::load_from_file(Path::new("data/snapshot.dat"))?;
//! let picks = index.movies_matching(Some(&[Genre::Comedy]), EraFilter::Modern, DEFAULT_MODERN_CUTOFF);
//! println!("{} modern comedies", picks.len());
//! ```

pub mod error;
pub mod index;
pub mod parser;
pub mod types;

pub use error::{CatalogError, Result};
pub use types::{CatalogIndex, DEFAULT_MODERN_CUTOFF, Era, EraFilter, Genre, Movie, MovieId};
