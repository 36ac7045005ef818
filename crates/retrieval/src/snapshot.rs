//! Knowledge store backed by the bundled catalog snapshot.

use async_trait::async_trait;
use catalog::{CatalogIndex, DEFAULT_MODERN_CUTOFF, Genre};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::store::KnowledgeStore;
use crate::types::{CatalogQuery, CatalogRow};

/// Serves queries from an in-memory `CatalogIndex`.
///
/// Rows come out ordered by movie id, one row per matched genre, so results
/// are deterministic for a given snapshot. Every row carries the movie's
/// full genre list.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    index: Arc<CatalogIndex>,
    modern_cutoff: u16,
}

impl SnapshotStore {
    pub fn new(index: Arc<CatalogIndex>) -> Self {
        Self {
            index,
            modern_cutoff: DEFAULT_MODERN_CUTOFF,
        }
    }

    /// First year counted as modern (default: 1990)
    pub fn with_modern_cutoff(mut self, cutoff: u16) -> Self {
        self.modern_cutoff = cutoff;
        self
    }

    pub fn index(&self) -> &Arc<CatalogIndex> {
        &self.index
    }

    /// Synchronous core of `query`
    pub fn rows(&self, query: &CatalogQuery) -> Vec<CatalogRow> {
        let wanted = query.genres.as_deref();
        let movies = self.index.movies_matching(wanted, query.era, self.modern_cutoff);

        movies
            .into_iter()
            .flat_map(|movie| {
                movie
                    .genres
                    .iter()
                    .filter(move |genre| wanted.is_none_or(|w| w.contains(genre)))
                    .map(move |&genre| {
                        CatalogRow::new(movie.title.clone(), movie.year, genre)
                            .with_all_genres(movie.genres.iter().copied())
                    })
            })
            .take(query.limit)
            .collect()
    }
}

#[async_trait]
impl KnowledgeStore for SnapshotStore {
    fn name(&self) -> &str {
        "snapshot"
    }

    #[instrument(skip(self), fields(limit = query.limit))]
    async fn query(&self, query: &CatalogQuery) -> Result<Vec<CatalogRow>> {
        let rows = self.rows(query);
        debug!("Snapshot returned {} rows", rows.len());
        Ok(rows)
    }

    async fn genre_universe(&self) -> Result<Vec<Genre>> {
        Ok(self.index.genre_universe())
    }
}
