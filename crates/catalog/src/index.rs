//! CatalogIndex building and query logic.
//!
//! - Build the index from parsed snapshot rows
//! - Build secondary indices (genre, year, title)
//! - Validate integrity (non-empty titles, unique ids)
//! - Filtered scans used by the snapshot knowledge store

use crate::error::{CatalogError, Result};
use crate::parser;
use crate::types::*;
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::Path;

impl CatalogIndex {
    /// Load a snapshot file and build a validated index.
    ///
    /// This is the main entry point used by binaries.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let movies = parser::parse_snapshot(path)?;
        Self::from_movies(movies)
    }

    /// Build a validated index from already parsed movies.
    ///
    /// Duplicate ids are rejected rather than silently overwritten.
    pub fn from_movies(movies: Vec<Movie>) -> Result<Self> {
        let mut index = CatalogIndex::new();
        let mut seen_ids = HashSet::with_capacity(movies.len());

        for movie in movies {
            if !seen_ids.insert(movie.id) {
                return Err(CatalogError::DuplicateId { id: movie.id });
            }
            index.insert_movie(movie);
        }

        index.build_secondary_indices();
        index.validate()?;
        Ok(index)
    }

    /// Rebuild genre, year and title indices from the primary map.
    ///
    /// Id lists are kept sorted so scans are deterministic.
    pub fn build_secondary_indices(&mut self) {
        self.genre_index.clear();
        self.year_index.clear();
        self.title_index.clear();

        for (movie_id, movie) in &self.movies {
            for &genre in &movie.genres {
                self.genre_index.entry(genre).or_default().push(*movie_id);
            }

            if let Some(year) = movie.year {
                self.year_index.entry(year).or_default().push(*movie_id);
            }

            // First id wins when two movies share a title
            let key = movie.title.to_lowercase();
            let slot = self.title_index.entry(key).or_insert(*movie_id);
            if *movie_id < *slot {
                *slot = *movie_id;
            }
        }

        for ids in self.genre_index.values_mut() {
            ids.sort_unstable();
        }
        for ids in self.year_index.values_mut() {
            ids.sort_unstable();
        }
    }

    /// Validate data integrity
    pub fn validate(&self) -> Result<()> {
        for movie in self.movies.values() {
            if movie.title.trim().is_empty() {
                return Err(CatalogError::ValidationError(format!(
                    "movie {} has an empty title",
                    movie.id
                )));
            }
        }
        Ok(())
    }

    /// Genres that at least one movie carries, in catalog order
    pub fn genre_universe(&self) -> Vec<Genre> {
        Genre::ALL
            .into_iter()
            .filter(|genre| !self.get_movies_by_genre(*genre).is_empty())
            .collect()
    }

    /// Movies released in `[start, end]`, ordered by year then id
    pub fn get_movies_in_year_range(&self, start: u16, end: u16) -> Vec<MovieId> {
        if start > end {
            return Vec::new();
        }
        self.year_index
            .range(start..=end)
            .flat_map(|(_, ids)| ids.iter().copied())
            .collect()
    }

    /// Movies matching an optional genre set and an era constraint,
    /// ordered by id.
    ///
    /// `genres = None` means no genre constraint; `Some(&[])` matches nothing.
    pub fn movies_matching(
        &self,
        genres: Option<&[Genre]>,
        era: EraFilter,
        modern_cutoff: u16,
    ) -> Vec<&Movie> {
        let mut matched: Vec<&Movie> = self
            .movies
            .par_iter()
            .filter(|(_, movie)| era.admits(movie.year, modern_cutoff))
            .filter(|(_, movie)| match genres {
                None => true,
                Some(wanted) => movie.genres.iter().any(|g| wanted.contains(g)),
            })
            .map(|(_, movie)| movie)
            .collect();

        matched.sort_unstable_by_key(|movie| movie.id);
        matched
    }

    /// Case-insensitive title search; exact matches first, then substring
    /// matches, each group ordered by title.
    pub fn search_titles(&self, query: &str) -> Vec<&Movie> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut hits: Vec<(u8, &Movie)> = self
            .movies
            .par_iter()
            .filter_map(|(_, movie)| {
                let title = movie.title.to_lowercase();
                if title == needle {
                    Some((0, movie))
                } else if title.contains(&needle) {
                    Some((1, movie))
                } else {
                    None
                }
            })
            .collect();

        hits.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.title.cmp(&b.1.title)));
        hits.into_iter().map(|(_, movie)| movie).collect()
    }
}
