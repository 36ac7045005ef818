use catalog::{EraFilter, Genre};
use serde::{Deserialize, Serialize};

/// Structured filter sent to a knowledge store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogQuery {
    /// `None` = any genre; `Some(&[])` matches nothing
    pub genres: Option<Vec<Genre>>,
    pub era: EraFilter,
    /// Maximum rows returned
    pub limit: usize,
}

impl CatalogQuery {
    pub fn browse(limit: usize) -> Self {
        Self {
            genres: None,
            era: EraFilter::Any,
            limit,
        }
    }
}

/// One result row: a movie annotated with one of its matched genres.
///
/// A movie in several requested genres yields several rows. `all_genres`
/// is the movie's complete genre set, matched or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRow {
    pub title: String,
    pub year: Option<u16>,
    pub genre: Genre,
    pub genre_label: String,
    #[serde(default)]
    pub all_genres: Vec<Genre>,
}

impl CatalogRow {
    pub fn new(title: impl Into<String>, year: Option<u16>, genre: Genre) -> Self {
        Self {
            title: title.into(),
            year,
            genre,
            genre_label: genre.label().to_string(),
            all_genres: vec![genre],
        }
    }

    /// Full genre set of the movie; always includes the matched genre
    pub fn with_all_genres(mut self, genres: impl IntoIterator<Item = Genre>) -> Self {
        for genre in genres {
            if !self.all_genres.contains(&genre) {
                self.all_genres.push(genre);
            }
        }
        self
    }
}

/// A retrieved movie before ranking, identified by title
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub title: String,
    pub year: Option<u16>,
    /// Genres the movie was retrieved under; these are scored
    pub genres: Vec<Genre>,
    /// Every genre the movie carries; content vetoes check these
    #[serde(default)]
    pub all_genres: Vec<Genre>,
    /// Sum of genre weights, filled in by scoring
    pub score: f32,
    /// Highest-weighted genre, filled in by scoring
    pub best_genre: Option<Genre>,
}

impl Candidate {
    pub fn new(title: impl Into<String>, year: Option<u16>, genres: Vec<Genre>) -> Self {
        Self {
            title: title.into(),
            year,
            all_genres: genres.clone(),
            genres,
            score: 0.0,
            best_genre: None,
        }
    }

    pub fn with_all_genres(mut self, genres: impl IntoIterator<Item = Genre>) -> Self {
        self.add_genres(genres);
        self
    }

    /// Whether the movie carries `genre`, matched or not
    pub fn has_genre(&self, genre: Genre) -> bool {
        self.all_genres.contains(&genre) || self.genres.contains(&genre)
    }

    fn add_genres(&mut self, genres: impl IntoIterator<Item = Genre>) {
        for genre in genres {
            if !self.all_genres.contains(&genre) {
                self.all_genres.push(genre);
            }
        }
    }

    /// Fold another row for the same title into this candidate
    pub fn absorb(&mut self, row: CatalogRow) {
        if !self.genres.contains(&row.genre) {
            self.genres.push(row.genre);
        }
        self.add_genres(std::iter::once(row.genre).chain(row.all_genres));
        if self.year.is_none() {
            self.year = row.year;
        }
    }
}
