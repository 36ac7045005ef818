//! Core domain types for the movie catalog.
//!
//! This module defines the fundamental data structures shared by every
//! other crate in the workspace:
//! - `Genre`: the closed set of catalog genres with their display labels,
//!   ontology names and free-text aliases
//! - `Movie`: one catalog item
//! - `Era` / `EraFilter`: the classic/modern split used for retrieval and
//!   diversification
//! - `CatalogIndex`: the in-memory snapshot with secondary indices

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::error::CatalogError;

// =============================================================================
// Type Aliases
// =============================================================================

/// Identifier of a movie inside a snapshot
pub type MovieId = u32;

/// Release year at or after which a movie counts as "modern"
pub const DEFAULT_MODERN_CUTOFF: u16 = 1990;

// =============================================================================
// Genre
// =============================================================================

/// Catalog genres.
///
/// Declaration order is alphabetical by label, so the derived `Ord` doubles
/// as a deterministic tie-break everywhere genres get sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Genre {
    Action,
    Adventure,
    Animation,
    Children,
    Comedy,
    Crime,
    Documentary,
    Drama,
    Fantasy,
    FilmNoir,
    Horror,
    Musical,
    Mystery,
    Romance,
    SciFi,
    Thriller,
    War,
    Western,
}

impl Genre {
    /// Every genre, in catalog order
    pub const ALL: [Genre; 18] = [
        Genre::Action,
        Genre::Adventure,
        Genre::Animation,
        Genre::Children,
        Genre::Comedy,
        Genre::Crime,
        Genre::Documentary,
        Genre::Drama,
        Genre::Fantasy,
        Genre::FilmNoir,
        Genre::Horror,
        Genre::Musical,
        Genre::Mystery,
        Genre::Romance,
        Genre::SciFi,
        Genre::Thriller,
        Genre::War,
        Genre::Western,
    ];

    /// Label as it appears in snapshot files and user-facing output
    pub fn label(self) -> &'static str {
        match self {
            Genre::Action => "Action",
            Genre::Adventure => "Adventure",
            Genre::Animation => "Animation",
            Genre::Children => "Children's",
            Genre::Comedy => "Comedy",
            Genre::Crime => "Crime",
            Genre::Documentary => "Documentary",
            Genre::Drama => "Drama",
            Genre::Fantasy => "Fantasy",
            Genre::FilmNoir => "Film-Noir",
            Genre::Horror => "Horror",
            Genre::Musical => "Musical",
            Genre::Mystery => "Mystery",
            Genre::Romance => "Romance",
            Genre::SciFi => "Sci-Fi",
            Genre::Thriller => "Thriller",
            Genre::War => "War",
            Genre::Western => "Western",
        }
    }

    /// Local name of the genre class in the knowledge graph (`emo:SciFi`)
    pub fn ontology_name(self) -> &'static str {
        match self {
            Genre::Action => "Action",
            Genre::Adventure => "Adventure",
            Genre::Animation => "Animation",
            Genre::Children => "Children",
            Genre::Comedy => "Comedy",
            Genre::Crime => "Crime",
            Genre::Documentary => "Documentary",
            Genre::Drama => "Drama",
            Genre::Fantasy => "Fantasy",
            Genre::FilmNoir => "FilmNoir",
            Genre::Horror => "Horror",
            Genre::Musical => "Musical",
            Genre::Mystery => "Mystery",
            Genre::Romance => "Romance",
            Genre::SciFi => "SciFi",
            Genre::Thriller => "Thriller",
            Genre::War => "War",
            Genre::Western => "Western",
        }
    }

    /// Lowercase phrases a user might type to name this genre.
    ///
    /// The first entry is always the lowercase label.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Genre::Action => &["action", "action movie", "action movies"],
            Genre::Adventure => &["adventure", "adventures"],
            Genre::Animation => &["animation", "animated", "cartoon", "cartoons", "anime"],
            Genre::Children => &["children's", "children", "kids", "family movie", "family film"],
            Genre::Comedy => &["comedy", "comedies", "funny movie", "rom-com", "romcom"],
            Genre::Crime => &["crime", "heist", "gangster"],
            Genre::Documentary => &["documentary", "documentaries", "doc", "docs"],
            Genre::Drama => &["drama", "dramas"],
            Genre::Fantasy => &["fantasy"],
            Genre::FilmNoir => &["film-noir", "film noir", "noir"],
            Genre::Horror => &["horror", "horror movie", "slasher"],
            Genre::Musical => &["musical", "musicals"],
            Genre::Mystery => &["mystery", "mysteries", "whodunit", "detective"],
            Genre::Romance => &["romance", "romances", "love story"],
            Genre::SciFi => &["sci-fi", "scifi", "science fiction", "sci fi"],
            Genre::Thriller => &["thriller", "thrillers"],
            Genre::War => &["war", "war movie", "war film"],
            Genre::Western => &["western", "westerns", "cowboy"],
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Genre {
    type Err = CatalogError;

    /// Accepts the snapshot label, the ontology name, or any alias,
    /// case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Genre::ALL
            .into_iter()
            .find(|genre| {
                genre.label().eq_ignore_ascii_case(needle)
                    || genre.ontology_name().eq_ignore_ascii_case(needle)
                    || genre
                        .aliases()
                        .iter()
                        .any(|alias| alias.eq_ignore_ascii_case(needle))
            })
            .ok_or_else(|| CatalogError::InvalidValue {
                field: "genre".to_string(),
                value: s.to_string(),
            })
    }
}

// =============================================================================
// Era
// =============================================================================

/// Coarse release period of a movie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Era {
    /// Released before the cutoff year
    Classic,
    /// Released in or after the cutoff year
    Modern,
}

impl Era {
    /// Classify a release year against a cutoff
    pub fn of(year: u16, cutoff: u16) -> Era {
        if year >= cutoff { Era::Modern } else { Era::Classic }
    }
}

/// Era constraint applied to catalog queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EraFilter {
    #[default]
    Any,
    Classic,
    Modern,
}

impl EraFilter {
    /// Whether an item with the given release year passes this constraint.
    ///
    /// Items with an unknown year only pass `EraFilter::Any`.
    pub fn admits(self, year: Option<u16>, cutoff: u16) -> bool {
        match (self, year) {
            (EraFilter::Any, _) => true,
            (_, None) => false,
            (EraFilter::Classic, Some(y)) => Era::of(y, cutoff) == Era::Classic,
            (EraFilter::Modern, Some(y)) => Era::of(y, cutoff) == Era::Modern,
        }
    }
}

// =============================================================================
// Movie
// =============================================================================

/// One catalog item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    /// Clean title, without the trailing "(1995)" year marker
    pub title: String,
    /// `None` when the snapshot carries no year for this movie
    pub year: Option<u16>,
    pub genres: Vec<Genre>,
}

impl Movie {
    pub fn has_genre(&self, genre: Genre) -> bool {
        self.genres.contains(&genre)
    }
}

// =============================================================================
// CatalogIndex - The In-Memory Snapshot
// =============================================================================

/// Holds every movie of a snapshot plus lookup indices.
///
/// Built once at startup and shared read-only (`Arc<CatalogIndex>`) by the
/// snapshot knowledge store and the CLI.
#[derive(Debug, Default)]
pub struct CatalogIndex {
    pub(crate) movies: HashMap<MovieId, Movie>,

    /// Movies grouped by genre (one movie can appear in multiple genre lists)
    pub(crate) genre_index: HashMap<Genre, Vec<MovieId>>,
    /// Movies grouped by release year (sorted by year)
    pub(crate) year_index: BTreeMap<u16, Vec<MovieId>>,
    /// Lowercase title to id
    pub(crate) title_index: HashMap<String, MovieId>,
}

impl CatalogIndex {
    /// Creates a new, empty index
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_movie(&self, id: MovieId) -> Option<&Movie> {
        self.movies.get(&id)
    }

    /// Case-insensitive exact title lookup
    pub fn get_by_title(&self, title: &str) -> Option<&Movie> {
        self.title_index
            .get(&title.trim().to_lowercase())
            .and_then(|id| self.movies.get(id))
    }

    /// Get all movies in a specific genre
    pub fn get_movies_by_genre(&self, genre: Genre) -> &[MovieId] {
        self.genre_index
            .get(&genre)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Get all movies released in a specific year
    pub fn get_movies_by_year(&self, year: u16) -> &[MovieId] {
        self.year_index
            .get(&year)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// All movie ids, ascending
    pub fn all_movie_ids(&self) -> Vec<MovieId> {
        let mut ids: Vec<MovieId> = self.movies.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Insert a movie into the primary map.
    ///
    /// Secondary indices are rebuilt by `build_secondary_indices`.
    pub fn insert_movie(&mut self, movie: Movie) {
        self.movies.insert(movie.id, movie);
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }
}
