//! Parser for catalog snapshot files.
//!
//! A snapshot is a flat `::`-separated table, one movie per line, in either
//! of two layouts:
//! - `movieId::Title (Year)::Genre|Genre` (the year lives in the title)
//! - `movieId::Title::Year::Genre|Genre` (explicit year column, may be empty)
//!
//! Files may be Latin-1 encoded, so bytes are widened to chars rather than
//! decoded as UTF-8.

use crate::error::{CatalogError, Result};
use crate::types::{Genre, Movie};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Marker some snapshots use for movies without genre information
const NO_GENRES: &str = "(no genres listed)";

/// Read a file as ISO-8859-1 (Latin-1) and return its text.
fn read_latin1(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CatalogError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => CatalogError::IoError(e),
    })?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    // Every Latin-1 byte maps directly to the Unicode code point of the same value
    Ok(bytes.iter().map(|&b| b as char).collect())
}

/// Parse a snapshot file from disk
pub fn parse_snapshot(path: &Path) -> Result<Vec<Movie>> {
    let content = read_latin1(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    parse_snapshot_str(&content, &file_name)
}

/// Parse snapshot text already held in memory.
///
/// `source` is only used to label parse errors.
pub fn parse_snapshot_str(content: &str, source: &str) -> Result<Vec<Movie>> {
    let mut movies = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line_trimmed = line.trim();
        if line_trimmed.is_empty() {
            continue;
        }
        movies.push(parse_line(line_trimmed, line_no, source)?);
    }

    Ok(movies)
}

fn parse_line(line: &str, line_no: usize, source: &str) -> Result<Movie> {
    let parts: Vec<&str> = line.split("::").collect();

    let parse_error = |reason: String| CatalogError::ParseError {
        file: source.to_string(),
        line: line_no,
        reason,
    };

    let (id, raw_title, year_field, genres_field) = match parts.as_slice() {
        [id, title, genres] => (*id, *title, None, *genres),
        [id, title, year, genres] => (*id, *title, Some(*year), *genres),
        _ => {
            return Err(CatalogError::FieldCountMismatch {
                found: parts.len(),
                line: line_no,
            });
        }
    };

    let id = id
        .trim()
        .parse()
        .map_err(|e| parse_error(format!("Invalid movieId: {}", e)))?;

    let raw_title = raw_title.trim();
    if raw_title.is_empty() {
        return Err(parse_error("Missing title".to_string()));
    }

    let year = match year_field.map(str::trim) {
        Some("") => None,
        Some(y) => Some(
            y.parse::<u16>()
                .map_err(|e| parse_error(format!("Invalid year: {}", e)))?,
        ),
        None => extract_year_from_title(raw_title),
    };

    Ok(Movie {
        id,
        title: clean_title(raw_title),
        year,
        genres: parse_genres(genres_field)?,
    })
}

/// Extract year from movie title
///
/// Example: "Toy Story (1995)" -> Some(1995)
///          "Movie Title" -> None
fn extract_year_from_title(title: &str) -> Option<u16> {
    let start = title.rfind('(')?;
    let end = title.rfind(')')?;
    if start < end {
        let year_str = &title[start + 1..end];
        if year_str.len() == 4 {
            return year_str.parse::<u16>().ok();
        }
    }
    None
}

/// Drop a trailing "(1995)" year marker from a title
///
/// Example: "Toy Story (1995)" -> "Toy Story"
fn clean_title(title: &str) -> String {
    if extract_year_from_title(title).is_some() && title.ends_with(')') {
        if let Some(start) = title.rfind('(') {
            return title[..start].trim_end().to_string();
        }
    }
    title.to_string()
}

/// Parse pipe-separated genres
///
/// Example: "Action|Adventure|Sci-Fi" -> vec![Genre::Action, Genre::Adventure, Genre::SciFi]
fn parse_genres(s: &str) -> Result<Vec<Genre>> {
    let s = s.trim();
    if s.is_empty() || s == NO_GENRES {
        return Ok(Vec::new());
    }

    let mut genres = Vec::new();
    for genre_str in s.split('|') {
        let genre: Genre = genre_str.parse()?;
        if !genres.contains(&genre) {
            genres.push(genre);
        }
    }
    Ok(genres)
}
