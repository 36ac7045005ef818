//! Knowledge store backed by a SPARQL endpoint.
//!
//! The movie graph uses the emotion ontology's vocabulary:
//!
//! ```text
//! emo:movie_1 a emo:Movie ;
//!   emo:title "Toy Story" ;
//!   emo:year "1995"^^xsd:gYear ;
//!   emo:belongsToGenre emo:Animation, emo:Comedy .
//! ```
//!
//! Queries are POSTed as `application/sparql-query` and results read as
//! `application/sparql-results+json`.

use async_trait::async_trait;
use catalog::{DEFAULT_MODERN_CUTOFF, EraFilter, Genre};
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::time::Duration;
use tracing::{debug, error, instrument};

use crate::error::{Result, RetrievalError};
use crate::store::KnowledgeStore;
use crate::types::{CatalogQuery, CatalogRow};

pub const ONTOLOGY_NAMESPACE: &str =
    "http://www.semanticweb.org/ibrah/ontologies/2025/11/emotion-ontology#";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

pub struct SparqlStore {
    http_client: reqwest::Client,
    endpoint: String,
    modern_cutoff: u16,
}

impl SparqlStore {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        Self::build(endpoint.into(), DEFAULT_TIMEOUT)
    }

    /// Per-request HTTP timeout (default: 15s)
    pub fn with_timeout(self, timeout: Duration) -> Result<Self> {
        let cutoff = self.modern_cutoff;
        Self::build(self.endpoint, timeout).map(|store| store.with_modern_cutoff(cutoff))
    }

    pub fn with_modern_cutoff(mut self, cutoff: u16) -> Self {
        self.modern_cutoff = cutoff;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build(endpoint: String, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            endpoint,
            modern_cutoff: DEFAULT_MODERN_CUTOFF,
        })
    }

    async fn run(&self, query: String) -> Result<SparqlResults> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/sparql-query")
            .header(reqwest::header::ACCEPT, "application/sparql-results+json")
            .body(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), "SPARQL endpoint returned an error");
            return Err(RetrievalError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| RetrievalError::Parse(e.to_string()))
    }
}

#[async_trait]
impl KnowledgeStore for SparqlStore {
    fn name(&self) -> &str {
        "sparql"
    }

    #[instrument(skip(self), fields(endpoint = %self.endpoint, limit = query.limit))]
    async fn query(&self, query: &CatalogQuery) -> Result<Vec<CatalogRow>> {
        if query.genres.as_ref().is_some_and(|g| g.is_empty()) {
            return Ok(Vec::new());
        }

        let results = self.run(build_movie_query(query, self.modern_cutoff)).await?;
        let rows = parse_movie_rows(results);
        debug!("SPARQL returned {} rows", rows.len());
        Ok(rows)
    }

    async fn genre_universe(&self) -> Result<Vec<Genre>> {
        let results = self.run(build_genre_query()).await?;
        let genres: BTreeSet<Genre> = results
            .results
            .bindings
            .iter()
            .filter_map(|binding| binding.get("genre"))
            .filter_map(|term| genre_from_iri(&term.value))
            .collect();
        Ok(genres.into_iter().collect())
    }
}

// =============================================================================
// Query construction
// =============================================================================

fn prefixes() -> String {
    format!(
        "PREFIX emo: <{ONTOLOGY_NAMESPACE}>\n\
         PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>\n\
         PREFIX xsd: <http://www.w3.org/2001/XMLSchema#>\n"
    )
}

/// Render a `CatalogQuery` as a SPARQL `SELECT`.
///
/// `?genre` is bound to the requested genres; `?anyGenre` collects the
/// movie's full genre set into `?allGenres`. An era constraint makes the
/// year mandatory; without one the year is optional so undated movies
/// still show up.
pub fn build_movie_query(query: &CatalogQuery, modern_cutoff: u16) -> String {
    let mut sparql = prefixes();
    sparql.push_str("SELECT ?title ?year ?genre (SAMPLE(?label) AS ?genreLabel) ");
    sparql.push_str("(GROUP_CONCAT(DISTINCT STR(?anyGenre); separator=\" \") AS ?allGenres) WHERE {\n");
    sparql.push_str("  ?movie a emo:Movie ;\n");
    sparql.push_str("         emo:title ?title ;\n");
    sparql.push_str("         emo:belongsToGenre ?genre ;\n");
    sparql.push_str("         emo:belongsToGenre ?anyGenre .\n");

    if let Some(genres) = &query.genres {
        let values: Vec<String> = genres
            .iter()
            .map(|g| format!("emo:{}", g.ontology_name()))
            .collect();
        sparql.push_str(&format!("  VALUES ?genre {{ {} }}\n", values.join(" ")));
    }

    let year_expr = "xsd:integer(SUBSTR(STR(?year), 1, 4))";
    match query.era {
        EraFilter::Any => sparql.push_str("  OPTIONAL { ?movie emo:year ?year . }\n"),
        EraFilter::Classic => {
            sparql.push_str("  ?movie emo:year ?year .\n");
            sparql.push_str(&format!("  FILTER({year_expr} < {modern_cutoff})\n"));
        }
        EraFilter::Modern => {
            sparql.push_str("  ?movie emo:year ?year .\n");
            sparql.push_str(&format!("  FILTER({year_expr} >= {modern_cutoff})\n"));
        }
    }

    sparql.push_str("  OPTIONAL { ?genre rdfs:label ?label . }\n");
    sparql.push_str("}\n");
    sparql.push_str("GROUP BY ?title ?year ?genre\n");
    sparql.push_str(&format!("LIMIT {}\n", query.limit));
    sparql
}

pub fn build_genre_query() -> String {
    let mut sparql = prefixes();
    sparql.push_str("SELECT DISTINCT ?genre WHERE {\n");
    sparql.push_str("  ?movie a emo:Movie ;\n");
    sparql.push_str("         emo:belongsToGenre ?genre .\n");
    sparql.push_str("}\n");
    sparql
}

// =============================================================================
// Result parsing
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SparqlResults {
    pub results: SparqlBindings,
}

#[derive(Debug, Deserialize)]
pub struct SparqlBindings {
    pub bindings: Vec<HashMap<String, SparqlTerm>>,
}

#[derive(Debug, Deserialize)]
pub struct SparqlTerm {
    pub value: String,
}

/// Turn result bindings into rows.
///
/// Bindings without a title or with a genre outside the catalog are
/// skipped. Unknown entries in `allGenres` are dropped.
pub fn parse_movie_rows(results: SparqlResults) -> Vec<CatalogRow> {
    results
        .results
        .bindings
        .into_iter()
        .filter_map(|binding| {
            let title = binding.get("title")?.value.trim().to_string();
            if title.is_empty() {
                return None;
            }
            let genre = genre_from_iri(&binding.get("genre")?.value)?;
            let year = binding.get("year").and_then(|term| parse_year(&term.value));
            let genre_label = binding
                .get("genreLabel")
                .map(|term| term.value.clone())
                .unwrap_or_else(|| genre.label().to_string());

            let all_genres = binding
                .get("allGenres")
                .map(|term| term.value.split_whitespace().filter_map(genre_from_iri).collect::<Vec<_>>())
                .unwrap_or_default();

            let mut row = CatalogRow::new(title, year, genre).with_all_genres(all_genres);
            row.genre_label = genre_label;
            Some(row)
        })
        .collect()
}

/// Genre named by an ontology IRI (`...#SciFi`) or prefixed name
fn genre_from_iri(iri: &str) -> Option<Genre> {
    let local = iri.rsplit(['#', '/', ':']).next()?;
    local.parse().ok()
}

/// Leading four-digit year of an `xsd:gYear` or date literal
fn parse_year(value: &str) -> Option<u16> {
    value.trim().get(..4)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results(json: &str) -> SparqlResults {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_movie_query_with_genres_and_era() {
        let query = CatalogQuery {
            genres: Some(vec![Genre::SciFi, Genre::Drama]),
            era: EraFilter::Classic,
            limit: 50,
        };
        let sparql = build_movie_query(&query, 1990);

        assert!(sparql.contains("VALUES ?genre { emo:SciFi emo:Drama }"));
        assert!(sparql.contains("emo:belongsToGenre ?anyGenre"));
        assert!(sparql.contains("GROUP BY ?title ?year ?genre"));
        assert!(sparql.contains("< 1990)"));
        assert!(!sparql.contains("OPTIONAL { ?movie emo:year"));
        assert!(sparql.trim_end().ends_with("LIMIT 50"));
    }

    #[test]
    fn test_browse_query_has_no_filters() {
        let sparql = build_movie_query(&CatalogQuery::browse(10), 1990);
        assert!(!sparql.contains("VALUES"));
        assert!(!sparql.contains("FILTER"));
        assert!(sparql.contains("OPTIONAL { ?movie emo:year ?year . }"));
    }

    #[test]
    fn test_parse_rows() {
        let json = format!(
            r#"{{
              "head": {{ "vars": ["title", "year", "genre", "genreLabel"] }},
              "results": {{ "bindings": [
                {{ "title": {{ "type": "literal", "value": "Toy Story" }},
                   "year": {{ "type": "literal", "value": "1995" }},
                   "genre": {{ "type": "uri", "value": "{ns}Animation" }} }},
                {{ "title": {{ "type": "literal", "value": "Raiders of the Lost Ark" }},
                   "year": {{ "type": "literal", "value": "1981" }},
                   "genre": {{ "type": "uri", "value": "{ns}Adventure" }},
                   "allGenres": {{ "type": "literal", "value": "{ns}Action {ns}Adventure {ns}Opera" }} }},
                {{ "title": {{ "type": "literal", "value": "Metropolis" }},
                   "genre": {{ "type": "uri", "value": "{ns}SciFi" }},
                   "genreLabel": {{ "type": "literal", "value": "Science Fiction" }} }},
                {{ "title": {{ "type": "literal", "value": "Odd" }},
                   "genre": {{ "type": "uri", "value": "{ns}Opera" }} }}
              ] }}
            }}"#,
            ns = ONTOLOGY_NAMESPACE
        );

        let rows = parse_movie_rows(results(&json));
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], CatalogRow::new("Toy Story", Some(1995), Genre::Animation));
        assert_eq!(rows[1].genre, Genre::Adventure);
        assert_eq!(rows[1].all_genres, vec![Genre::Adventure, Genre::Action]);
        assert_eq!(rows[2].year, None);
        assert_eq!(rows[2].genre, Genre::SciFi);
        assert_eq!(rows[2].genre_label, "Science Fiction");
    }

    #[test]
    fn test_genre_from_iri() {
        assert_eq!(genre_from_iri("emo:FilmNoir"), Some(Genre::FilmNoir));
        assert_eq!(genre_from_iri(&format!("{ONTOLOGY_NAMESPACE}War")), Some(Genre::War));
        assert_eq!(genre_from_iri("http://example.org/genres/Western"), Some(Genre::Western));
        assert_eq!(genre_from_iri("emo:Opera"), None);
    }

    #[test]
    fn test_parse_year() {
        assert_eq!(parse_year("1995"), Some(1995));
        assert_eq!(parse_year("1995-01-01"), Some(1995));
        assert_eq!(parse_year("95"), None);
    }

    #[test]
    fn test_store_creation() {
        let store = SparqlStore::new("http://localhost:3030/emotion/sparql").unwrap();
        assert_eq!(store.endpoint(), "http://localhost:3030/emotion/sparql");
        assert!(store.with_timeout(Duration::from_secs(2)).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_an_error() {
        let store = SparqlStore::new("http://127.0.0.1:9/sparql")
            .unwrap()
            .with_timeout(Duration::from_millis(500))
            .unwrap();
        let result = store.query(&CatalogQuery::browse(5)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_empty_genre_set_skips_request() {
        let store = SparqlStore::new("http://127.0.0.1:9/sparql").unwrap();
        let query = CatalogQuery {
            genres: Some(Vec::new()),
            era: EraFilter::Any,
            limit: 5,
        };
        assert!(store.query(&query).await.unwrap().is_empty());
    }
}
