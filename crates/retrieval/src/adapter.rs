//! Staged candidate retrieval.
//!
//! ## Algorithm
//!
//! Stages are tried in order until one yields at least one candidate:
//!
//! 1. `GenreAndEra`: ranked genres plus the era constraint (live store)
//! 2. `EraOnly`: era constraint, any genre (live store)
//! 3. `Browse`: no constraint (live store)
//! 4. `Snapshot`: ranked genres, any era (local snapshot)
//!
//! Each stage runs under the query timeout. Failures and timeouts are
//! logged and the cascade moves on; exhausting every stage yields an empty
//! list, never an error.

use catalog::{EraFilter, Genre};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::store::KnowledgeStore;
use crate::types::{Candidate, CatalogQuery, CatalogRow};

pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_QUERY_LIMIT: usize = 200;

/// One step of the relaxation cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RetrievalStage {
    GenreAndEra,
    EraOnly,
    Browse,
    Snapshot,
}

impl RetrievalStage {
    pub const ALL: [RetrievalStage; 4] = [
        RetrievalStage::GenreAndEra,
        RetrievalStage::EraOnly,
        RetrievalStage::Browse,
        RetrievalStage::Snapshot,
    ];

    /// The query this stage sends
    pub fn query(self, genres: &[Genre], era: EraFilter, limit: usize) -> CatalogQuery {
        let (genres, era) = match self {
            RetrievalStage::GenreAndEra => (Some(genres.to_vec()), era),
            RetrievalStage::EraOnly => (None, era),
            RetrievalStage::Browse => (None, EraFilter::Any),
            RetrievalStage::Snapshot if genres.is_empty() => (None, EraFilter::Any),
            RetrievalStage::Snapshot => (Some(genres.to_vec()), EraFilter::Any),
        };
        CatalogQuery { genres, era, limit }
    }

    pub fn uses_snapshot(self) -> bool {
        self == RetrievalStage::Snapshot
    }
}

impl fmt::Display for RetrievalStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RetrievalStage::GenreAndEra => "genre+era",
            RetrievalStage::EraOnly => "era-only",
            RetrievalStage::Browse => "browse",
            RetrievalStage::Snapshot => "snapshot",
        };
        f.write_str(name)
    }
}

/// Candidates plus the stage that produced them
#[derive(Debug, Clone, Default)]
pub struct Retrieval {
    pub candidates: Vec<Candidate>,
    /// `None` when every stage came back empty
    pub stage: Option<RetrievalStage>,
}

/// Runs the retrieval cascade against a live store and a snapshot store
#[derive(Clone)]
pub struct RetrievalAdapter {
    live: Arc<dyn KnowledgeStore>,
    snapshot: Arc<dyn KnowledgeStore>,
    timeout: Duration,
    limit: usize,
}

impl RetrievalAdapter {
    pub fn new(live: Arc<dyn KnowledgeStore>, snapshot: Arc<dyn KnowledgeStore>) -> Self {
        Self {
            live,
            snapshot,
            timeout: DEFAULT_QUERY_TIMEOUT,
            limit: DEFAULT_QUERY_LIMIT,
        }
    }

    /// Per-stage timeout (default: 15s)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Row limit per query (default: 200)
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn live_store(&self) -> &Arc<dyn KnowledgeStore> {
        &self.live
    }

    pub fn snapshot_store(&self) -> &Arc<dyn KnowledgeStore> {
        &self.snapshot
    }

    #[instrument(skip(self, genres), fields(genres = genres.len(), era = ?era))]
    pub async fn retrieve(&self, genres: &[Genre], era: EraFilter) -> Retrieval {
        for stage in RetrievalStage::ALL {
            let store = if stage.uses_snapshot() { &self.snapshot } else { &self.live };
            let query = stage.query(genres, era, self.limit);

            match tokio::time::timeout(self.timeout, store.query(&query)).await {
                Ok(Ok(rows)) => {
                    let candidates = merge_rows(rows);
                    if !candidates.is_empty() {
                        info!(stage = %stage, store = store.name(), "Retrieved {} candidates", candidates.len());
                        return Retrieval {
                            candidates,
                            stage: Some(stage),
                        };
                    }
                    debug!(stage = %stage, store = store.name(), "Stage returned no candidates");
                }
                Ok(Err(e)) => {
                    warn!(stage = %stage, store = store.name(), "Stage failed: {}", e);
                }
                Err(_) => {
                    warn!(
                        stage = %stage,
                        store = store.name(),
                        "Stage timed out after {}ms",
                        self.timeout.as_millis()
                    );
                }
            }
        }

        warn!("All retrieval stages exhausted");
        Retrieval::default()
    }
}

/// Collapse rows into candidates keyed by title.
///
/// Keeps first-seen order, unions matched and full genre sets and keeps the
/// first known year.
pub fn merge_rows(rows: Vec<CatalogRow>) -> Vec<Candidate> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut candidates: Vec<Candidate> = Vec::new();

    for row in rows {
        match positions.get(&row.title) {
            Some(&pos) => candidates[pos].absorb(row),
            None => {
                positions.insert(row.title.clone(), candidates.len());
                let candidate =
                    Candidate::new(row.title, row.year, vec![row.genre]).with_all_genres(row.all_genres);
                candidates.push(candidate);
            }
        }
    }

    candidates
}
