use async_trait::async_trait;
use catalog::Genre;

use crate::error::Result;
use crate::types::{CatalogQuery, CatalogRow};

/// Read access to a movie knowledge base
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Rows matching `query`, at most `query.limit` of them
    async fn query(&self, query: &CatalogQuery) -> Result<Vec<CatalogRow>>;

    /// Genres known to this store, in catalog order
    async fn genre_universe(&self) -> Result<Vec<Genre>>;
}
