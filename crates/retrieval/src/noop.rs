//! No-op vector backend — for deployments without an embedding index.

use async_trait::async_trait;
use frontdesk_core::error::RetrievalError;
use frontdesk_core::{SearchHit, VectorSearch};

/// A backend that finds nothing. Retrieval degrades to rule-only.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopVectorSearch;

#[async_trait]
impl VectorSearch for NoopVectorSearch {
    fn name(&self) -> &str {
        "noop"
    }

    async fn search(
        &self,
        _query: &str,
        _top_k: usize,
        _min_similarity: f32,
        _language: &str,
    ) -> Result<Vec<SearchHit>, RetrievalError> {
        Ok(Vec::new())
    }
}
