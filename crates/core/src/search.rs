//! Vector search trait — the seam to the external embedding index.
//!
//! Implementations: HTTP client against an embedding-similarity service,
//! no-op (for deployments without an index), mocks (for testing).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RetrievalError;

/// One similarity hit from the vector backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// The matched content.
    pub content: String,
    /// Backend-supplied metadata (source, locale, ...).
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    /// Cosine similarity in [0, 1].
    pub similarity: f32,
}

/// The vector-search seam.
///
/// Contract: implementations report failures via `RetrievalError`, but the
/// retriever never propagates them — a failed search degrades to an empty
/// hit list and the turn continues on rule-based fragments alone.
#[async_trait]
pub trait VectorSearch: Send + Sync {
    /// The backend name (e.g., "http", "noop").
    fn name(&self) -> &str;

    /// Search for content similar to `query`, bounded by `top_k` results
    /// at or above `min_similarity`, in the given language.
    async fn search(
        &self,
        query: &str,
        top_k: usize,
        min_similarity: f32,
        language: &str,
    ) -> std::result::Result<Vec<SearchHit>, RetrievalError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_deserializes_without_metadata() {
        let hit: SearchHit =
            serde_json::from_str(r#"{"content":"Sauna rules","similarity":0.7}"#).unwrap();
        assert_eq!(hit.content, "Sauna rules");
        assert!(hit.metadata.is_empty());
    }
}
