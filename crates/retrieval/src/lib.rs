//! Hybrid knowledge retrieval for the FrontDesk engine.
//!
//! Deterministic rule matching over the static content store, merged with
//! embedding-similarity search behind one asynchronous interface.

pub mod content;
pub mod http;
pub mod noop;
pub mod query;
pub mod retriever;
pub mod rules;

pub use content::StaticContentStore;
pub use http::HttpVectorSearch;
pub use noop::NoopVectorSearch;
pub use query::{rewrite_query, should_use_vector};
pub use retriever::KnowledgeRetriever;
pub use rules::{match_rules, RetrievalRule, RETRIEVAL_RULES};

use std::sync::Arc;

use frontdesk_config::VectorConfig;
use frontdesk_core::error::RetrievalError;
use frontdesk_core::VectorSearch;

/// Build the vector backend a configuration calls for: an HTTP client when
/// an endpoint is configured, the no-op backend when it is empty.
pub fn vector_backend(config: &VectorConfig) -> Result<Arc<dyn VectorSearch>, RetrievalError> {
    if config.endpoint.is_empty() {
        return Ok(Arc::new(NoopVectorSearch));
    }
    let backend = HttpVectorSearch::new(
        config.endpoint.clone(),
        config.api_key.clone(),
        config.timeout_ms,
    )?;
    Ok(Arc::new(backend))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_endpoint_selects_noop_backend() {
        let backend = vector_backend(&VectorConfig::default()).unwrap();
        assert_eq!(backend.name(), "noop");
    }

    #[test]
    fn configured_endpoint_selects_http_backend() {
        let mut config = VectorConfig::default();
        config.endpoint = "http://localhost:9000".into();
        let backend = vector_backend(&config).unwrap();
        assert_eq!(backend.name(), "http");
    }
}
