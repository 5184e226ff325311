//! HTTP vector-search client.
//!
//! Talks to the external embedding-similarity service over a small JSON
//! API. Every transport or decode failure maps to a `RetrievalError`; the
//! retriever turns those into an empty result, so the service effectively
//! "returns an empty list, never raises".

use async_trait::async_trait;
use frontdesk_core::error::RetrievalError;
use frontdesk_core::{SearchHit, VectorSearch};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A `VectorSearch` backed by an HTTP embedding-similarity service.
pub struct HttpVectorSearch {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpVectorSearch {
    /// Create a client for the given service endpoint. `timeout_ms` bounds
    /// each call at the transport level; the retriever applies its own
    /// overall timeout as well.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout_ms: u64,
    ) -> Result<Self, RetrievalError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| RetrievalError::BackendUnavailable(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }
}

#[derive(Serialize)]
struct ApiRequest<'a> {
    query: &'a str,
    top_k: usize,
    min_similarity: f32,
    language: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    results: Vec<ApiHit>,
}

#[derive(Deserialize)]
struct ApiHit {
    content: String,
    #[serde(default)]
    metadata: serde_json::Map<String, serde_json::Value>,
    similarity: f32,
}

#[async_trait]
impl VectorSearch for HttpVectorSearch {
    fn name(&self) -> &str {
        "http"
    }

    async fn search(
        &self,
        query: &str,
        top_k: usize,
        min_similarity: f32,
        language: &str,
    ) -> Result<Vec<SearchHit>, RetrievalError> {
        let url = format!("{}/search", self.base_url);
        let body = ApiRequest {
            query,
            top_k,
            min_similarity,
            language,
        };

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "vector backend request failed");
            RetrievalError::BackendUnavailable(e.to_string())
        })?;

        if !response.status().is_success() {
            return Err(RetrievalError::BackendUnavailable(format!(
                "status {}",
                response.status()
            )));
        }

        let parsed: ApiResponse = response
            .json()
            .await
            .map_err(|e| RetrievalError::InvalidResponse(e.to_string()))?;

        debug!(hits = parsed.results.len(), "vector backend responded");

        Ok(parsed
            .results
            .into_iter()
            .map(|h| SearchHit {
                content: h.content,
                metadata: h.metadata,
                similarity: h.similarity,
            })
            .collect())
    }
}
