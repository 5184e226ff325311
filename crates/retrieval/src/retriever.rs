//! The hybrid knowledge retriever.
//!
//! Combines two strategies per turn:
//! a) the deterministic rule matcher over the static content store, and
//! b) embedding-similarity search for short or follow-up messages,
//!    with the query rewritten from conversation state first.
//!
//! Vector hits are normalized into the same fragment shape as rule
//! results. Ordering: rule-matched fragments precede vector fragments
//! (exact facts before probabilistic matches); vector fragments are
//! ordered by descending similarity. A backend failure or timeout
//! degrades to an empty vector result — it never reaches the caller.

use std::sync::Arc;
use std::time::Duration;

use frontdesk_config::EngineConfig;
use frontdesk_core::{ContentStore, KnowledgeFragment, SessionContext, VectorSearch};
use tracing::{debug, warn};

use crate::query::{rewrite_query, should_use_vector};
use crate::rules::match_rules;

/// The hybrid retriever. Stateless across turns; create one and reuse it.
pub struct KnowledgeRetriever {
    content: Arc<dyn ContentStore>,
    vector: Arc<dyn VectorSearch>,
    config: Arc<EngineConfig>,
}

impl KnowledgeRetriever {
    pub fn new(
        content: Arc<dyn ContentStore>,
        vector: Arc<dyn VectorSearch>,
        config: Arc<EngineConfig>,
    ) -> Self {
        Self {
            content,
            vector,
            config,
        }
    }

    /// Retrieve ordered fragments for one turn.
    pub async fn retrieve(
        &self,
        message: &str,
        ctx: &SessionContext,
    ) -> Vec<KnowledgeFragment> {
        let mut fragments = self.rule_fragments(message, ctx);

        if should_use_vector(message, self.config.vector_trigger_tokens) {
            fragments.extend(self.vector_fragments(message, ctx).await);
        }

        fragments
    }

    /// Evaluate the rule table and resolve matched sections from the
    /// content store in the session's locale.
    fn rule_fragments(&self, message: &str, ctx: &SessionContext) -> Vec<KnowledgeFragment> {
        let locale = self.content.resolve_locale(&ctx.language);
        let mut fragments = Vec::new();

        for rule in match_rules(message) {
            for section in rule.sections {
                match self.content.section(&locale, section) {
                    Some(content) => {
                        fragments.push(KnowledgeFragment::section(*section, content));
                    }
                    None => {
                        debug!(section, locale = %locale, "content section absent, skipped");
                    }
                }
            }
        }
        fragments
    }

    /// Run the vector path: rewrite, search under a timeout, normalize.
    /// Failures degrade to an empty list.
    async fn vector_fragments(
        &self,
        message: &str,
        ctx: &SessionContext,
    ) -> Vec<KnowledgeFragment> {
        let query = rewrite_query(message, ctx);
        let vcfg = &self.config.vector;
        debug!(query = %query, backend = self.vector.name(), "vector search");

        let search = self
            .vector
            .search(&query, vcfg.top_k, vcfg.min_similarity, &ctx.language);

        let hits = match tokio::time::timeout(Duration::from_millis(vcfg.timeout_ms), search).await
        {
            Ok(Ok(hits)) => hits,
            Ok(Err(e)) => {
                warn!(error = %e, "vector backend failed, continuing rule-only");
                return Vec::new();
            }
            Err(_) => {
                warn!(timeout_ms = vcfg.timeout_ms, "vector search timed out, continuing rule-only");
                return Vec::new();
            }
        };

        let mut fragments: Vec<KnowledgeFragment> = hits
            .into_iter()
            .filter(|h| h.similarity >= vcfg.min_similarity)
            .map(|h| KnowledgeFragment::vector(h.content, h.similarity, h.metadata))
            .collect();

        // Descending similarity.
        fragments.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        fragments.truncate(vcfg.top_k);
        fragments
    }
}
