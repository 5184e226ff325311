//! Turn orchestration for the FrontDesk conversation engine.
//!
//! One [`Engine::turn`] call runs the full per-message pipeline: language
//! detection and lock merging, history append with the short-message date
//! check, booking-intent classification, topic tracking, hybrid knowledge
//! retrieval, and instruction assembly. The turn is infallible by
//! construction — every fallible collaborator degrades internally — so the
//! caller always receives a usable [`TurnOutput`].
//!
//! The generation call itself is out of scope; callers take the assembled
//! prompt and fragments to their model of choice and append the reply back
//! through [`Engine::record_reply`].

use std::sync::Arc;

use frontdesk_config::EngineConfig;
use frontdesk_core::{
    BookingIntentDetector, ContentStore, KnowledgeFragment, SessionContext, SessionId,
    VectorSearch,
};
use frontdesk_prompt::{InstructionSet, PromptOptimizer};
use frontdesk_retrieval::KnowledgeRetriever;
use frontdesk_session::{should_show_booking_change, SessionDiagnostics, SessionStore};
use serde::Serialize;
use tracing::{debug, instrument};

/// Everything the caller needs to run the generation call for one turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutput {
    /// The session this turn belongs to.
    pub session_id: String,

    /// The session's current language code after this turn.
    pub language: String,

    /// The most recently matched topic, if any.
    pub last_topic: Option<String>,

    /// Topics newly detected in this message, in match order.
    pub new_topics: Vec<String>,

    /// Retrieved knowledge: rule fragments first, then vector fragments
    /// by descending similarity.
    pub fragments: Vec<KnowledgeFragment>,

    /// The assembled instruction payload.
    pub prompt: String,

    /// Whether to surface the change-booking form this turn.
    pub show_booking_change_form: bool,
}

/// The conversation engine: owns the session store, the retriever, and the
/// prompt optimizer, and wires them into one pipeline per turn.
pub struct Engine {
    store: SessionStore,
    retriever: KnowledgeRetriever,
    optimizer: PromptOptimizer,
    instructions: InstructionSet,
    intent_detector: Option<Arc<dyn BookingIntentDetector>>,
    config: Arc<EngineConfig>,
}

impl Engine {
    pub fn new(
        config: Arc<EngineConfig>,
        content: Arc<dyn ContentStore>,
        vector: Arc<dyn VectorSearch>,
        instructions: InstructionSet,
    ) -> Self {
        Self {
            store: SessionStore::new(Arc::clone(&config)),
            retriever: KnowledgeRetriever::new(content, vector, Arc::clone(&config)),
            optimizer: PromptOptimizer::new(Arc::clone(&config)),
            instructions,
            intent_detector: None,
            config,
        }
    }

    /// Attach the external booking-change classifier. Without one, change
    /// intent is driven by the topic table alone.
    pub fn with_intent_detector(mut self, detector: Arc<dyn BookingIntentDetector>) -> Self {
        self.intent_detector = Some(detector);
        self
    }

    /// Process one user message. Infallible: collaborator failures degrade
    /// inside the pipeline and the turn always completes.
    #[instrument(skip(self, message), fields(session = %session_id))]
    pub async fn turn(&self, session_id: &str, message: &str) -> TurnOutput {
        self.store.get_or_create(session_id).await;
        self.store.update_language(session_id, message).await;
        self.store.append_message(session_id, message).await;

        let signal = match &self.intent_detector {
            Some(detector) => {
                let ctx = self.snapshot(session_id).await;
                detector.detect(message, &ctx).await
            }
            None => None,
        };
        if let Some(signal) = signal {
            self.store
                .apply_booking_signal(session_id, message, signal)
                .await;
        }

        let new_topics = self.store.update_topics(session_id, message).await;
        let ctx = self.snapshot(session_id).await;

        let show_form =
            should_show_booking_change(&ctx, message, signal.as_ref(), &self.config.booking);
        let fragments = self.retriever.retrieve(message, &ctx).await;
        let prompt = self.optimizer.optimize(&self.instructions, message, &ctx);

        debug!(
            language = %ctx.language,
            last_topic = ?ctx.last_topic,
            fragments = fragments.len(),
            show_form,
            "turn complete"
        );

        TurnOutput {
            session_id: session_id.to_string(),
            language: ctx.language,
            last_topic: ctx.last_topic,
            new_topics,
            fragments,
            prompt,
            show_booking_change_form: show_form,
        }
    }

    /// Append the assistant's reply to the session history.
    pub async fn record_reply(&self, session_id: &str, reply: &str) {
        self.store.record_reply(session_id, reply).await;
    }

    /// Enumerate live sessions for diagnostics.
    pub async fn sessions(&self) -> Vec<SessionDiagnostics> {
        self.store.sessions().await
    }

    /// Tear down a session early.
    pub async fn end_session(&self, session_id: &str) -> bool {
        self.store.remove(session_id).await
    }

    /// Snapshot of a session's context for this turn.
    async fn snapshot(&self, session_id: &str) -> SessionContext {
        match self.store.get(session_id).await {
            Some(ctx) => ctx,
            // Expired mid-turn: continue on a fresh context.
            None => SessionContext::new(SessionId::from(session_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use frontdesk_core::error::RetrievalError;
    use frontdesk_core::{BookingIntentSignal, FragmentKind, SearchHit};
    use frontdesk_prompt::SectionId;
    use frontdesk_retrieval::{NoopVectorSearch, StaticContentStore};
    use std::sync::Mutex;

    struct RecordingVectorSearch {
        queries: Mutex<Vec<String>>,
    }

    impl RecordingVectorSearch {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                queries: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl VectorSearch for RecordingVectorSearch {
        fn name(&self) -> &str {
            "recording"
        }

        async fn search(
            &self,
            query: &str,
            _top_k: usize,
            _min_similarity: f32,
            _language: &str,
        ) -> Result<Vec<SearchHit>, RetrievalError> {
            self.queries.lock().unwrap().push(query.to_string());
            Ok(vec![SearchHit {
                content: "Rytuał trwa około trzech godzin.".into(),
                metadata: Default::default(),
                similarity: 0.88,
            }])
        }
    }

    struct FailingVectorSearch;

    #[async_trait]
    impl VectorSearch for FailingVectorSearch {
        fn name(&self) -> &str {
            "failing"
        }

        async fn search(
            &self,
            _query: &str,
            _top_k: usize,
            _min_similarity: f32,
            _language: &str,
        ) -> Result<Vec<SearchHit>, RetrievalError> {
            Err(RetrievalError::BackendUnavailable("down".into()))
        }
    }

    /// Always returns the same signal.
    struct FixedDetector(BookingIntentSignal);

    #[async_trait]
    impl BookingIntentDetector for FixedDetector {
        async fn detect(
            &self,
            _message: &str,
            _ctx: &SessionContext,
        ) -> Option<BookingIntentSignal> {
            Some(self.0)
        }
    }

    fn engine() -> Engine {
        engine_with(Arc::new(NoopVectorSearch), EngineConfig::default())
    }

    fn engine_with(vector: Arc<dyn VectorSearch>, config: EngineConfig) -> Engine {
        Engine::new(
            Arc::new(config),
            Arc::new(StaticContentStore::with_default_catalog()),
            vector,
            InstructionSet::with_default_sections(),
        )
    }

    fn signal(show: bool, confidence: f32) -> BookingIntentSignal {
        BookingIntentSignal {
            should_show_form: show,
            confidence,
            is_within_agent_hours: true,
        }
    }

    #[tokio::test]
    async fn polish_pricing_question_locks_language_and_retrieves_packages() {
        let engine = engine();
        let out = engine
            .turn("s1", "Ile kosztuje wejście do sauny? Proszę o cennik.")
            .await;

        assert_eq!(out.language, "pl");
        assert!(out.new_topics.contains(&"pricing".to_string()));
        assert!(out
            .fragments
            .iter()
            .any(|f| f.subtype.as_deref() == Some("packages")));
        assert!(out.prompt.ends_with("Odpowiadaj po polsku."));
    }

    #[tokio::test]
    async fn language_lock_survives_english_followup() {
        let engine = engine();
        engine.turn("s1", "Dzień dobry, jakie są godziny?").await;
        let out = engine.turn("s1", "and the weekend?").await;
        assert_eq!(out.language, "pl");
    }

    #[tokio::test]
    async fn short_followup_expands_query_from_topic_chain() {
        let vector = RecordingVectorSearch::new();
        let engine = engine_with(
            Arc::clone(&vector) as Arc<dyn VectorSearch>,
            EngineConfig::default(),
        );

        engine.turn("s1", "Jak wygląda rytuał łaźni?").await;
        let out = engine.turn("s1", "what about steps").await;

        let queries = vector.queries.lock().unwrap();
        assert_eq!(queries.as_slice(), ["ritual steps what about steps"]);
        assert!(out
            .fragments
            .iter()
            .any(|f| f.kind == FragmentKind::Vector));
    }

    #[tokio::test]
    async fn explicit_positive_signal_surfaces_change_form() {
        let engine =
            engine().with_intent_detector(Arc::new(FixedDetector(signal(true, 0.9))));
        let out = engine.turn("s1", "chcę przełożyć moją wizytę").await;
        assert!(out.show_booking_change_form);
        assert_eq!(out.last_topic.as_deref(), Some("booking_change"));
    }

    #[tokio::test]
    async fn difference_question_vetoes_change_form() {
        let engine =
            engine().with_intent_detector(Arc::new(FixedDetector(signal(true, 0.9))));
        let out = engine
            .turn("s1", "czym się różni pakiet klasyczny od premium?")
            .await;
        assert!(!out.show_booking_change_form);
    }

    #[tokio::test]
    async fn strong_negative_signal_clears_stored_intent() {
        let engine =
            engine().with_intent_detector(Arc::new(FixedDetector(signal(false, 0.9))));
        let out = engine.turn("s1", "a właściwie ile kosztuje pakiet?").await;
        assert!(!out.show_booking_change_form);

        let ctx = engine.store.get("s1").await.unwrap();
        assert!(!ctx.booking.has_change_intent);
    }

    #[tokio::test]
    async fn vector_outage_degrades_to_rule_fragments() {
        let engine = engine_with(Arc::new(FailingVectorSearch), EngineConfig::default());
        let out = engine.turn("s1", "cennik").await;
        assert!(!out.fragments.is_empty());
        assert!(out
            .fragments
            .iter()
            .all(|f| f.kind == FragmentKind::Section));
    }

    #[tokio::test]
    async fn history_cap_enforced_across_turns() {
        let mut config = EngineConfig::default();
        config.history_cap = 4;
        let engine = engine_with(Arc::new(NoopVectorSearch), config);

        for i in 0..10 {
            engine.turn("s1", &format!("wiadomość {i}")).await;
        }
        engine.record_reply("s1", "oczywiście").await;

        let ctx = engine.store.get("s1").await.unwrap();
        assert_eq!(ctx.history.len(), 4);
        assert_eq!(ctx.message_count, 11);
        assert_eq!(ctx.history.last().unwrap().content, "oczywiście");
    }

    #[tokio::test]
    async fn prompt_always_carries_base_and_directive() {
        let engine = engine();
        let base = InstructionSet::with_default_sections()
            .get(SectionId::Base)
            .unwrap()
            .to_string();

        // No diacritics in any message: the session never locks, so the
        // closing directive is the auto-detect one.
        for message in ["hej", "ile kosztuje sauna?", "what about parking"] {
            let out = engine.turn("s1", message).await;
            assert!(out.prompt.starts_with(&base), "missing base for {message}");
            assert!(
                out.prompt.ends_with("respond in that language."),
                "missing directive for {message}"
            );
        }
    }

    #[tokio::test]
    async fn bare_date_after_booking_becomes_preferred() {
        let engine = engine();
        engine.turn("s1", "chciałbym zrobić rezerwację").await;
        engine.turn("s1", "15.03").await;

        let ctx = engine.store.get("s1").await.unwrap();
        assert_eq!(ctx.booking.preferred_date.as_ref().unwrap().raw, "15.03");
        assert_eq!(ctx.last_topic.as_deref(), Some("booking"));
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let engine = engine();
        engine.turn("a", "Proszę o cennik łaźni").await;
        engine.turn("b", "what are your hours?").await;

        let a = engine.store.get("a").await.unwrap();
        let b = engine.store.get("b").await.unwrap();
        assert_eq!(a.language, "pl");
        assert_ne!(a.language, b.language);
        assert!(b.topics.contains(&"hours".to_string()));
        assert!(!b.topics.contains(&"pricing".to_string()));
    }

    #[tokio::test]
    async fn end_session_drops_context() {
        let engine = engine();
        engine.turn("s1", "hej").await;
        assert!(engine.end_session("s1").await);
        assert!(engine.sessions().await.is_empty());
    }
}
