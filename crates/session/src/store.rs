//! The session context store.
//!
//! Keyed, TTL-bound conversation state. Backed by an in-process map; a
//! per-session expiry task is the only background activity, and it is
//! aborted and respawned on every touch so memory stays bounded under
//! session churn. No cross-restart persistence — the store is
//! deliberately volatile.
//!
//! Concurrency: the `RwLock` protects map integrity. Overlapping turns for
//! the *same* session (duplicate webhook delivery, client retries) are not
//! defended against; last-write-wins on the shared context is an accepted
//! limitation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use frontdesk_config::EngineConfig;
use frontdesk_core::{
    BookingIntentSignal, Confidence, LanguageDecision, SessionContext, SessionId, TurnMessage,
};
use frontdesk_language::LanguageDetector;
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::dates::DateScanner;
use crate::topics;

/// One row of the diagnostic session enumerator.
#[derive(Debug, Clone, Serialize)]
pub struct SessionDiagnostics {
    pub id: String,
    pub message_count: u64,
    pub language: String,
    pub last_topic: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The keyed, TTL-bound session context store.
#[derive(Clone)]
pub struct SessionStore {
    contexts: Arc<RwLock<HashMap<String, SessionContext>>>,
    timers: Arc<RwLock<HashMap<String, JoinHandle<()>>>>,
    config: Arc<EngineConfig>,
    detector: LanguageDetector,
    dates: DateScanner,
}

impl SessionStore {
    pub fn new(config: Arc<EngineConfig>) -> Self {
        let detector =
            LanguageDetector::new(config.target_language.clone(), &config.target_unique_chars);
        Self {
            contexts: Arc::new(RwLock::new(HashMap::new())),
            timers: Arc::new(RwLock::new(HashMap::new())),
            config,
            detector,
            dates: DateScanner::new(),
        }
    }

    /// Fetch the context for a session id, creating a fresh one when absent
    /// (first turn, or the previous context expired). Creation initializes
    /// every sub-structure to defaults and starts the expiry timer.
    pub async fn get_or_create(&self, id: &str) -> SessionContext {
        {
            let contexts = self.contexts.read().await;
            if let Some(ctx) = contexts.get(id) {
                return ctx.clone();
            }
        }

        let ctx = SessionContext::new(SessionId::from(id));
        self.contexts
            .write()
            .await
            .insert(id.to_string(), ctx.clone());
        self.schedule_expiry(id).await;
        info!(session = %id, "session context created");
        ctx
    }

    /// Snapshot a context without creating one.
    pub async fn get(&self, id: &str) -> Option<SessionContext> {
        self.contexts.read().await.get(id).cloned()
    }

    /// Append a user message, enforcing the history cap. Short messages
    /// (at or below the configured token count) run the date-token check;
    /// a matched date is pushed into the booking context, and promoted to
    /// the preferred date when prior booking history exists. Clock-time
    /// tokens are recorded into the time sub-context on every message.
    pub async fn append_message(&self, id: &str, content: &str) {
        self.ensure(id).await;
        {
            let mut contexts = self.contexts.write().await;
            let Some(ctx) = contexts.get_mut(id) else {
                return;
            };
            ctx.push_message(TurnMessage::user(content), self.config.history_cap);

            if frontdesk_core::text::token_count(content) <= self.config.short_message_tokens {
                if let Some(mention) = self.dates.scan(content) {
                    self.record_date(ctx, mention);
                }
            }

            if let Some(time) = self.dates.scan_time(content) {
                ctx.time.sequence.push(time.clone());
                ctx.time.last_discussed_time = Some(time.clone());
                if ctx.booking.has_history() {
                    ctx.time.booking_time = Some(time);
                }
            }
        }
        self.schedule_expiry(id).await;
    }

    /// Append the assistant's reply (after the out-of-scope generation call).
    pub async fn record_reply(&self, id: &str, content: &str) {
        self.ensure(id).await;
        {
            let mut contexts = self.contexts.write().await;
            if let Some(ctx) = contexts.get_mut(id) {
                ctx.push_message(TurnMessage::assistant(content), self.config.history_cap);
            }
        }
        self.schedule_expiry(id).await;
    }

    fn record_date(&self, ctx: &mut SessionContext, mention: frontdesk_core::DateMention) {
        let had_history = ctx.booking.has_history() || ctx.topics.iter().any(|t| t == "booking");
        ctx.booking.dates.push(mention.clone());

        if !had_history {
            return;
        }

        if let Some(prev) = ctx.booking.preferred_date.clone() {
            if prev != mention {
                ctx.booking.modifications.push(frontdesk_core::session::BookingModification {
                    from: Some(prev),
                    to: mention.clone(),
                    at: Utc::now(),
                });
                debug!(session = %ctx.id, date = %mention.raw, "preferred date changed");
            }
        }
        ctx.booking.preferred_date = Some(mention);
        ctx.add_topic("booking");
    }

    /// Run the detector and merge the decision under the language
    /// persistence invariant:
    /// - a target-unique character in the *raw* message always forces the
    ///   target language, regardless of detector confidence;
    /// - once locked to the target language, only a High-confidence
    ///   non-target decision switches back to the default;
    /// - otherwise the previous value is retained (sticky-by-default).
    pub async fn update_language(&self, id: &str, message: &str) -> LanguageDecision {
        self.ensure(id).await;
        let decision = self.detector.detect(message);
        let raw_unique = self.detector.has_unique_char(message);

        {
            let mut contexts = self.contexts.write().await;
            let Some(ctx) = contexts.get_mut(id) else {
                return decision;
            };
            self.merge_language(ctx, &decision, raw_unique);
        }
        self.schedule_expiry(id).await;
        decision
    }

    fn merge_language(
        &self,
        ctx: &mut SessionContext,
        decision: &LanguageDecision,
        raw_unique: bool,
    ) {
        let target = self.config.target_language.clone();
        let now = Utc::now();

        if raw_unique {
            ctx.language = target;
            ctx.language_info.is_locked = true;
            ctx.language_info.confidence = Confidence::High;
            ctx.language_info.reason = "alphabet-unique character in raw message".into();
            ctx.language_info.last_update = now;
        } else if decision.is_target_language && decision.confidence == Confidence::High {
            ctx.language = target;
            ctx.language_info.is_locked = true;
            ctx.language_info.confidence = decision.confidence;
            ctx.language_info.reason = decision.reason.clone();
            ctx.language_info.last_update = now;
        } else if ctx.language_info.is_locked && ctx.language == target {
            if !decision.is_target_language && decision.confidence == Confidence::High {
                // High-confidence evidence of another language unlocks.
                ctx.language = self.config.default_language.clone();
                ctx.language_info.is_locked = false;
                ctx.language_info.confidence = decision.confidence;
                ctx.language_info.reason = decision.reason.clone();
                ctx.language_info.last_update = now;
                debug!(session = %ctx.id, "language lock released");
            }
            // Anything weaker: sticky, previous value retained.
        } else {
            ctx.language = decision.language_code.clone();
            ctx.language_info.is_locked = false;
            ctx.language_info.confidence = decision.confidence;
            ctx.language_info.reason = decision.reason.clone();
            ctx.language_info.last_update = now;
        }
    }

    /// Run the topic tracker over a message. Returns newly detected topics.
    pub async fn update_topics(&self, id: &str, message: &str) -> Vec<String> {
        self.ensure(id).await;
        let new_topics = {
            let mut contexts = self.contexts.write().await;
            match contexts.get_mut(id) {
                Some(ctx) => topics::update_topics(ctx, message),
                None => return Vec::new(),
            }
        };
        self.schedule_expiry(id).await;
        new_topics
    }

    /// Merge an external booking-change signal into the context.
    pub async fn apply_booking_signal(
        &self,
        id: &str,
        message: &str,
        signal: BookingIntentSignal,
    ) {
        self.ensure(id).await;
        {
            let mut contexts = self.contexts.write().await;
            if let Some(ctx) = contexts.get_mut(id) {
                topics::merge_booking_signal(ctx, message, signal, &self.config.booking);
            }
        }
        self.schedule_expiry(id).await;
    }

    /// Enumerate live sessions for diagnostics.
    pub async fn sessions(&self) -> Vec<SessionDiagnostics> {
        self.contexts
            .read()
            .await
            .values()
            .map(|ctx| SessionDiagnostics {
                id: ctx.id.to_string(),
                message_count: ctx.message_count,
                language: ctx.language.clone(),
                last_topic: ctx.last_topic.clone(),
                created_at: ctx.created_at,
                updated_at: ctx.updated_at,
            })
            .collect()
    }

    /// Tear down a session early, cancelling its expiry task.
    pub async fn remove(&self, id: &str) -> bool {
        if let Some(handle) = self.timers.write().await.remove(id) {
            handle.abort();
        }
        self.contexts.write().await.remove(id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.contexts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.contexts.read().await.is_empty()
    }

    /// Recreate an expired context transparently so the turn still
    /// succeeds; continuity is lost but nothing aborts.
    async fn ensure(&self, id: &str) {
        let exists = self.contexts.read().await.contains_key(id);
        if !exists {
            let _ = self.get_or_create(id).await;
        }
    }

    /// (Re)start the inactivity-expiry task for a session.
    async fn schedule_expiry(&self, id: &str) {
        let ttl = Duration::from_secs(self.config.session_ttl_secs);
        let contexts = Arc::clone(&self.contexts);
        let timers = Arc::clone(&self.timers);
        let key = id.to_string();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            contexts.write().await.remove(&key);
            timers.write().await.remove(&key);
            info!(session = %key, "session context expired");
        });

        if let Some(previous) = self.timers.write().await.insert(id.to_string(), handle) {
            previous.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SessionStore {
        SessionStore::new(Arc::new(EngineConfig::default()))
    }

    fn store_with(config: EngineConfig) -> SessionStore {
        SessionStore::new(Arc::new(config))
    }

    #[tokio::test]
    async fn get_or_create_is_idempotent_per_id() {
        let store = store();
        let first = store.get_or_create("s1").await;
        let second = store.get_or_create("s1").await;
        assert_eq!(first.id, second.id);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn history_cap_holds_across_many_turns() {
        let mut config = EngineConfig::default();
        config.history_cap = 5;
        let store = store_with(config);

        for i in 0..50 {
            store.append_message("s1", &format!("turn {i}")).await;
            let ctx = store.get("s1").await.unwrap();
            assert!(ctx.history.len() <= 5);
        }
        let ctx = store.get("s1").await.unwrap();
        assert_eq!(ctx.message_count, 50);
    }

    #[tokio::test]
    async fn language_locks_on_diacritic_and_sticks() {
        let store = store();
        store.update_language("s1", "dzień dobry, chciałbym rezerwację").await;
        let ctx = store.get("s1").await.unwrap();
        assert_eq!(ctx.language, "pl");
        assert!(ctx.language_info.is_locked);

        // A plain foreign-keyword greeting must not flip the lock.
        store.update_language("s1", "hello").await;
        let ctx = store.get("s1").await.unwrap();
        assert_eq!(ctx.language, "pl");
        assert!(ctx.language_info.is_locked);
    }

    #[tokio::test]
    async fn raw_unique_char_forces_target_even_when_unlocked() {
        let store = store();
        store.update_language("s1", "what about the hours?").await;
        assert_eq!(store.get("s1").await.unwrap().language, "auto");

        store.update_language("s1", "a może jutro?").await;
        let ctx = store.get("s1").await.unwrap();
        assert_eq!(ctx.language, "pl");
        assert!(ctx.language_info.is_locked);
    }

    #[tokio::test]
    async fn short_date_message_recorded_without_history() {
        let store = store();
        store.append_message("s1", "15.03").await;
        let ctx = store.get("s1").await.unwrap();
        assert_eq!(ctx.booking.dates.len(), 1);
        assert_eq!(ctx.booking.dates[0].raw, "15.03");
        // No prior booking history: not promoted.
        assert!(ctx.booking.preferred_date.is_none());
    }

    #[tokio::test]
    async fn date_promoted_when_booking_history_exists() {
        let store = store();
        store.update_topics("s1", "chcę zrobić rezerwację").await;
        store.append_message("s1", "15.03").await;

        let ctx = store.get("s1").await.unwrap();
        let preferred = ctx.booking.preferred_date.as_ref().unwrap();
        assert_eq!(preferred.raw, "15.03");
        assert_eq!(ctx.last_topic.as_deref(), Some("booking"));
        assert!(ctx.booking.modifications.is_empty());
    }

    #[tokio::test]
    async fn changed_date_logged_as_modification() {
        let store = store();
        store.update_topics("s1", "rezerwacja proszę").await;
        store.append_message("s1", "15.03").await;
        store.append_message("s1", "jednak 22.03").await;

        let ctx = store.get("s1").await.unwrap();
        assert_eq!(ctx.booking.preferred_date.as_ref().unwrap().raw, "22.03");
        assert_eq!(ctx.booking.modifications.len(), 1);
        assert_eq!(ctx.booking.modifications[0].from.as_ref().unwrap().raw, "15.03");
    }

    #[tokio::test]
    async fn long_message_skips_date_check() {
        let store = store();
        store.update_topics("s1", "rezerwacja").await;
        store
            .append_message("s1", "the invoice 15.03 from last year was about something else entirely")
            .await;
        let ctx = store.get("s1").await.unwrap();
        assert!(ctx.booking.dates.is_empty());
    }

    #[tokio::test]
    async fn malformed_date_kept_as_raw_mention() {
        let store = store();
        store.update_topics("s1", "booking").await;
        store.append_message("s1", "31.02").await;
        let ctx = store.get("s1").await.unwrap();
        let preferred = ctx.booking.preferred_date.as_ref().unwrap();
        assert_eq!(preferred.raw, "31.02");
        assert!(preferred.parsed.is_none());
    }

    #[tokio::test]
    async fn discussed_times_tracked_in_sequence() {
        let store = store();
        store.append_message("s1", "czy jest wolne o 16:00?").await;
        store.append_message("s1", "a może jednak 18:30").await;

        let ctx = store.get("s1").await.unwrap();
        assert_eq!(ctx.time.sequence, vec!["16:00", "18:30"]);
        assert_eq!(ctx.time.last_discussed_time.as_deref(), Some("18:30"));
        // No booking history yet, so no settled booking time.
        assert!(ctx.time.booking_time.is_none());
    }

    #[tokio::test]
    async fn time_settles_as_booking_time_with_history() {
        let store = store();
        store.update_topics("s1", "chcę rezerwację").await;
        store.append_message("s1", "15.03").await;
        store.append_message("s1", "o 18:30").await;

        let ctx = store.get("s1").await.unwrap();
        assert_eq!(ctx.time.booking_time.as_deref(), Some("18:30"));
    }

    #[tokio::test]
    async fn expired_session_recreated_transparently() {
        let store = store();
        store.get_or_create("s1").await;
        store.remove("s1").await;

        // The turn still succeeds on a fresh context.
        store.append_message("s1", "hello again").await;
        let ctx = store.get("s1").await.unwrap();
        assert_eq!(ctx.history.len(), 1);
        assert_eq!(ctx.message_count, 1);
    }

    #[tokio::test]
    async fn sessions_enumerator_reports_diagnostics() {
        let store = store();
        store.append_message("a", "hej").await;
        store.append_message("b", "cześć").await;
        store.update_topics("b", "cennik").await;

        let mut sessions = store.sessions().await;
        sessions.sort_by(|x, y| x.id.cmp(&y.id));
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].message_count, 1);
        assert_eq!(sessions[1].last_topic.as_deref(), Some("pricing"));
    }

    #[tokio::test(start_paused = true)]
    async fn inactivity_expiry_removes_context() {
        let mut config = EngineConfig::default();
        config.session_ttl_secs = 60;
        let store = store_with(config);

        store.get_or_create("s1").await;
        assert_eq!(store.len().await, 1);

        tokio::time::sleep(Duration::from_secs(61)).await;
        // Let the expiry task run.
        tokio::task::yield_now().await;
        assert!(store.get("s1").await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn activity_resets_expiry() {
        let mut config = EngineConfig::default();
        config.session_ttl_secs = 60;
        let store = store_with(config);

        store.get_or_create("s1").await;
        tokio::time::sleep(Duration::from_secs(40)).await;
        store.append_message("s1", "still here").await;
        tokio::time::sleep(Duration::from_secs(40)).await;
        tokio::task::yield_now().await;

        // 80s total but only 40s since last activity.
        assert!(store.get("s1").await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn every_mutating_call_resets_expiry() {
        let mut config = EngineConfig::default();
        config.session_ttl_secs = 60;
        let store = store_with(config);

        store.get_or_create("s1").await;
        tokio::time::sleep(Duration::from_secs(40)).await;
        store.update_topics("s1", "cennik").await;
        tokio::time::sleep(Duration::from_secs(40)).await;
        store.update_language("s1", "dzień dobry").await;
        tokio::time::sleep(Duration::from_secs(40)).await;
        store.record_reply("s1", "zapraszamy").await;
        tokio::time::sleep(Duration::from_secs(40)).await;
        tokio::task::yield_now().await;

        // 160s total, but never 60s without activity.
        assert!(store.get("s1").await.is_some());
    }

    #[tokio::test]
    async fn remove_cancels_timer_and_drops_context() {
        let store = store();
        store.get_or_create("s1").await;
        assert!(store.remove("s1").await);
        assert!(store.get("s1").await.is_none());
        assert!(!store.remove("s1").await);
    }
}
