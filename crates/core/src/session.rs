//! Session context domain types.
//!
//! A `SessionContext` is the per-conversation state that flows through the
//! entire engine: the turn history, the locked language, the topic trail,
//! and the structured sub-contexts (booking, late arrival, time) that the
//! tracker mutates each turn. It is intentionally volatile — created on the
//! first turn, mutated every subsequent turn, and destroyed by an
//! inactivity timer or a process restart.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

use crate::language::Confidence;

/// How many recent topics the rolling reference memory keeps.
pub const RECENT_TOPIC_MEMORY: usize = 5;

/// How many elements an active topic chain holds (current topic + related term).
pub const TOPIC_CHAIN_LEN: usize = 2;

/// Unique identifier for a session (one end-user conversation).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role of a message sender in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The assistant's reply (appended back after the generation call)
    Assistant,
}

/// A single turn message in the bounded history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnMessage {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl TurnMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Language lock state merged from successive `LanguageDecision`s.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageInfo {
    /// Whether the language has been locked for this session.
    pub is_locked: bool,
    /// Confidence of the decision that produced the current value.
    pub confidence: Confidence,
    /// Human-readable reason for the current value (diagnostics).
    pub reason: String,
    /// When the language was last (re)evaluated.
    pub last_update: DateTime<Utc>,
}

impl Default for LanguageInfo {
    fn default() -> Self {
        Self {
            is_locked: false,
            confidence: Confidence::Low,
            reason: "initial".into(),
            last_update: Utc::now(),
        }
    }
}

/// A date the user mentioned. Date-like tokens that fail structured parsing
/// are kept as raw mentions so retrieval can still use them textually.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateMention {
    /// The token exactly as the user wrote it.
    pub raw: String,
    /// The parsed calendar date, when parsing succeeded.
    pub parsed: Option<NaiveDate>,
}

impl DateMention {
    pub fn raw_only(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            parsed: None,
        }
    }
}

/// A recorded change of the preferred booking date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingModification {
    pub from: Option<DateMention>,
    pub to: DateMention,
    pub at: DateTime<Utc>,
}

/// Structured booking sub-context.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingContext {
    /// Whether the user has expressed booking intent this session.
    pub has_intent: bool,
    /// Every date the user has mentioned, in order.
    pub dates: Vec<DateMention>,
    /// The date currently treated as the booking date.
    pub preferred_date: Option<DateMention>,
    /// Log of preferred-date changes.
    pub modifications: Vec<BookingModification>,
    /// Whether the user wants to change an existing booking.
    pub has_change_intent: bool,
    /// Confidence of the change-intent signal, in [0, 1].
    pub change_confidence: f32,
}

impl BookingContext {
    /// Whether any prior booking history exists — used to decide whether a
    /// bare date token should become the preferred date.
    pub fn has_history(&self) -> bool {
        self.has_intent || !self.dates.is_empty()
    }
}

/// Late-arrival sub-context with hysteresis: once set, cleared only when
/// the conversation has demonstrably moved on.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LateArrivalContext {
    pub is_late: bool,
    pub last_update: Option<DateTime<Utc>>,
}

/// Times discussed across the session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeContext {
    /// The time attached to the booking, if one was settled.
    pub booking_time: Option<String>,
    /// Every time token mentioned, in order.
    pub sequence: Vec<String>,
    /// The most recently discussed time.
    pub last_discussed_time: Option<String>,
}

/// A detected reference to earlier conversation content
/// ("the thing you mentioned", "what about that").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextualReference {
    /// The topic the reference most plausibly points at.
    pub topic: String,
    pub timestamp: DateTime<Utc>,
}

/// The full per-session conversation state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionContext {
    /// Session id (opaque, supplied by the caller).
    pub id: SessionId,

    /// Bounded ordered message history. Oldest dropped past the cap.
    pub history: Vec<TurnMessage>,

    /// Total messages ever appended (survives history trimming).
    pub message_count: u64,

    /// The locked language code ("pl", "en", or "auto" before lock).
    pub language: String,

    /// Lock state and provenance of `language`.
    pub language_info: LanguageInfo,

    /// Insertion-ordered, de-duplicated topic labels.
    pub topics: Vec<String>,

    /// The most recently matched topic. Never an older one.
    pub last_topic: Option<String>,

    /// Short ordered pair `[topic, related term]` for follow-up expansion.
    pub active_topic_chain: Vec<String>,

    /// Booking sub-context.
    pub booking: BookingContext,

    /// Late-arrival sub-context.
    pub late_arrival: LateArrivalContext,

    /// Time sub-context.
    pub time: TimeContext,

    /// Rolling memory of the 5 most recent distinct topics (FIFO).
    pub recent_topics: VecDeque<String>,

    /// Detected references to earlier content.
    pub references: Vec<ContextualReference>,

    /// When this session was created.
    pub created_at: DateTime<Utc>,

    /// When this session was last touched.
    pub updated_at: DateTime<Utc>,
}

impl SessionContext {
    /// Create a fresh context with all sub-structures at defaults.
    pub fn new(id: SessionId) -> Self {
        let now = Utc::now();
        Self {
            id,
            history: Vec::new(),
            message_count: 0,
            language: "auto".into(),
            language_info: LanguageInfo::default(),
            topics: Vec::new(),
            last_topic: None,
            active_topic_chain: Vec::new(),
            booking: BookingContext::default(),
            late_arrival: LateArrivalContext::default(),
            time: TimeContext::default(),
            recent_topics: VecDeque::with_capacity(RECENT_TOPIC_MEMORY),
            references: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a message, enforcing the history cap (oldest dropped first).
    pub fn push_message(&mut self, message: TurnMessage, cap: usize) {
        self.history.push(message);
        if self.history.len() > cap {
            let excess = self.history.len() - cap;
            self.history.drain(..excess);
        }
        self.message_count += 1;
        self.updated_at = Utc::now();
    }

    /// Record a topic match. Membership is add-once; `last_topic` is always
    /// overwritten (last match wins). A chain anchored at a different topic
    /// is invalidated, so follow-up expansion never resurrects a topic the
    /// conversation has moved past. Returns `true` if the topic was new.
    pub fn add_topic(&mut self, topic: &str) -> bool {
        if self.active_topic_chain.first().map(String::as_str) != Some(topic) {
            self.active_topic_chain.clear();
        }
        self.last_topic = Some(topic.to_string());
        self.remember_topic(topic);
        if self.topics.iter().any(|t| t == topic) {
            return false;
        }
        self.topics.push(topic.to_string());
        true
    }

    /// Push a topic into the rolling reference memory (FIFO of 5, distinct).
    fn remember_topic(&mut self, topic: &str) {
        if self.recent_topics.back().map(String::as_str) == Some(topic) {
            return;
        }
        self.recent_topics.retain(|t| t != topic);
        self.recent_topics.push_back(topic.to_string());
        while self.recent_topics.len() > RECENT_TOPIC_MEMORY {
            self.recent_topics.pop_front();
        }
    }

    /// Record the 2-element active topic chain used to expand short follow-ups.
    pub fn set_topic_chain(&mut self, topic: &str, related: &str) {
        self.active_topic_chain = vec![topic.to_string(), related.to_string()];
        debug_assert!(self.active_topic_chain.len() == TOPIC_CHAIN_LEN);
    }

    /// Log a reference to earlier content, anchored at the current topic.
    pub fn note_reference(&mut self) {
        if let Some(topic) = &self.last_topic {
            self.references.push(ContextualReference {
                topic: topic.clone(),
                timestamp: Utc::now(),
            });
        }
    }
}
