//! Configuration loading and validation for the FrontDesk engine.
//!
//! Loads configuration from a TOML file (path from `FRONTDESK_CONFIG`, or a
//! caller-supplied path) with environment variable overrides. Validates all
//! settings at load. Every knob has a serde default, so an empty file — or
//! no file at all — yields a working configuration.
//!
//! The booking-change thresholds are heuristic values with no documented
//! derivation; they are carried as configuration rather than re-derived.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// The root engine configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum messages kept in a session's history.
    pub history_cap: usize,

    /// Seconds of inactivity before a session context expires.
    pub session_ttl_secs: u64,

    /// Messages at or below this token count run the date-token check.
    pub short_message_tokens: usize,

    /// Messages at or below this token count trigger the vector path.
    pub vector_trigger_tokens: usize,

    /// Default language code before a session locks one.
    pub default_language: String,

    /// The target language whose alphabet locks the session.
    pub target_language: String,

    /// Characters unique to the target language's alphabet.
    pub target_unique_chars: String,

    /// Vector search backend settings.
    pub vector: VectorConfig,

    /// Booking-change gating thresholds.
    pub booking: BookingThresholds,

    /// Assembled-prompt cache settings.
    pub prompt_cache: PromptCacheConfig,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorConfig {
    /// Base URL of the embedding-similarity service. An empty endpoint
    /// selects the no-op backend, so vector searches find nothing.
    pub endpoint: String,

    /// Optional bearer token for the service.
    pub api_key: Option<String>,

    /// Top-k cutoff for similarity results.
    pub top_k: usize,

    /// Similarity floor; hits below it are discarded by the backend.
    pub min_similarity: f32,

    /// Per-call timeout. On expiry the turn continues rule-only.
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingThresholds {
    /// An explicit negative signal above this confidence clears change intent.
    pub clear_threshold: f32,

    /// Stored change intent at or above this confidence surfaces the form.
    pub show_threshold: f32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptCacheConfig {
    /// Seconds an assembled prompt stays valid.
    pub ttl_secs: u64,

    /// Maximum cached prompts; oldest evicted past this.
    pub capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_cap: 20,
            session_ttl_secs: 86_400,
            short_message_tokens: 5,
            vector_trigger_tokens: 3,
            default_language: "auto".into(),
            target_language: "pl".into(),
            target_unique_chars: "ąćęłńśźżĄĆĘŁŃŚŹŻ".into(),
            vector: VectorConfig::default(),
            booking: BookingThresholds::default(),
            prompt_cache: PromptCacheConfig::default(),
        }
    }
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: None,
            top_k: 5,
            min_similarity: 0.5,
            timeout_ms: 2_500,
        }
    }
}

impl Default for BookingThresholds {
    fn default() -> Self {
        Self {
            clear_threshold: 0.7,
            show_threshold: 0.8,
        }
    }
}

impl Default for PromptCacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 86_400,
            capacity: 64,
        }
    }
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConfig")
            .field("history_cap", &self.history_cap)
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field("short_message_tokens", &self.short_message_tokens)
            .field("vector_trigger_tokens", &self.vector_trigger_tokens)
            .field("default_language", &self.default_language)
            .field("target_language", &self.target_language)
            .field("vector", &self.vector)
            .field("booking", &self.booking)
            .field("prompt_cache", &self.prompt_cache)
            .finish()
    }
}

impl std::fmt::Debug for VectorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &redact(&self.api_key))
            .field("top_k", &self.top_k)
            .field("min_similarity", &self.min_similarity)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl EngineConfig {
    /// Load from a TOML file, apply env overrides, and validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config: Self = toml::from_str(&raw)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load from `FRONTDESK_CONFIG` if set, otherwise defaults with env
    /// overrides applied.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var("FRONTDESK_CONFIG") {
            return Self::load(path);
        }
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("FRONTDESK_VECTOR_URL") {
            self.vector.endpoint = url;
        }
        if let Ok(key) = std::env::var("FRONTDESK_VECTOR_API_KEY") {
            self.vector.api_key = Some(key);
        }
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_cap == 0 {
            return Err(ConfigError::Invalid("history_cap must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.vector.min_similarity) {
            return Err(ConfigError::Invalid(
                "vector.min_similarity must be within [0, 1]".into(),
            ));
        }
        for (name, value) in [
            ("booking.clear_threshold", self.booking.clear_threshold),
            ("booking.show_threshold", self.booking.show_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be within [0, 1]"
                )));
            }
        }
        if self.prompt_cache.capacity == 0 {
            return Err(ConfigError::Invalid(
                "prompt_cache.capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
