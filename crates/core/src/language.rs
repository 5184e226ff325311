//! Language decision value object.
//!
//! Produced by the detector each turn, merged into the session's
//! `LanguageInfo` by the context store, never persisted standalone.

use serde::{Deserialize, Serialize};

/// Detector confidence tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    #[default]
    Low,
    Medium,
    High,
}

/// The outcome of classifying one utterance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageDecision {
    /// Whether the utterance is in the target language.
    pub is_target_language: bool,
    /// How sure the detector is.
    pub confidence: Confidence,
    /// Why the detector decided this way (diagnostics).
    pub reason: String,
    /// The resolved language code ("pl", "auto", ...).
    pub language_code: String,
}

impl LanguageDecision {
    /// A high-confidence decision for the target language.
    pub fn target(code: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            is_target_language: true,
            confidence: Confidence::High,
            reason: reason.into(),
            language_code: code.into(),
        }
    }

    /// A deferred decision: not the target language, fall through to the
    /// general multilingual path downstream.
    pub fn auto(confidence: Confidence, reason: impl Into<String>) -> Self {
        Self {
            is_target_language: false,
            confidence,
            reason: reason.into(),
            language_code: "auto".into(),
        }
    }
}
