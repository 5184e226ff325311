//! Stateless language detection.
//!
//! Classifies a single utterance as target-language or not, with a
//! confidence tier. The detector never persists anything — language
//! stickiness across turns is the session store's responsibility.
//!
//! # Algorithm
//!
//! 1. Strip the fixed brand/product/place vocabulary from the utterance,
//!    so proper nouns carrying target-alphabet diacritics cannot cause
//!    false positives.
//! 2. If any character unique to the target alphabet remains, the
//!    utterance is the target language — High confidence.
//! 3. Otherwise check for target-language function words written without
//!    diacritics; a hit yields Medium-confidence "auto" (a hint, still
//!    deferred to the multilingual fallback downstream).
//! 4. Otherwise Low-confidence "auto".

use frontdesk_core::text::normalize;
use frontdesk_core::{Confidence, LanguageDecision};
use tracing::trace;

/// Brand, product, and place names stripped before detection. These carry
/// target-alphabet diacritics without implying the user writes the target
/// language.
pub const DEFAULT_BRAND_VOCABULARY: &[&str] = &[
    "łaźnia",
    "łaźni",
    "gdańsk",
    "kraków",
    "łódź",
    "wrocław",
    "żurawie spa",
    "śnieżka",
];

/// Polish function words commonly typed without diacritics.
const ASCII_FUNCTION_WORDS: &[&str] = &[
    "czy", "jak", "gdzie", "ile", "kiedy", "mozna", "prosze", "dziekuje", "jest", "macie",
];

/// The stateless classifier. Create one and reuse it.
#[derive(Debug, Clone)]
pub struct LanguageDetector {
    target_code: String,
    unique_chars: Vec<char>,
    brand_vocabulary: Vec<String>,
}

impl LanguageDetector {
    /// Create a detector for a target language identified by the given
    /// code and set of alphabet-unique characters.
    pub fn new(target_code: impl Into<String>, unique_chars: &str) -> Self {
        Self {
            target_code: target_code.into(),
            unique_chars: unique_chars.chars().collect(),
            brand_vocabulary: DEFAULT_BRAND_VOCABULARY
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Replace the brand vocabulary (entries matched case-insensitively).
    pub fn with_brand_vocabulary(mut self, vocabulary: &[&str]) -> Self {
        self.brand_vocabulary = vocabulary.iter().map(|s| s.to_lowercase()).collect();
        self
    }

    /// Whether the raw text contains a character unique to the target
    /// alphabet. Exposed because the session store applies this check to
    /// the *unstripped* message as an unconditional override.
    pub fn has_unique_char(&self, text: &str) -> bool {
        text.chars().any(|c| self.unique_chars.contains(&c))
    }

    /// Classify one utterance.
    pub fn detect(&self, message: &str) -> LanguageDecision {
        let stripped = self.strip_brand_vocabulary(message);

        if self.has_unique_char(&stripped) {
            trace!(code = %self.target_code, "unique alphabet character found");
            return LanguageDecision::target(
                self.target_code.clone(),
                "alphabet-unique character present",
            );
        }

        let lower = normalize(&stripped);
        let function_word_hit = lower
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| ASCII_FUNCTION_WORDS.contains(&word));

        if function_word_hit {
            LanguageDecision::auto(
                Confidence::Medium,
                "target-language function words without diacritics",
            )
        } else {
            LanguageDecision::auto(Confidence::Low, "no target-language signal")
        }
    }

    fn strip_brand_vocabulary(&self, message: &str) -> String {
        let mut lower = normalize(message);
        for term in &self.brand_vocabulary {
            while let Some(pos) = lower.find(term.as_str()) {
                lower.replace_range(pos..pos + term.len(), "");
            }
        }
        lower
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> LanguageDetector {
        LanguageDetector::new("pl", "ąćęłńśźżĄĆĘŁŃŚŹŻ")
    }

    #[test]
    fn diacritic_yields_high_confidence_target() {
        let d = detector().detect("Ile kosztuje wejście?");
        assert!(d.is_target_language);
        assert_eq!(d.confidence, Confidence::High);
        assert_eq!(d.language_code, "pl");
    }

    #[test]
    fn plain_english_defers_with_low_confidence() {
        let d = detector().detect("What are your opening hours?");
        assert!(!d.is_target_language);
        assert_eq!(d.confidence, Confidence::Low);
        assert_eq!(d.language_code, "auto");
    }

    #[test]
    fn ascii_function_words_raise_to_medium() {
        let d = detector().detect("czy macie wolne terminy");
        assert!(!d.is_target_language);
        assert_eq!(d.confidence, Confidence::Medium);
    }

    #[test]
    fn brand_vocabulary_does_not_trigger_target() {
        // "Łaźnia" carries ł/ź but is a venue name, not user language.
        let d = detector().detect("Is Łaźnia open on Sunday?");
        assert!(!d.is_target_language);
    }

    #[test]
    fn diacritic_outside_brand_term_still_triggers() {
        let d = detector().detect("Łaźnia - a można wcześniej?");
        assert!(d.is_target_language);
        assert_eq!(d.confidence, Confidence::High);
    }

    #[test]
    fn custom_brand_vocabulary_respected() {
        let det = detector().with_brand_vocabulary(&["Żurawie"]);
        let d = det.detect("When does Żurawie open?");
        assert!(!d.is_target_language);
    }

    #[test]
    fn detector_is_stateless_across_calls() {
        let det = detector();
        let first = det.detect("dzień dobry");
        let second = det.detect("hello there");
        assert!(first.is_target_language);
        assert!(!second.is_target_language);
    }
}
