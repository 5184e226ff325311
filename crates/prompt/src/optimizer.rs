//! Per-turn instruction assembly.
//!
//! Splices the base block, the category sections relevant to the current
//! turn, the always-on tone and personal-language sections, and a closing
//! language directive. Assembled prompts are cached by
//! `(intent, topic, language)`; any referenced section that has gone
//! missing triggers the full-text fallback instead of a partial prompt.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use frontdesk_config::EngineConfig;
use frontdesk_core::text::{contains_any, normalize};
use frontdesk_core::{PromptError, SessionContext};
use tracing::{debug, warn};

use crate::cache::{PromptCache, PromptCacheKey};
use crate::sections::{InstructionSet, SectionId};

/// Maps one instruction section to the topics and message keywords that
/// make it relevant for a turn.
struct CategoryRule {
    section: SectionId,
    topics: &'static [&'static str],
    keywords: &'static [&'static str],
}

const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        section: SectionId::Pricing,
        topics: &["pricing", "packages"],
        keywords: &["cen", "cennik", "koszt", "ile kosztuje", "price", "cost"],
    },
    CategoryRule {
        section: SectionId::Ritual,
        topics: &["ritual"],
        keywords: &["rytuał", "rytual", "etap", "ritual", "steps"],
    },
    CategoryRule {
        section: SectionId::Cancellation,
        topics: &["cancellation"],
        keywords: &["odwoła", "odwola", "anulowa", "cancel", "refund"],
    },
    CategoryRule {
        section: SectionId::Hours,
        topics: &["hours"],
        keywords: &["godzin", "otwarte", "otwarcia", "hours", "open"],
    },
    CategoryRule {
        section: SectionId::Groups,
        topics: &["groups"],
        keywords: &["grup", "group", "firmow", "integracj"],
    },
    CategoryRule {
        section: SectionId::Transport,
        topics: &["transport"],
        keywords: &["dojazd", "dojecha", "parking", "tramwaj", "directions"],
    },
    CategoryRule {
        section: SectionId::Discounts,
        topics: &[],
        keywords: &["promocj", "rabat", "zniżk", "znizk", "discount"],
    },
    CategoryRule {
        section: SectionId::Products,
        topics: &[],
        keywords: &["produkt", "kosmetyk", "sklep", "product"],
    },
    CategoryRule {
        section: SectionId::Amenities,
        topics: &[],
        keywords: &["ręcznik", "recznik", "szlafrok", "udogodnie", "towel", "amenities"],
    },
    CategoryRule {
        section: SectionId::GiftCards,
        topics: &["gift_cards"],
        keywords: &["podarunkow", "voucher", "bon ", "gift card"],
    },
];

/// Assembles and caches the per-turn instruction payload.
pub struct PromptOptimizer {
    cache: Mutex<PromptCache>,
    config: Arc<EngineConfig>,
}

impl PromptOptimizer {
    pub fn new(config: Arc<EngineConfig>) -> Self {
        let cache = PromptCache::new(
            config.prompt_cache.ttl_secs,
            config.prompt_cache.capacity,
        );
        Self {
            cache: Mutex::new(cache),
            config,
        }
    }

    /// Assemble the instruction payload for one turn.
    ///
    /// Never fails: content drift (a referenced section absent from the
    /// authored set) degrades to the complete unmodified instruction text.
    pub fn optimize(
        &self,
        instructions: &InstructionSet,
        message: &str,
        ctx: &SessionContext,
    ) -> String {
        let key = self.cache_key(ctx);
        let now = Utc::now();

        if let Some(cached) = self.cache.lock().unwrap().get(&key, now) {
            debug!(intent = %key.intent, topic = %key.topic, "prompt cache hit");
            return cached;
        }

        let prompt = match self.assemble(instructions, message, ctx) {
            Ok(prompt) => prompt,
            Err(e) => {
                warn!(error = %e, "instruction content drift, using full text");
                return instructions.full_text();
            }
        };

        self.cache
            .lock()
            .unwrap()
            .insert(key, prompt.clone(), now);
        prompt
    }

    /// Splice the payload; a missing referenced section is content drift
    /// and forces the fallback.
    fn assemble(
        &self,
        instructions: &InstructionSet,
        message: &str,
        ctx: &SessionContext,
    ) -> Result<String, PromptError> {
        if instructions.get(SectionId::Base).is_none() {
            return Err(PromptError::MissingBase);
        }

        let mut referenced = vec![SectionId::Base];
        referenced.extend(self.relevant_categories(message, ctx));
        referenced.push(SectionId::Tone);
        referenced.push(SectionId::PersonalLanguage);

        let mut parts = Vec::with_capacity(referenced.len() + 1);
        for id in referenced {
            let content = instructions
                .get(id)
                .ok_or_else(|| PromptError::MissingSection(id.to_string()))?;
            parts.push(content.to_string());
        }
        parts.push(self.language_directive(&ctx.language).to_string());
        Ok(parts.join("\n\n"))
    }

    /// Category sections relevant to this turn, in rule-table order,
    /// selected by the session's topic trail and the message keywords.
    fn relevant_categories(&self, message: &str, ctx: &SessionContext) -> Vec<SectionId> {
        let lower = normalize(message);
        CATEGORY_RULES
            .iter()
            .filter(|rule| {
                ctx.topics.iter().any(|t| rule.topics.contains(&t.as_str()))
                    || contains_any(&lower, rule.keywords)
            })
            .map(|rule| rule.section)
            .collect()
    }

    /// The closing language directive. The target language gets an explicit
    /// instruction; an unlocked session tells the model to mirror the guest.
    fn language_directive(&self, language: &str) -> &'static str {
        if language == self.config.target_language {
            "Odpowiadaj po polsku."
        } else if language == "en" {
            "Respond in English."
        } else {
            "Detect the language of the guest's message and respond in that language."
        }
    }

    fn cache_key(&self, ctx: &SessionContext) -> PromptCacheKey {
        let intent = if ctx.booking.has_change_intent {
            "booking_change".to_string()
        } else {
            ctx.last_topic.clone().unwrap_or_else(|| "general".into())
        };
        PromptCacheKey {
            intent,
            topic: ctx.last_topic.clone().unwrap_or_else(|| "none".into()),
            language: ctx.language.clone(),
        }
    }

    #[cfg(test)]
    fn cache_len(&self) -> usize {
        self.cache.lock().unwrap().len()
    }
}
