//! Query rewriting for the vector path.
//!
//! Short follow-ups carry almost no retrievable signal on their own
//! ("what about steps", "15.03"). Before hitting the embedding index the
//! raw query is expanded with conversation state: the active topic chain
//! when one exists, otherwise the last topic, otherwise a synthesized
//! booking phrase around a bare date token.

use frontdesk_core::text::{normalize, token_count};
use frontdesk_core::SessionContext;

/// Openers that mark a message as a follow-up to earlier content.
const FOLLOWUP_OPENERS: &[&str] = &[
    "a co z",
    "what about",
    "a ile",
    "and how",
    "how about",
    "czy jest",
    "a jak",
];

/// Whether the vector path should run for this message: short messages and
/// recognizable follow-up openers only. Everything else is answered well
/// enough by the rule matcher.
pub fn should_use_vector(message: &str, trigger_tokens: usize) -> bool {
    if token_count(message) <= trigger_tokens {
        return true;
    }
    let lower = normalize(message);
    FOLLOWUP_OPENERS.iter().any(|o| lower.starts_with(o))
}

/// Rewrite the raw query with conversation state before embedding search.
pub fn rewrite_query(message: &str, ctx: &SessionContext) -> String {
    if !ctx.active_topic_chain.is_empty() {
        return format!("{} {}", ctx.active_topic_chain.join(" "), message);
    }

    if let Some(last) = &ctx.last_topic {
        return format!("{last} {message}");
    }

    // A bare date token with booking context becomes a booking phrase.
    if ctx.booking.has_history() {
        if let Some(date) = ctx.booking.dates.last() {
            if message.trim() == date.raw {
                return format!("rezerwacja terminu {}", date.raw);
            }
        }
    }

    message.to_string()
}
