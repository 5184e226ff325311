//! Topic & intent tracking.
//!
//! An ordered, declarative table of topic rules is evaluated by one generic
//! matcher; rule data stays independent of matching logic so both can be
//! tested on their own. A secondary related-topics table drives topic
//! chaining for short follow-ups, and a reference lexicon feeds the
//! contextual-reference log.
//!
//! Booking-change intent merging and the surface/veto decision gate live
//! here too: the external classifier's signal is merged conservatively
//! (no flapping on weak signals), and the gate is an AND-of-allow /
//! OR-of-deny policy that minimizes false triggers.

use frontdesk_config::BookingThresholds;
use frontdesk_core::text::{contains_any, normalize};
use frontdesk_core::{BookingIntentSignal, SessionContext};
use tracing::debug;

/// One row of the topic table: a label and the keywords that imply it.
#[derive(Debug, Clone, Copy)]
pub struct TopicRule {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
}

/// Ordered topic table. Later matches overwrite `last_topic`, so rows are
/// ordered from general to specific.
pub const TOPIC_RULES: &[TopicRule] = &[
    TopicRule {
        name: "booking",
        keywords: &["rezerwac", "booking", "reserve", "termin", "zarezerwow", "umów"],
    },
    TopicRule {
        name: "ritual",
        keywords: &["rytuał", "rytual", "ritual", "ceremonia", "ceremony"],
    },
    TopicRule {
        name: "pricing",
        keywords: &["cena", "cennik", "koszt", "price", "cost", "ile kosztuje", "how much"],
    },
    TopicRule {
        name: "packages",
        keywords: &["pakiet", "package", "oferta", "offer", "voucher"],
    },
    TopicRule {
        name: "hours",
        keywords: &["godzin", "otwarte", "otwarcia", "hours", "open", "zamknięcia"],
    },
    TopicRule {
        name: "gift_cards",
        keywords: &["karta podarunkowa", "gift card", "prezent", "bon"],
    },
    TopicRule {
        name: "groups",
        keywords: &["grupa", "grupow", "group", "firmow", "integracj"],
    },
    TopicRule {
        name: "transport",
        keywords: &["dojazd", "parking", "transport", "how to get", "jak dojechać"],
    },
    TopicRule {
        name: "cancellation",
        keywords: &["odwoła", "anulow", "cancel", "zwrot", "refund"],
    },
    TopicRule {
        name: "late_arrival",
        keywords: &["spóźni", "spozni", "late", "opóźni", "nie zdąż"],
    },
    TopicRule {
        name: "booking_change",
        keywords: &["zmienić rezerwac", "przełożyć", "przenieść", "reschedule", "change my booking"],
    },
];

/// Related terms per topic, used to record the active topic chain.
const RELATED_TOPICS: &[(&str, &[&str])] = &[
    ("ritual", &["steps", "etapy", "przebieg", "sauna", "peeling", "masaż", "kroki"]),
    ("packages", &["zawiera", "includes", "różni", "difference", "wybrać"]),
    ("booking", &["godzina", "time", "termin", "date", "data"]),
    ("pricing", &["promocj", "discount", "zniżk", "taniej"]),
];

/// Phrases referring back to earlier conversation content.
const REFERENCE_LEXICON: &[&str] = &[
    "a co z",
    "what about",
    "wspominał",
    "you mentioned",
    "to samo",
    "the same",
    "wcześniej mówił",
    "as before",
];

/// Anaphoric terms that keep a sub-context alive on pronoun follow-ups.
const ANAPHORA_TERMS: &[&str] = &[
    " it", "that", "this", "they", " to ", " tym", " tego", " ona", " one",
];

/// Late-arrival lexicon (shared with the topic table row).
const LATE_ARRIVAL_TERMS: &[&str] = &["spóźni", "spozni", "late", "opóźni", "nie zdąż"];

/// Booking mention, for the hysteresis booking-arm.
const BOOKING_TERMS: &[&str] = &["rezerwac", "booking", "wizyt", "visit", "termin"];

/// Comparison / pricing phrasing that clears change intent.
const COMPARISON_TERMS: &[&str] = &[
    "różni", "difference", "porówn", "compare", "taniej", "cheaper", "ile kosztuje", "how much",
];

/// Difference-between-offerings questions veto the change-booking form.
const DIFFERENCE_QUESTION_TERMS: &[&str] = &[
    "czym się różni",
    "czym sie rozni",
    "difference between",
    "jaka jest różnica",
    "what is the difference",
];

/// Evaluate the topic table against a message, mutating the context.
/// Returns the newly detected topics, in match order.
pub fn update_topics(ctx: &mut SessionContext, message: &str) -> Vec<String> {
    let lower = normalize(message);
    let mut new_topics = Vec::new();

    for rule in TOPIC_RULES {
        if contains_any(&lower, rule.keywords) && ctx.add_topic(rule.name) {
            new_topics.push(rule.name.to_string());
        }
    }

    update_topic_chain(ctx, &lower);

    if contains_any(&lower, REFERENCE_LEXICON) {
        ctx.note_reference();
    }

    update_late_arrival(ctx, &lower);

    if !new_topics.is_empty() {
        debug!(session = %ctx.id, topics = ?new_topics, "new topics detected");
    }
    new_topics
}

/// Record the `[last_topic, related term]` chain when the message names a
/// related term of the current topic.
fn update_topic_chain(ctx: &mut SessionContext, lower: &str) {
    let Some(last) = ctx.last_topic.clone() else {
        return;
    };
    let Some((_, related)) = RELATED_TOPICS.iter().find(|(topic, _)| *topic == last) else {
        return;
    };
    if let Some(term) = related.iter().find(|t| lower.contains(**t)) {
        ctx.set_topic_chain(&last, term);
    }
}

/// Late-arrival hysteresis. A lexical match sets the flag; it is cleared
/// only when the message neither matches the lexicon, nor contains an
/// anaphoric term, nor mentions booking — pronoun-based follow-ups keep
/// the sub-context alive.
fn update_late_arrival(ctx: &mut SessionContext, lower: &str) {
    if contains_any(lower, LATE_ARRIVAL_TERMS) {
        ctx.late_arrival.is_late = true;
        ctx.late_arrival.last_update = Some(chrono::Utc::now());
        ctx.last_topic = Some("late_arrival".into());
        return;
    }
    if !ctx.late_arrival.is_late {
        return;
    }
    let anaphoric = contains_any(lower, ANAPHORA_TERMS)
        || lower.starts_with("it ")
        || lower.starts_with("to ");
    if !anaphoric && !contains_any(lower, BOOKING_TERMS) {
        ctx.late_arrival.is_late = false;
        ctx.late_arrival.last_update = Some(chrono::Utc::now());
    }
}

/// Merge the external booking-change classifier's signal into the context.
///
/// Explicit positive adopts the signal; explicit negative above the clear
/// threshold — or comparison/pricing phrasing — clears; anything else
/// preserves prior state.
pub fn merge_booking_signal(
    ctx: &mut SessionContext,
    message: &str,
    signal: BookingIntentSignal,
    thresholds: &BookingThresholds,
) {
    let lower = normalize(message);

    if signal.should_show_form {
        ctx.booking.has_change_intent = true;
        ctx.booking.change_confidence = signal.confidence;
        ctx.booking.has_intent = true;
        ctx.add_topic("booking_change");
        return;
    }

    let strong_negative = signal.confidence > thresholds.clear_threshold;
    if strong_negative || contains_any(&lower, COMPARISON_TERMS) {
        ctx.booking.has_change_intent = false;
        ctx.booking.change_confidence = 0.0;
        return;
    }

    // Weak signal: preserve prior state, no flapping.
}

/// The decision gate for surfacing the change-booking form.
///
/// `should_show = explicit_positive OR (has_change_intent AND
/// change_confidence >= show_threshold)`, then vetoed by any deny
/// condition.
pub fn should_show_booking_change(
    ctx: &SessionContext,
    message: &str,
    signal: Option<&BookingIntentSignal>,
    thresholds: &BookingThresholds,
) -> bool {
    let explicit_positive = signal.is_some_and(|s| s.should_show_form);
    let stored = ctx.booking.has_change_intent
        && ctx.booking.change_confidence >= thresholds.show_threshold;

    if !(explicit_positive || stored) {
        return false;
    }

    let lower = normalize(message);

    // Deny: packages talk without an actual change topic.
    let packages_without_change = ctx.topics.iter().any(|t| t == "packages")
        && !ctx.topics.iter().any(|t| t == "booking_change");
    if packages_without_change {
        return false;
    }

    // Deny: the user is asking how offerings differ, not asking to change.
    if contains_any(&lower, DIFFERENCE_QUESTION_TERMS) {
        return false;
    }

    true
}
