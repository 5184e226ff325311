//! The deterministic retrieval rule table.
//!
//! A priority-ordered table of `(keyword predicate, section references,
//! exclusivity flag)` evaluated by one generic matcher. Multiple
//! independent rules may fire on one message and each contributes its
//! sections; an exclusive rule short-circuits and suppresses every other
//! rule for that turn. Rule data is decoupled from matching logic so each
//! can be tested independently.

use frontdesk_core::text::{contains_any, normalize};

/// One row of the retrieval rule table.
#[derive(Debug, Clone, Copy)]
pub struct RetrievalRule {
    /// Diagnostic name of the rule group.
    pub name: &'static str,
    /// Keywords any of which fires the rule (checked lowercased).
    pub keywords: &'static [&'static str],
    /// Content sections this rule contributes.
    pub sections: &'static [&'static str],
    /// Exclusive rules suppress all other groups for the turn.
    pub exclusive: bool,
}

/// Priority-ordered rule table. Exclusive rows first so a comparison query
/// is answered with exactly the comparison section.
pub const RETRIEVAL_RULES: &[RetrievalRule] = &[
    RetrievalRule {
        name: "facility_comparison",
        keywords: &[
            "czym się różni",
            "czym sie rozni",
            "difference between",
            "jaka jest różnica",
            "porównanie saun",
            "which sauna",
        ],
        sections: &["facility_comparison"],
        exclusive: true,
    },
    RetrievalRule {
        name: "pricing",
        keywords: &["cena", "cennik", "koszt", "ile kosztuje", "price", "cost", "how much"],
        sections: &["pricing", "packages"],
        exclusive: false,
    },
    RetrievalRule {
        name: "ritual",
        keywords: &["rytuał", "rytual", "ritual", "ceremonia", "ceremony", "przebieg"],
        sections: &["ritual"],
        exclusive: false,
    },
    RetrievalRule {
        name: "booking",
        keywords: &["rezerwac", "booking", "reserve", "termin", "zarezerwow"],
        sections: &["booking"],
        exclusive: false,
    },
    RetrievalRule {
        name: "hours",
        keywords: &["godzin", "otwarte", "otwarcia", "hours", "open"],
        sections: &["hours"],
        exclusive: false,
    },
    RetrievalRule {
        name: "gift_cards",
        keywords: &["karta podarunkowa", "gift card", "prezent", "bon", "voucher"],
        sections: &["gift_cards"],
        exclusive: false,
    },
    RetrievalRule {
        name: "cancellation",
        keywords: &["odwoła", "anulow", "cancel", "zwrot", "refund"],
        sections: &["cancellation"],
        exclusive: false,
    },
    RetrievalRule {
        name: "late_arrival",
        keywords: &["spóźni", "spozni", "late", "opóźni"],
        sections: &["late_arrival"],
        exclusive: false,
    },
    RetrievalRule {
        name: "transport",
        keywords: &["dojazd", "parking", "how to get", "jak dojechać"],
        sections: &["transport"],
        exclusive: false,
    },
    RetrievalRule {
        name: "groups",
        keywords: &["grupa", "grupow", "group", "firmow", "integracj"],
        sections: &["groups"],
        exclusive: false,
    },
];

/// Evaluate the table against a message. Deterministic and idempotent:
/// the same message always yields the same rules in the same order.
pub fn match_rules(message: &str) -> Vec<&'static RetrievalRule> {
    let lower = normalize(message);
    let mut matched = Vec::new();

    for rule in RETRIEVAL_RULES {
        if contains_any(&lower, rule.keywords) {
            if rule.exclusive {
                // Short-circuit: this group alone answers the turn.
                return vec![rule];
            }
            matched.push(rule);
        }
    }
    matched
}
