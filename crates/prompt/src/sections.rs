//! Structured instruction sections.
//!
//! The full instruction content is a list of sections addressed by stable
//! identifiers — no substring search against marker text, so authored
//! content can be reordered or reworded without breaking assembly. When a
//! referenced section is absent (content drift), the optimizer falls back
//! to the complete, unmodified set.

use serde::{Deserialize, Serialize};

/// Stable identifier of an instruction section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionId {
    /// The fixed base block: identity, critical rules. Always first.
    Base,
    Pricing,
    Ritual,
    Cancellation,
    Hours,
    Groups,
    Transport,
    Discounts,
    Products,
    Amenities,
    GiftCards,
    /// Tone/voice rules. Always appended.
    Tone,
    /// Personal-language rules. Always appended.
    PersonalLanguage,
}

impl SectionId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Pricing => "pricing",
            Self::Ritual => "ritual",
            Self::Cancellation => "cancellation",
            Self::Hours => "hours",
            Self::Groups => "groups",
            Self::Transport => "transport",
            Self::Discounts => "discounts",
            Self::Products => "products",
            Self::Amenities => "amenities",
            Self::GiftCards => "gift_cards",
            Self::Tone => "tone",
            Self::PersonalLanguage => "personal_language",
        }
    }
}

impl std::fmt::Display for SectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The full authored instruction content, in authored order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstructionSet {
    sections: Vec<(SectionId, String)>,
}

impl InstructionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a section (builder style).
    pub fn section(mut self, id: SectionId, content: impl Into<String>) -> Self {
        self.sections.push((id, content.into()));
        self
    }

    /// Look up a section by id.
    pub fn get(&self, id: SectionId) -> Option<&str> {
        self.sections
            .iter()
            .find(|(sid, _)| *sid == id)
            .map(|(_, content)| content.as_str())
    }

    /// The complete instruction content, unmodified, in authored order.
    /// This is the drift fallback.
    pub fn full_text(&self) -> String {
        self.sections
            .iter()
            .map(|(_, content)| content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// The default authored instruction baseline. Deployments normally
    /// load their own authored set; this one keeps the engine usable out
    /// of the box and gives tests realistic content.
    pub fn with_default_sections() -> Self {
        Self::new()
            .section(
                SectionId::Base,
                "Jesteś asystentem recepcji spa. Odpowiadasz krótko i konkretnie.\n\
                 Zasady krytyczne: nie obiecuj terminów bez potwierdzenia w systemie,\n\
                 nie podawaj cen spoza cennika, przy tematach medycznych odsyłaj do personelu.",
            )
            .section(
                SectionId::Pricing,
                "Ceny podawaj wyłącznie z cennika. Przy pytaniu o cenę wymień pakiet i czas trwania.",
            )
            .section(
                SectionId::Ritual,
                "Opisując rytuał wymień etapy w kolejności: sauna, peeling, okłady, odpoczynek.",
            )
            .section(
                SectionId::Cancellation,
                "Przy odwołaniach przypomnij o granicy 24 godzin i opłacie 50% po jej przekroczeniu.",
            )
            .section(
                SectionId::Hours,
                "Godziny otwarcia podawaj wraz z wyjątkami weekendowymi.",
            )
            .section(
                SectionId::Groups,
                "Przy grupach od 8 osób proponuj rezerwację wyłączności i rabat grupowy.",
            )
            .section(
                SectionId::Transport,
                "Na pytania o dojazd wskaż parking i przystanek tramwajowy.",
            )
            .section(
                SectionId::Discounts,
                "O promocjach informuj tylko, gdy są aktualnie obowiązujące.",
            )
            .section(
                SectionId::Products,
                "Produkty ze sklepu opisuj bez składania obietnic dotyczących efektów.",
            )
            .section(
                SectionId::Amenities,
                "Wymieniając udogodnienia uwzględnij ręczniki, szlafroki i strefę ciszy.",
            )
            .section(
                SectionId::GiftCards,
                "Karty podarunkowe: od 100 zł, ważność 12 miesięcy, realizacja online lub na miejscu.",
            )
            .section(
                SectionId::Tone,
                "Ton: ciepły, profesjonalny, bez wykrzykników. Maksymalnie trzy zdania na akapit.",
            )
            .section(
                SectionId::PersonalLanguage,
                "Zwracaj się bezpośrednio do gościa. Unikaj formy bezosobowej.",
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_finds_section_by_id() {
        let set = InstructionSet::new()
            .section(SectionId::Base, "base text")
            .section(SectionId::Pricing, "pricing text");
        assert_eq!(set.get(SectionId::Pricing), Some("pricing text"));
        assert_eq!(set.get(SectionId::Hours), None);
    }

    #[test]
    fn full_text_preserves_authored_order() {
        let set = InstructionSet::new()
            .section(SectionId::Base, "one")
            .section(SectionId::Tone, "two");
        assert_eq!(set.full_text(), "one\n\ntwo");
    }

    #[test]
    fn default_sections_cover_every_id() {
        let set = InstructionSet::with_default_sections();
        for id in [
            SectionId::Base,
            SectionId::Pricing,
            SectionId::Ritual,
            SectionId::Cancellation,
            SectionId::Hours,
            SectionId::Groups,
            SectionId::Transport,
            SectionId::Discounts,
            SectionId::Products,
            SectionId::Amenities,
            SectionId::GiftCards,
            SectionId::Tone,
            SectionId::PersonalLanguage,
        ] {
            assert!(set.get(id).is_some(), "missing section {id}");
        }
    }
}
