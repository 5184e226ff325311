//! In-memory static content store.
//!
//! Read-only nested content keyed by `(locale, section)`. The production
//! content is authored outside this system; the default catalog here
//! carries a trimmed two-locale set so the rule matcher and tests have
//! realistic sections to address.

use std::collections::HashMap;

use frontdesk_core::ContentStore;

/// A `ContentStore` backed by an in-memory map.
#[derive(Debug, Clone, Default)]
pub struct StaticContentStore {
    sections: HashMap<(String, String), String>,
    locales: Vec<String>,
}

impl StaticContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a section, registering the locale on first use.
    pub fn insert(
        &mut self,
        locale: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) {
        let locale = locale.into();
        if !self.locales.contains(&locale) {
            self.locales.push(locale.clone());
        }
        self.sections.insert((locale, name.into()), content.into());
    }

    /// The default two-locale catalog (Polish first, so "auto" resolves to it).
    pub fn with_default_catalog() -> Self {
        let mut store = Self::new();
        for (name, pl, en) in DEFAULT_CATALOG {
            store.insert("pl", *name, *pl);
            store.insert("en", *name, *en);
        }
        store
    }
}

impl ContentStore for StaticContentStore {
    fn section(&self, locale: &str, name: &str) -> Option<String> {
        self.sections
            .get(&(locale.to_string(), name.to_string()))
            .cloned()
    }

    fn locales(&self) -> Vec<String> {
        self.locales.clone()
    }
}

/// `(section, polish, english)` rows of the default catalog.
const DEFAULT_CATALOG: &[(&str, &str, &str)] = &[
    (
        "packages",
        "Pakiety: Klasyczny (120 zł, 2h), Premium (190 zł, 3h z peelingiem), Rodzinny (300 zł).",
        "Packages: Classic (120 PLN, 2h), Premium (190 PLN, 3h with scrub), Family (300 PLN).",
    ),
    (
        "pricing",
        "Cennik: wejście podstawowe 80 zł, weekendy +20 zł. Dzieci do lat 6 bezpłatnie.",
        "Pricing: basic entry 80 PLN, weekends +20 PLN. Children under 6 free.",
    ),
    (
        "ritual",
        "Rytuał trwa 90 minut: sauna, peeling solny, okłady, odpoczynek w tepidarium.",
        "The ritual lasts 90 minutes: sauna, salt scrub, body wraps, rest in the tepidarium.",
    ),
    (
        "booking",
        "Rezerwacje online lub telefonicznie. Prosimy o przybycie 15 minut przed terminem.",
        "Book online or by phone. Please arrive 15 minutes before your slot.",
    ),
    (
        "hours",
        "Czynne codziennie 9:00-21:00, w piątki i soboty do 23:00.",
        "Open daily 9:00-21:00, Fridays and Saturdays until 23:00.",
    ),
    (
        "gift_cards",
        "Karty podarunkowe dostępne od 100 zł, ważne 12 miesięcy.",
        "Gift cards available from 100 PLN, valid 12 months.",
    ),
    (
        "cancellation",
        "Bezpłatne odwołanie do 24h przed wizytą; później pobieramy 50% opłaty.",
        "Free cancellation up to 24h before the visit; 50% fee afterwards.",
    ),
    (
        "late_arrival",
        "Przy spóźnieniu do 20 minut wizyta odbywa się w skróconym czasie; powyżej — prosimy o zmianę terminu.",
        "Up to 20 minutes late, the visit proceeds shortened; beyond that, please reschedule.",
    ),
    (
        "transport",
        "Parking bezpłatny dla gości. Przystanek tramwajowy 200 m od wejścia.",
        "Free parking for guests. Tram stop 200 m from the entrance.",
    ),
    (
        "groups",
        "Grupy od 8 osób: rezerwacja wyłączności sali, rabat 10%.",
        "Groups of 8+: private room reservation, 10% discount.",
    ),
    (
        "facility_comparison",
        "Sauna fińska: 90°C, sucho. Łaźnia parowa: 45°C, wilgotność 100%. Biosauna: 60°C, łagodna.",
        "Finnish sauna: 90°C, dry. Steam bath: 45°C, 100% humidity. Bio sauna: 60°C, mild.",
    ),
];
