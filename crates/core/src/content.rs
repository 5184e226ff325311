//! Static domain content store trait.
//!
//! Read-only nested content keyed by logical section name, available in at
//! least two locale variants. Addressed by the rule matcher; authored
//! outside this system.

/// Read-only section lookup over the static domain content.
pub trait ContentStore: Send + Sync {
    /// Fetch a content section by locale and logical name.
    fn section(&self, locale: &str, name: &str) -> Option<String>;

    /// The locales this store carries content for.
    fn locales(&self) -> Vec<String>;

    /// Resolve a locale, falling back to the store's first locale when the
    /// requested one is absent ("auto" resolves to the fallback).
    fn resolve_locale(&self, requested: &str) -> String {
        let locales = self.locales();
        if locales.iter().any(|l| l == requested) {
            requested.to_string()
        } else {
            locales.first().cloned().unwrap_or_default()
        }
    }
}
