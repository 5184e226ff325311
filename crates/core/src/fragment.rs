//! Knowledge fragments — the retrieval unit.
//!
//! Request-scoped: produced by the retriever, consumed once by the prompt
//! assembler. Rule-matched fragments and vector hits are normalized into
//! this single shape before being merged.

use serde::{Deserialize, Serialize};

/// Which retrieval path produced a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentKind {
    /// Deterministic rule match against the static content store.
    Section,
    /// Embedding-similarity hit from the vector backend.
    Vector,
}

/// A retrieved unit of domain knowledge used to ground generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeFragment {
    /// Which retrieval path produced this fragment.
    pub kind: FragmentKind,

    /// Finer-grained label (the content section name, e.g. "packages").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,

    /// The fragment text.
    pub content: String,

    /// Cosine similarity for vector fragments; `None` for rule matches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f32>,

    /// Backend-supplied metadata (source document, locale, ...).
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl KnowledgeFragment {
    /// A fragment produced by the deterministic rule matcher.
    pub fn section(subtype: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind: FragmentKind::Section,
            subtype: Some(subtype.into()),
            content: content.into(),
            similarity: None,
            metadata: serde_json::Map::new(),
        }
    }

    /// A fragment normalized from a vector-search hit.
    pub fn vector(
        content: impl Into<String>,
        similarity: f32,
        metadata: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        Self {
            kind: FragmentKind::Vector,
            subtype: None,
            content: content.into(),
            similarity: Some(similarity),
            metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_fragment_has_no_similarity() {
        let f = KnowledgeFragment::section("packages", "Package A costs 100.");
        assert_eq!(f.kind, FragmentKind::Section);
        assert_eq!(f.subtype.as_deref(), Some("packages"));
        assert!(f.similarity.is_none());
    }

    #[test]
    fn vector_fragment_carries_similarity() {
        let f = KnowledgeFragment::vector("Opening hours are 9-21.", 0.82, Default::default());
        assert_eq!(f.kind, FragmentKind::Vector);
        assert_eq!(f.similarity, Some(0.82));
    }

    #[test]
    fn fragment_serialization_skips_empty_fields() {
        let f = KnowledgeFragment::section("hours", "9-21");
        let json = serde_json::to_string(&f).unwrap();
        assert!(!json.contains("similarity"));
        assert!(!json.contains("metadata"));
    }
}
