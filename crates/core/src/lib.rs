//! # FrontDesk Core
//!
//! Domain types, traits, and error definitions for the FrontDesk
//! conversation engine. This crate has **zero framework dependencies** — it
//! defines the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator is defined as a trait here. Implementations
//! live in their respective crates. This enables:
//! - Swapping the vector backend or content store via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod content;
pub mod error;
pub mod fragment;
pub mod intent;
pub mod language;
pub mod search;
pub mod session;
pub mod text;

// Re-export key types at crate root for ergonomics
pub use content::ContentStore;
pub use error::{Error, PromptError, Result, RetrievalError, SessionError};
pub use fragment::{FragmentKind, KnowledgeFragment};
pub use intent::{BookingIntentDetector, BookingIntentSignal};
pub use language::{Confidence, LanguageDecision};
pub use search::{SearchHit, VectorSearch};
pub use session::{
    BookingContext, ContextualReference, DateMention, LanguageInfo, LateArrivalContext, Role,
    SessionContext, SessionId, TimeContext, TurnMessage,
};
