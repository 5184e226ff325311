//! Instruction payload assembly and caching for the FrontDesk engine.
//!
//! Authored instruction content lives in an id-addressed [`InstructionSet`];
//! the [`PromptOptimizer`] splices the sections relevant to each turn and
//! caches the result per `(intent, topic, language)`.

pub mod cache;
pub mod optimizer;
pub mod sections;

pub use cache::{PromptCache, PromptCacheKey};
pub use optimizer::PromptOptimizer;
pub use sections::{InstructionSet, SectionId};
