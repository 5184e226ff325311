//! Error types for the FrontDesk domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.
//!
//! Note that every failure mode in this subsystem is recovered *locally*:
//! a vector backend outage degrades to rule-only retrieval, a missing
//! instruction section degrades to the unabridged instruction set, and an
//! expired session is transparently recreated. These types exist so the
//! degraded paths can be logged and tested, not so a turn can abort.

use thiserror::Error;

/// The top-level error type for all FrontDesk operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Retrieval errors ---
    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    // --- Session errors ---
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    // --- Prompt assembly errors ---
    #[error("Prompt error: {0}")]
    Prompt(#[from] PromptError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures of the vector-search backend. The retriever maps every one of
/// these to an empty hit list before merging.
#[derive(Debug, Clone, Error)]
pub enum RetrievalError {
    #[error("Vector backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Vector search timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    #[error("Vector backend returned an invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// The context for this session id is absent (expired or never created).
    /// The store recovers by creating a fresh context.
    #[error("Session not found: {0}")]
    NotFound(String),
}

#[derive(Debug, Clone, Error)]
pub enum PromptError {
    /// An instruction section referenced by the optimizer is missing from
    /// the instruction set (content drift). Recovered by returning the
    /// complete, unmodified instruction set.
    #[error("Instruction section missing: {0}")]
    MissingSection(String),

    #[error("Instruction set has no base section")]
    MissingBase,
}
