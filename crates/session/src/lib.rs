//! Session state management for the FrontDesk engine.
//!
//! One `SessionContext` per conversation, held in a TTL-bound in-process
//! store. The topic & intent tracker mutates the context each turn; the
//! date scanner captures bare date answers on short messages.

pub mod dates;
pub mod store;
pub mod topics;

pub use dates::DateScanner;
pub use store::{SessionDiagnostics, SessionStore};
pub use topics::{
    merge_booking_signal, should_show_booking_change, update_topics, TopicRule, TOPIC_RULES,
};
