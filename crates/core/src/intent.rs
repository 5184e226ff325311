//! Booking-intent detector trait — the seam to the external classifier.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::session::SessionContext;

/// Result of the external booking-change classifier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BookingIntentSignal {
    /// Explicit positive: the user wants the change-booking form.
    pub should_show_form: bool,
    /// Classifier confidence in [0, 1].
    pub confidence: f32,
    /// Whether a human agent is currently available.
    pub is_within_agent_hours: bool,
}

/// The external booking-intent classifier.
///
/// Returns `None` when classification fails; the tracker then preserves the
/// prior intent state rather than flapping on a missing signal.
#[async_trait]
pub trait BookingIntentDetector: Send + Sync {
    async fn detect(&self, message: &str, ctx: &SessionContext) -> Option<BookingIntentSignal>;
}
