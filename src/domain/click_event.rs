//! Click event model for asynchronous click accounting.

use chrono::{DateTime, Utc};

/// A request to count one followed redirect.
///
/// Carries only the slug: visitors are not identified, so repeated follows
/// of the same slug are counted every time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub slug: String,
    pub queued_at: DateTime<Utc>,
}

impl ClickEvent {
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            queued_at: Utc::now(),
        }
    }

    /// Time spent in the queue as of `now`; zero if the clock went backwards.
    pub fn queue_latency(&self, now: DateTime<Utc>) -> std::time::Duration {
        (now - self.queued_at).to_std().unwrap_or_default()
    }
}
