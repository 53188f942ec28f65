use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A fighter's standing request to be matched.
///
/// Owned exclusively by the matchmaking queue; at most one ticket
/// exists per fighter id at any time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueTicket {
    pub fighter_id: String,
    pub name: String,
    /// Rating snapshot taken at enqueue time.
    pub rating: i32,
    pub kind_index: usize,
    pub queued_at: OffsetDateTime,
    /// Current rating-range relaxation, refreshed each pairing cycle.
    pub relaxation: i32,
    /// How many "still searching" notices have been sent.
    pub notices: u32,
}

impl QueueTicket {
    pub fn new(
        fighter_id: impl Into<String>,
        name: impl Into<String>,
        rating: i32,
        kind_index: usize,
    ) -> Self {
        Self {
            fighter_id: fighter_id.into(),
            name: name.into(),
            rating,
            kind_index,
            queued_at: OffsetDateTime::now_utc(),
            relaxation: 0,
            notices: 0,
        }
    }

    /// Seconds spent waiting in the queue as of `now`.
    pub fn wait_secs(&self, now: OffsetDateTime) -> i64 {
        (now - self.queued_at).whole_seconds().max(0)
    }
}
