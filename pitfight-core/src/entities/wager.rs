use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Terminal outcome of a wager. A wager is mutated exactly once, at
/// settlement, and never again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WagerStatus {
    Active,
    Won,
    Lost,
    Refunded,
}

/// A stake placed by a third party on a fight's outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wager {
    pub id: Uuid,
    pub fight_id: Uuid,
    pub bettor_id: String,
    pub bettor_name: String,
    pub amount: i64,
    /// Which fighter slot the stake backs: 0 or 1.
    pub side: usize,
    pub placed_at: OffsetDateTime,
    pub status: WagerStatus,
    pub payout: Option<i64>,
}

impl Wager {
    pub fn new(
        fight_id: Uuid,
        bettor_id: impl Into<String>,
        bettor_name: impl Into<String>,
        amount: i64,
        side: usize,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            fight_id,
            bettor_id: bettor_id.into(),
            bettor_name: bettor_name.into(),
            amount,
            side,
            placed_at: OffsetDateTime::now_utc(),
            status: WagerStatus::Active,
            payout: None,
        }
    }
}
