use serde::{Deserialize, Serialize};

/// A fighter's persistent record.
///
/// Owned by the persistence collaborator; the core works on snapshots
/// scoped to a fight or a queue ticket. Fighter ids are opaque strings
/// issued by the host platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FighterProfile {
    pub id: String,
    pub name: String,
    pub rating: i32,
    pub wins: u32,
    pub losses: u32,
    pub knockouts: u32,
    pub earnings: i64,
    pub bets_won: u32,
    pub bets_lost: u32,
    pub bets_amount: i64,
}

impl FighterProfile {
    /// A fresh profile at the base rating.
    pub fn new(id: impl Into<String>, name: impl Into<String>, base_rating: i32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rating: base_rating,
            wins: 0,
            losses: 0,
            knockouts: 0,
            earnings: 0,
            bets_won: 0,
            bets_lost: 0,
            bets_amount: 0,
        }
    }
}

/// One row of the rating leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub id: String,
    pub name: String,
    pub rating: i32,
    pub wins: u32,
    pub losses: u32,
    pub knockouts: u32,
    pub earnings: i64,
}

impl From<&FighterProfile> for LeaderboardEntry {
    fn from(profile: &FighterProfile) -> Self {
        Self {
            id: profile.id.clone(),
            name: profile.name.clone(),
            rating: profile.rating,
            wins: profile.wins,
            losses: profile.losses,
            knockouts: profile.knockouts,
            earnings: profile.earnings,
        }
    }
}
