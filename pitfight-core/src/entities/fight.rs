use super::fighter::FighterProfile;
use crate::config::MatchKind;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Lifecycle state of a fight. Transitions are monotonic: `Completed`
/// and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FightStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl FightStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, FightStatus::Completed | FightStatus::Cancelled)
    }
}

/// Per-fighter state within a fight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FighterState {
    Ready,
    Active,
    Down,
}

/// Why a fight completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    Knockout,
    Decision,
    Forfeit,
    Draw,
}

/// Why a fight was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    /// Not both sides signalled readiness within the accept window.
    AcceptTimeout,
    /// Swept as stale after sitting pending or in progress too long.
    Abandoned,
}

/// One side of a fight: the fighter's profile snapshot plus live state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FighterSlot {
    pub profile: FighterProfile,
    pub health: i32,
    pub ready: bool,
    pub state: FighterState,
}

impl FighterSlot {
    pub fn new(profile: FighterProfile, max_health: i32) -> Self {
        Self {
            profile,
            health: max_health,
            ready: false,
            state: FighterState::Ready,
        }
    }
}

/// Damage dealt by each side over one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    /// Indexed by side: `damage[0]` is what side 0 dealt to side 1.
    pub damage: [u32; 2],
}

/// A two-fighter contest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fight {
    pub id: Uuid,
    pub arena_index: usize,
    pub arena_name: String,
    pub slots: [FighterSlot; 2],
    /// Index into the configured match kinds, plus a snapshot of the
    /// rules at creation time.
    pub kind_index: usize,
    pub kind: MatchKind,
    pub status: FightStatus,
    /// Current round, 1-based once the fight starts. Never exceeds
    /// `total_rounds` while in progress.
    pub round: u32,
    pub total_rounds: u32,
    pub rounds: Vec<RoundResult>,
    pub winner: Option<String>,
    /// Set exactly once, when the fight reaches `Completed`.
    pub end_reason: Option<EndReason>,
    pub created_at: OffsetDateTime,
    pub started_at: Option<OffsetDateTime>,
    pub ended_at: Option<OffsetDateTime>,
    /// Pre-fight odds per side, derived from ratings at creation.
    pub odds: [f64; 2],
}

impl Fight {
    /// Which side a fighter id occupies, if any.
    pub fn side_of(&self, fighter_id: &str) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.profile.id == fighter_id)
    }

    /// Total damage dealt by one side across all recorded rounds.
    pub fn damage_dealt(&self, side: usize) -> u64 {
        self.rounds
            .iter()
            .map(|round| u64::from(round.damage[side]))
            .sum()
    }

    /// Winner of a full-length fight by cumulative damage, or `None`
    /// for an even draw. Knockouts are decided elsewhere.
    pub fn decision_winner(&self) -> Option<usize> {
        let dealt0 = self.damage_dealt(0);
        let dealt1 = self.damage_dealt(1);
        match dealt0.cmp(&dealt1) {
            std::cmp::Ordering::Greater => Some(0),
            std::cmp::Ordering::Less => Some(1),
            std::cmp::Ordering::Equal => None,
        }
    }
}

#[cfg(test)]
impl Fight {
    /// Pending fistfight between "a" and "b" at equal ratings, for
    /// tests across the crate.
    pub(crate) fn sample() -> Fight {
        let config = crate::config::GameConfig::default();
        let kind = config.match_kinds[0].clone();
        let a = FighterProfile::new("a", "Alice", 1000);
        let b = FighterProfile::new("b", "Bob", 1000);
        Fight {
            id: Uuid::new_v4(),
            arena_index: 0,
            arena_name: config.arenas[0].name.clone(),
            slots: [
                FighterSlot::new(a, config.rules.max_health),
                FighterSlot::new(b, config.rules.max_health),
            ],
            kind_index: 0,
            kind,
            status: FightStatus::Pending,
            round: 0,
            total_rounds: config.rules.total_rounds,
            rounds: Vec::new(),
            winner: None,
            end_reason: None,
            created_at: OffsetDateTime::now_utc(),
            started_at: None,
            ended_at: None,
            odds: [2.0, 2.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_fight() -> Fight {
        Fight::sample()
    }

    #[test]
    fn fights_compare_by_value() {
        let fight = sample_fight();
        let mut other = fight.clone();
        assert_eq!(fight, other);

        other.kind.entry_fee += 1;
        assert_ne!(fight, other);
    }

    #[test]
    fn side_lookup() {
        let fight = sample_fight();
        assert_eq!(fight.side_of("a"), Some(0));
        assert_eq!(fight.side_of("b"), Some(1));
        assert_eq!(fight.side_of("nobody"), None);
    }

    #[test]
    fn decision_goes_to_higher_cumulative_damage() {
        let mut fight = sample_fight();
        fight.rounds.push(RoundResult { damage: [40, 30] });
        fight.rounds.push(RoundResult { damage: [40, 30] });
        assert_eq!(fight.decision_winner(), Some(0));

        fight.rounds.clear();
        fight.rounds.push(RoundResult { damage: [25, 25] });
        assert_eq!(fight.decision_winner(), None);
    }
}
