//! Game configuration.
//!
//! Every section has serde defaults so that a config file only needs to
//! override what it cares about. The default values are the tuning the
//! game mode ships with.

use serde::{Deserialize, Serialize};

/// Root game configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default = "default_arenas")]
    pub arenas: Vec<Arena>,
    #[serde(default = "default_match_kinds")]
    pub match_kinds: Vec<MatchKind>,
    #[serde(default)]
    pub rules: FightRules,
    #[serde(default)]
    pub betting: BettingConfig,
    #[serde(default)]
    pub skill: SkillRatingConfig,
    #[serde(default)]
    pub rewards: ItemRewards,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            arenas: default_arenas(),
            match_kinds: default_match_kinds(),
            rules: FightRules::default(),
            betting: BettingConfig::default(),
            skill: SkillRatingConfig::default(),
            rewards: ItemRewards::default(),
        }
    }
}

impl GameConfig {
    /// Look up a match kind by its index.
    pub fn match_kind(&self, index: usize) -> Option<&MatchKind> {
        self.match_kinds.get(index)
    }
}

/// An arena a fight can be held in.
///
/// World coordinates, spawn points and ambience belong to the host
/// platform; the core only needs a stable reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arena {
    pub name: String,
}

/// Rules and rewards for one match kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchKind {
    pub name: String,
    pub description: String,
    pub melee_only: bool,
    pub allowed_weapons: Vec<String>,
    /// Entry fee charged when joining the queue, refunded on withdrawal
    /// or matchmaking timeout.
    pub entry_fee: i64,
    pub winner_reward: i64,
    pub loser_reward: i64,
}

/// Fight pacing and matchmaking timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FightRules {
    /// Starting health for both sides.
    pub max_health: i32,
    /// Number of rounds before a fight goes to decision.
    pub total_rounds: u32,
    pub round_duration_secs: u64,
    /// How long both sides have to signal readiness before the fight
    /// is cancelled.
    pub accept_timeout_secs: u64,
    /// How long a fighter waits in the queue before being evicted.
    pub matchmaking_timeout_secs: u64,
    /// Fights still pending or in progress past this age are swept as
    /// abandoned.
    pub stale_fight_secs: u64,
    pub queue_tick_secs: u64,
    /// Base damage dealt per round before the rating ratio and random
    /// factor are applied.
    pub base_round_damage: f64,
    /// Per-round damage cap for a single side.
    pub round_damage_cap: u32,
}

impl Default for FightRules {
    fn default() -> Self {
        Self {
            max_health: 100,
            total_rounds: 3,
            round_duration_secs: 60,
            accept_timeout_secs: 60,
            matchmaking_timeout_secs: 60,
            stale_fight_secs: 30 * 60,
            queue_tick_secs: 5,
            base_round_damage: 20.0,
            round_damage_cap: 50,
        }
    }
}

/// Wagering limits and payout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BettingConfig {
    pub min_bet: i64,
    pub max_bet: i64,
    pub payout_multiplier: f64,
}

impl Default for BettingConfig {
    fn default() -> Self {
        Self {
            min_bet: 100,
            max_bet: 10_000,
            payout_multiplier: 1.9,
        }
    }
}

/// Elo rating parameters and queue relaxation tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillRatingConfig {
    pub base_rating: i32,
    pub k_factor: f64,
    /// Rating-range growth per 10 seconds of queue wait.
    pub min_relaxation_step: i32,
    /// Upper bound on the relaxed rating range.
    pub max_relaxation: i32,
}

impl Default for SkillRatingConfig {
    fn default() -> Self {
        Self {
            base_rating: 1000,
            k_factor: 32.0,
            min_relaxation_step: 50,
            max_relaxation: 500,
        }
    }
}

/// A chance-based item drop granted after a fight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemReward {
    pub name: String,
    pub count: u32,
    /// Drop probability in [0, 1].
    pub chance: f64,
}

/// Item drop tables for winners and losers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemRewards {
    pub winner: Vec<ItemReward>,
    pub loser: Vec<ItemReward>,
}

impl Default for ItemRewards {
    fn default() -> Self {
        Self {
            winner: vec![
                ItemReward {
                    name: "bandage".into(),
                    count: 3,
                    chance: 0.8,
                },
                ItemReward {
                    name: "medkit".into(),
                    count: 1,
                    chance: 0.3,
                },
                ItemReward {
                    name: "water_bottle".into(),
                    count: 1,
                    chance: 0.5,
                },
            ],
            loser: vec![ItemReward {
                name: "bandage".into(),
                count: 1,
                chance: 0.5,
            }],
        }
    }
}

fn default_arenas() -> Vec<Arena> {
    ["Warehouse", "Underground Garage", "Beach Club"]
        .into_iter()
        .map(|name| Arena { name: name.into() })
        .collect()
}

fn default_match_kinds() -> Vec<MatchKind> {
    vec![
        MatchKind {
            name: "Standard Fistfight".into(),
            description: "No weapons, just fists and feet.".into(),
            melee_only: true,
            allowed_weapons: Vec::new(),
            entry_fee: 500,
            winner_reward: 1000,
            loser_reward: 0,
        },
        MatchKind {
            name: "Melee Weapons".into(),
            description: "Any melee weapon is allowed.".into(),
            melee_only: true,
            allowed_weapons: vec![
                "WEAPON_KNIFE".into(),
                "WEAPON_BAT".into(),
                "WEAPON_CROWBAR".into(),
                "WEAPON_GOLFCLUB".into(),
            ],
            entry_fee: 1500,
            winner_reward: 3000,
            loser_reward: 0,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_consistent() {
        let config = GameConfig::default();
        assert_eq!(config.arenas.len(), 3);
        assert_eq!(config.match_kinds.len(), 2);
        assert!(config.match_kind(0).is_some());
        assert!(config.match_kind(2).is_none());
        assert!(config.betting.min_bet <= config.betting.max_bet);
    }

    #[test]
    fn empty_document_deserializes_to_defaults() {
        let config: GameConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.rules.total_rounds, 3);
        assert_eq!(config.skill.base_rating, 1000);
        assert_eq!(config.match_kinds[0].entry_fee, 500);
    }
}
