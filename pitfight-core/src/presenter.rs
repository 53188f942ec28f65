//! Presentation collaborator.
//!
//! Delivery is best effort: a presenter may drop traffic on the floor
//! and the core never waits on it for correctness.

use crate::events::{FightEventKind, Outbound, Recipient};
use async_trait::async_trait;
use tracing::info;

/// Sink for player-facing notices and fight updates.
#[async_trait]
pub trait Presenter: Send + Sync {
    async fn deliver(&self, event: &Outbound);
}

/// Presenter that renders everything to the log. Used when no host
/// presentation layer is attached.
pub struct TracingPresenter;

#[async_trait]
impl Presenter for TracingPresenter {
    async fn deliver(&self, event: &Outbound) {
        match event {
            Outbound::Notice { to, kind, text } => match to {
                Recipient::Fighter(id) => {
                    info!(fighter = %id, kind = ?kind, "{text}");
                }
                Recipient::Broadcast => {
                    info!(kind = ?kind, "[broadcast] {text}");
                }
            },
            Outbound::FightUpdate { fight, event } => {
                let detail = match event {
                    FightEventKind::OpponentReady { fighter_id } => {
                        format!("opponent ready: {fighter_id}")
                    }
                    other => format!("{other:?}"),
                };
                info!(
                    fight_id = %fight.id,
                    status = ?fight.status,
                    round = fight.round,
                    "fight update: {detail}"
                );
            }
            Outbound::LeaderboardUpdate { entries } => {
                info!(entries = entries.len(), "leaderboard refreshed");
            }
        }
    }
}
