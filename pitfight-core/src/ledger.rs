//! Wager ledger.
//!
//! Owned by the fight engine task so that placement and settlement
//! share one timeline with fight transitions; no wager can be placed
//! concurrently with the settlement that would orphan it.
//!
//! Money safety: the stake is withdrawn before the wager is recorded,
//! and a failed record is compensated with a deposit of the same
//! amount. Settlement flips each wager to a terminal status exactly
//! once; wagers drained from the active set are never revisited.

use crate::config::BettingConfig;
use crate::economy::Economy;
use crate::entities::{Fight, FightStatus, Wager, WagerStatus};
use crate::events::{NoticeKind, Outbound, OutboundSender, Recipient};
use crate::store::{Store, StoreError};
use std::collections::HashMap;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

/// Why a wager could not be placed.
#[derive(Debug, Error)]
pub enum WagerError {
    #[error("bet must be between {min} and {max}")]
    InvalidAmount { min: i64, max: i64 },

    #[error("side must be 0 or 1")]
    InvalidSide,

    #[error("you already have a bet on this fight")]
    DuplicateWager,

    /// The fight is missing, already under way, or over.
    #[error("this fight is not taking bets")]
    NotBettable,

    #[error("fighters cannot bet on their own fight")]
    ParticipantBet,

    #[error("unknown bettor")]
    UnknownBettor,

    #[error("insufficient funds")]
    InsufficientFunds,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Payout for a winning stake at the configured multiplier.
pub fn payout_for(amount: i64, multiplier: f64) -> i64 {
    (amount as f64 * multiplier).round() as i64
}

/// Active wagers, keyed by wager id.
#[derive(Default)]
pub struct Ledger {
    active: HashMap<Uuid, Wager>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-admit a wager loaded from the store at startup.
    pub fn restore(&mut self, wager: Wager) {
        if wager.status == WagerStatus::Active {
            self.active.insert(wager.id, wager);
        }
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Active wagers riding on one fight.
    pub fn wagers_on(&self, fight_id: Uuid) -> Vec<&Wager> {
        self.active
            .values()
            .filter(|wager| wager.fight_id == fight_id)
            .collect()
    }

    /// Validate, charge and record a new wager.
    ///
    /// The stake is withdrawn before the store write; if the write
    /// fails the stake is deposited back and the error is returned.
    pub async fn place(
        &mut self,
        fight: &Fight,
        bettor_id: &str,
        amount: i64,
        side: usize,
        betting: &BettingConfig,
        economy: &dyn Economy,
        store: &dyn Store,
    ) -> Result<Wager, WagerError> {
        if side > 1 {
            return Err(WagerError::InvalidSide);
        }
        if fight.status != FightStatus::Pending {
            return Err(WagerError::NotBettable);
        }
        if fight.side_of(bettor_id).is_some() {
            return Err(WagerError::ParticipantBet);
        }
        if amount < betting.min_bet || amount > betting.max_bet {
            return Err(WagerError::InvalidAmount {
                min: betting.min_bet,
                max: betting.max_bet,
            });
        }
        if self
            .active
            .values()
            .any(|wager| wager.fight_id == fight.id && wager.bettor_id == bettor_id)
        {
            return Err(WagerError::DuplicateWager);
        }

        let profile = store
            .load_fighter(bettor_id)
            .await?
            .ok_or(WagerError::UnknownBettor)?;

        if !economy.withdraw(bettor_id, amount).await {
            return Err(WagerError::InsufficientFunds);
        }

        let wager = Wager::new(fight.id, bettor_id, profile.name, amount, side);
        if let Err(err) = store.save_wager(&wager).await {
            // Give the stake back; the wager never existed.
            if !economy.deposit(bettor_id, amount).await {
                warn!(
                    bettor_id,
                    amount, "compensating refund failed, stake owed to bettor"
                );
            }
            return Err(err.into());
        }

        self.active.insert(wager.id, wager.clone());
        Ok(wager)
    }

    /// Settle every active wager on a decided fight.
    ///
    /// `winner_side` of `None` means a draw: all stakes come back.
    /// Winning stakes pay `round(stake * multiplier)`.
    pub async fn settle(
        &mut self,
        fight_id: Uuid,
        winner_side: Option<usize>,
        multiplier: f64,
        economy: &dyn Economy,
        store: &dyn Store,
        outbound: &OutboundSender,
    ) {
        let Some(winner_side) = winner_side else {
            self.refund_all(fight_id, "The fight ended in a draw", economy, store, outbound)
                .await;
            return;
        };

        for mut wager in self.drain_fight(fight_id) {
            if wager.side == winner_side {
                let payout = payout_for(wager.amount, multiplier);
                wager.status = WagerStatus::Won;
                wager.payout = Some(payout);
                if !economy.deposit(&wager.bettor_id, payout).await {
                    warn!(
                        bettor_id = %wager.bettor_id,
                        payout, "payout deposit failed, amount owed to bettor"
                    );
                }
                self.notify(
                    outbound,
                    &wager.bettor_id,
                    NoticeKind::Success,
                    format!("Your bet won! Payout: ${payout}"),
                )
                .await;
            } else {
                wager.status = WagerStatus::Lost;
                self.notify(
                    outbound,
                    &wager.bettor_id,
                    NoticeKind::Info,
                    format!("Your bet of ${} lost", wager.amount),
                )
                .await;
            }
            self.record_settled(&wager, store).await;
        }
    }

    /// Return every active stake on a fight, used for draws and
    /// cancellations.
    pub async fn refund_all(
        &mut self,
        fight_id: Uuid,
        reason: &str,
        economy: &dyn Economy,
        store: &dyn Store,
        outbound: &OutboundSender,
    ) {
        for mut wager in self.drain_fight(fight_id) {
            wager.status = WagerStatus::Refunded;
            if !economy.deposit(&wager.bettor_id, wager.amount).await {
                warn!(
                    bettor_id = %wager.bettor_id,
                    amount = wager.amount,
                    "refund deposit failed, amount owed to bettor"
                );
            }
            self.notify(
                outbound,
                &wager.bettor_id,
                NoticeKind::Warning,
                format!("{reason}. Your bet of ${} was refunded", wager.amount),
            )
            .await;
            if let Err(err) = store.save_wager(&wager).await {
                warn!(wager_id = %wager.id, error = %err, "failed to persist refunded wager");
            }
        }
    }

    fn drain_fight(&mut self, fight_id: Uuid) -> Vec<Wager> {
        let ids: Vec<Uuid> = self
            .active
            .values()
            .filter(|wager| wager.fight_id == fight_id)
            .map(|wager| wager.id)
            .collect();
        ids.into_iter()
            .filter_map(|id| self.active.remove(&id))
            .collect()
    }

    /// Persist a settled wager and fold the outcome into the bettor's
    /// profile stats.
    async fn record_settled(&self, wager: &Wager, store: &dyn Store) {
        if let Err(err) = store.save_wager(wager).await {
            warn!(wager_id = %wager.id, error = %err, "failed to persist settled wager");
        }
        match store.load_fighter(&wager.bettor_id).await {
            Ok(Some(mut profile)) => {
                match wager.status {
                    WagerStatus::Won => profile.bets_won += 1,
                    WagerStatus::Lost => profile.bets_lost += 1,
                    _ => return,
                }
                profile.bets_amount += wager.amount;
                if let Err(err) = store.save_fighter(&profile).await {
                    warn!(
                        bettor_id = %wager.bettor_id,
                        error = %err,
                        "failed to persist bettor stats"
                    );
                }
            }
            Ok(None) => {}
            Err(err) => {
                warn!(bettor_id = %wager.bettor_id, error = %err, "failed to load bettor profile");
            }
        }
    }

    async fn notify(
        &self,
        outbound: &OutboundSender,
        bettor_id: &str,
        kind: NoticeKind,
        text: String,
    ) {
        let event = Outbound::Notice {
            to: Recipient::Fighter(bettor_id.to_owned()),
            kind,
            text,
        };
        if outbound.send(event).await.is_err() {
            warn!("outbound channel closed, dropping wager notice");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::MemoryEconomy;
    use crate::entities::FighterProfile;
    use crate::events::outbound_channel;
    use crate::store::MemoryStore;
    use async_trait::async_trait;

    /// Store double whose wager writes always fail.
    struct FailingStore {
        inner: MemoryStore,
    }

    #[async_trait]
    impl Store for FailingStore {
        async fn load_open_fights(&self) -> Result<Vec<Fight>, StoreError> {
            self.inner.load_open_fights().await
        }
        async fn save_fight(&self, fight: &Fight) -> Result<(), StoreError> {
            self.inner.save_fight(fight).await
        }
        async fn load_active_wagers(&self) -> Result<Vec<Wager>, StoreError> {
            self.inner.load_active_wagers().await
        }
        async fn save_wager(&self, _wager: &Wager) -> Result<(), StoreError> {
            Err(StoreError::Backend("write refused".into()))
        }
        async fn load_fighter(&self, id: &str) -> Result<Option<FighterProfile>, StoreError> {
            self.inner.load_fighter(id).await
        }
        async fn save_fighter(&self, profile: &FighterProfile) -> Result<(), StoreError> {
            self.inner.save_fighter(profile).await
        }
        async fn top_fighters(&self, limit: usize) -> Result<Vec<FighterProfile>, StoreError> {
            self.inner.top_fighters(limit).await
        }
    }

    async fn store_with_bettor(id: &str) -> MemoryStore {
        let store = MemoryStore::new();
        let profile = FighterProfile::new(id, id, 1000);
        store.save_fighter(&profile).await.unwrap();
        store
    }

    fn betting() -> BettingConfig {
        BettingConfig::default()
    }

    #[tokio::test]
    async fn place_rejects_out_of_range_amounts() {
        let mut ledger = Ledger::new();
        let fight = Fight::sample();
        let economy = MemoryEconomy::new(100_000);
        let store = store_with_bettor("gambler").await;

        for amount in [99, 10_001] {
            let err = ledger
                .place(&fight, "gambler", amount, 0, &betting(), &economy, &store)
                .await
                .unwrap_err();
            assert!(matches!(err, WagerError::InvalidAmount { min: 100, max: 10_000 }));
        }
    }

    #[tokio::test]
    async fn place_rejects_participants_and_bad_sides() {
        let mut ledger = Ledger::new();
        let fight = Fight::sample();
        let economy = MemoryEconomy::new(100_000);
        let store = store_with_bettor("a").await;

        let err = ledger
            .place(&fight, "a", 500, 0, &betting(), &economy, &store)
            .await
            .unwrap_err();
        assert!(matches!(err, WagerError::ParticipantBet));

        let store = store_with_bettor("gambler").await;
        let err = ledger
            .place(&fight, "gambler", 500, 2, &betting(), &economy, &store)
            .await
            .unwrap_err();
        assert!(matches!(err, WagerError::InvalidSide));
    }

    #[tokio::test]
    async fn place_rejects_second_wager_on_same_fight() {
        let mut ledger = Ledger::new();
        let fight = Fight::sample();
        let economy = MemoryEconomy::new(100_000);
        let store = store_with_bettor("gambler").await;

        ledger
            .place(&fight, "gambler", 500, 0, &betting(), &economy, &store)
            .await
            .unwrap();
        let err = ledger
            .place(&fight, "gambler", 500, 1, &betting(), &economy, &store)
            .await
            .unwrap_err();
        assert!(matches!(err, WagerError::DuplicateWager));
        assert_eq!(ledger.active_count(), 1);
    }

    #[tokio::test]
    async fn place_withdraws_the_stake() {
        let mut ledger = Ledger::new();
        let fight = Fight::sample();
        let economy = MemoryEconomy::new(1_000);
        let store = store_with_bettor("gambler").await;

        ledger
            .place(&fight, "gambler", 600, 0, &betting(), &economy, &store)
            .await
            .unwrap();
        assert_eq!(economy.balance("gambler").await, 400);

        let err = ledger
            .place(&fight, "other", 600, 0, &betting(), &economy, &store)
            .await
            .unwrap_err();
        assert!(matches!(err, WagerError::UnknownBettor));
    }

    #[tokio::test]
    async fn failed_record_compensates_the_stake() {
        let mut ledger = Ledger::new();
        let fight = Fight::sample();
        let economy = MemoryEconomy::new(1_000);
        let inner = store_with_bettor("gambler").await;
        let store = FailingStore { inner };

        let err = ledger
            .place(&fight, "gambler", 500, 0, &betting(), &economy, &store)
            .await
            .unwrap_err();
        assert!(matches!(err, WagerError::Store(_)));
        assert_eq!(economy.balance("gambler").await, 1_000);
        assert_eq!(ledger.active_count(), 0);
    }

    #[tokio::test]
    async fn winning_stake_pays_at_the_multiplier() {
        let mut ledger = Ledger::new();
        let fight = Fight::sample();
        let economy = MemoryEconomy::new(1_000);
        let store = store_with_bettor("gambler").await;
        let (outbound, mut events) = outbound_channel();

        ledger
            .place(&fight, "gambler", 200, 0, &betting(), &economy, &store)
            .await
            .unwrap();
        ledger
            .settle(fight.id, Some(0), 1.9, &economy, &store, &outbound)
            .await;

        // 1000 - 200 stake + round(200 * 1.9) payout.
        assert_eq!(economy.balance("gambler").await, 1_180);
        assert_eq!(ledger.active_count(), 0);

        let profile = store.load_fighter("gambler").await.unwrap().unwrap();
        assert_eq!(profile.bets_won, 1);
        assert_eq!(profile.bets_amount, 200);

        let event = events.recv().await.unwrap();
        assert!(matches!(
            event,
            Outbound::Notice {
                kind: NoticeKind::Success,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn losing_stake_stays_withdrawn() {
        let mut ledger = Ledger::new();
        let fight = Fight::sample();
        let economy = MemoryEconomy::new(1_000);
        let store = store_with_bettor("gambler").await;
        let (outbound, _events) = outbound_channel();

        ledger
            .place(&fight, "gambler", 200, 1, &betting(), &economy, &store)
            .await
            .unwrap();
        ledger
            .settle(fight.id, Some(0), 1.9, &economy, &store, &outbound)
            .await;

        assert_eq!(economy.balance("gambler").await, 800);
        let profile = store.load_fighter("gambler").await.unwrap().unwrap();
        assert_eq!(profile.bets_lost, 1);
    }

    #[tokio::test]
    async fn draw_refunds_every_stake() {
        let mut ledger = Ledger::new();
        let fight = Fight::sample();
        let economy = MemoryEconomy::new(1_000);
        let store = store_with_bettor("g1").await;
        store
            .save_fighter(&FighterProfile::new("g2", "g2", 1000))
            .await
            .unwrap();
        let (outbound, _events) = outbound_channel();

        ledger
            .place(&fight, "g1", 300, 0, &betting(), &economy, &store)
            .await
            .unwrap();
        ledger
            .place(&fight, "g2", 400, 1, &betting(), &economy, &store)
            .await
            .unwrap();
        ledger
            .settle(fight.id, None, 1.9, &economy, &store, &outbound)
            .await;

        assert_eq!(economy.balance("g1").await, 1_000);
        assert_eq!(economy.balance("g2").await, 1_000);
        assert_eq!(ledger.active_count(), 0);
    }

    #[tokio::test]
    async fn settlement_leaves_other_fights_alone() {
        let mut ledger = Ledger::new();
        let fight = Fight::sample();
        let other = Fight::sample();
        let economy = MemoryEconomy::new(10_000);
        let store = store_with_bettor("gambler").await;
        let (outbound, _events) = outbound_channel();

        ledger
            .place(&fight, "gambler", 200, 0, &betting(), &economy, &store)
            .await
            .unwrap();
        ledger
            .place(&other, "gambler", 300, 0, &betting(), &economy, &store)
            .await
            .unwrap();
        ledger
            .settle(fight.id, Some(1), 1.9, &economy, &store, &outbound)
            .await;

        assert_eq!(ledger.active_count(), 1);
        assert_eq!(ledger.wagers_on(other.id).len(), 1);
    }
}
