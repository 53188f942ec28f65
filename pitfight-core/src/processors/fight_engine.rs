//! FightEngine processor.
//!
//! The FightEngine is responsible for:
//! - Receiving `FightCommand`s, including its own timer callbacks
//! - Creating fights from matchmaker pairings
//! - Driving the accept handshake, rounds and endings
//! - Paying rewards, updating ratings and settling wagers
//! - Sweeping abandoned fights
//!
//! Timers are spawned tasks that sleep and send a command back into
//! the engine's own channel, so every mutation happens on this task.
//! Timer callbacks are at-least-once: handlers no-op when the fight is
//! gone, terminal, or no longer on the referenced round, which is also
//! how obsolete timers get cancelled.

use crate::config::{GameConfig, ItemReward};
use crate::economy::Economy;
use crate::entities::{
    CancelReason, EndReason, Fight, FightStatus, FighterProfile, FighterSlot, FighterState,
    QueueTicket, RoundResult,
};
use crate::events::{
    FightCommand, FightCommandReceiver, FightCommandSender, FightEventKind, NoticeKind, Outbound,
    OutboundSender, Recipient,
};
use crate::leaderboard::Leaderboard;
use crate::ledger::{Ledger, WagerError};
use crate::rating::{fight_odds, update_ratings};
use crate::store::Store;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// How often the engine checks for abandoned fights.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Damage one side lands in a simulated round: the base damage scaled
/// by the rating ratio and a random factor in [0.8, 1.2], capped.
fn simulated_round_damage(own_rating: i32, opponent_rating: i32, base: f64, cap: u32) -> u32 {
    let ratio = f64::from(own_rating.max(1)) / f64::from(opponent_rating.max(1));
    let factor = rand::rng().random_range(0.8..=1.2);
    let raw = (base * ratio * factor).round();
    (raw.max(0.0) as u32).min(cap)
}

/// FightEngine owns the live fight set and the wager ledger.
pub struct FightEngine {
    config: Arc<GameConfig>,
    fights: HashMap<Uuid, Fight>,
    ledger: Ledger,
    leaderboard: Arc<Leaderboard>,
    economy: Arc<dyn Economy>,
    store: Arc<dyn Store>,
    command_rx: FightCommandReceiver,
    /// Clone handed to timer tasks so callbacks re-enter this loop.
    command_tx: FightCommandSender,
    outbound: OutboundSender,
    shutdown_rx: watch::Receiver<bool>,
}

impl FightEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Arc<GameConfig>,
        economy: Arc<dyn Economy>,
        store: Arc<dyn Store>,
        leaderboard: Arc<Leaderboard>,
        command_rx: FightCommandReceiver,
        command_tx: FightCommandSender,
        outbound: OutboundSender,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            config,
            fights: HashMap::new(),
            ledger: Ledger::new(),
            leaderboard,
            economy,
            store,
            command_rx,
            command_tx,
            outbound,
            shutdown_rx,
        }
    }

    /// Run the FightEngine.
    pub async fn run(mut self) {
        info!("FightEngine started");
        self.rehydrate().await;

        let mut sweep = tokio::time::interval(SWEEP_INTERVAL);
        sweep.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown_rx.changed() => {
                    if *self.shutdown_rx.borrow() {
                        info!("FightEngine received shutdown signal");
                        break;
                    }
                }

                Some(command) = self.command_rx.recv() => {
                    self.handle_command(command).await;
                }

                _ = sweep.tick() => {
                    self.sweep_stale(OffsetDateTime::now_utc()).await;
                }

                else => {
                    info!("fight command channel closed");
                    break;
                }
            }
        }

        info!("FightEngine shutdown complete");
    }

    /// Reload open fights and active wagers from the store and re-arm
    /// the timers that died with the previous process.
    async fn rehydrate(&mut self) {
        match self.store.load_open_fights().await {
            Ok(fights) => {
                let count = fights.len();
                for fight in fights {
                    match fight.status {
                        FightStatus::Pending => {
                            self.schedule(
                                Duration::from_secs(self.config.rules.accept_timeout_secs),
                                FightCommand::AcceptTimeout { fight_id: fight.id },
                            );
                        }
                        FightStatus::InProgress => {
                            self.schedule(
                                Duration::from_secs(self.config.rules.round_duration_secs),
                                FightCommand::RoundElapsed {
                                    fight_id: fight.id,
                                    round: fight.round,
                                },
                            );
                        }
                        _ => continue,
                    }
                    self.fights.insert(fight.id, fight);
                }
                if count > 0 {
                    info!(count, "rehydrated open fights");
                }
            }
            Err(err) => error!(error = %err, "failed to load open fights"),
        }

        match self.store.load_active_wagers().await {
            Ok(wagers) => {
                for wager in wagers {
                    self.ledger.restore(wager);
                }
                if self.ledger.active_count() > 0 {
                    info!(count = self.ledger.active_count(), "rehydrated active wagers");
                }
            }
            Err(err) => error!(error = %err, "failed to load active wagers"),
        }
    }

    async fn handle_command(&mut self, command: FightCommand) {
        match command {
            FightCommand::Create { first, second } => {
                self.handle_create(first, second).await;
            }
            FightCommand::Accept {
                fight_id,
                fighter_id,
                reply,
            } => {
                let accepted = self.handle_accept(fight_id, &fighter_id).await;
                let _ = reply.send(accepted);
            }
            FightCommand::Damage {
                fight_id,
                attacker_id,
                amount,
                reply,
            } => {
                let applied = self.handle_damage(fight_id, &attacker_id, amount).await;
                let _ = reply.send(applied);
            }
            FightCommand::Forfeit {
                fight_id,
                fighter_id,
                reply,
            } => {
                let forfeited = self.handle_forfeit(fight_id, &fighter_id).await;
                let _ = reply.send(forfeited);
            }
            FightCommand::Cancel { fight_id, reason } => {
                self.cancel_fight(fight_id, reason).await;
            }
            FightCommand::PlaceWager {
                fight_id,
                bettor_id,
                amount,
                side,
                reply,
            } => {
                let result = self.handle_place_wager(fight_id, &bettor_id, amount, side).await;
                let _ = reply.send(result);
            }
            FightCommand::AcceptTimeout { fight_id } => {
                self.handle_accept_timeout(fight_id).await;
            }
            FightCommand::RoundElapsed { fight_id, round } => {
                self.handle_round_elapsed(fight_id, round).await;
            }
            FightCommand::List { reply } => {
                let _ = reply.send(self.fights.values().cloned().collect());
            }
        }
    }

    fn schedule(&self, delay: Duration, command: FightCommand) {
        let tx = self.command_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if tx.send(command).await.is_err() {
                debug!("engine channel closed, dropping timer callback");
            }
        });
    }

    /// Profile snapshot for a slot, falling back to the ticket's data
    /// when the store cannot produce one.
    async fn profile_for(&self, ticket: &QueueTicket) -> FighterProfile {
        match self.store.load_fighter(&ticket.fighter_id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                warn!(fighter_id = %ticket.fighter_id, "no stored profile for paired fighter");
                FighterProfile::new(&ticket.fighter_id, &ticket.name, ticket.rating)
            }
            Err(err) => {
                error!(fighter_id = %ticket.fighter_id, error = %err, "failed to load profile");
                FighterProfile::new(&ticket.fighter_id, &ticket.name, ticket.rating)
            }
        }
    }

    async fn handle_create(&mut self, first: QueueTicket, second: QueueTicket) {
        let Some(kind) = self.config.match_kind(first.kind_index).cloned() else {
            warn!(kind_index = first.kind_index, "pairing references unknown match kind");
            return;
        };

        let profile_a = self.profile_for(&first).await;
        let profile_b = self.profile_for(&second).await;
        let odds = fight_odds(profile_a.rating, profile_b.rating);

        let arena_index = if self.config.arenas.is_empty() {
            0
        } else {
            rand::rng().random_range(0..self.config.arenas.len())
        };
        let arena_name = self
            .config
            .arenas
            .get(arena_index)
            .map(|arena| arena.name.clone())
            .unwrap_or_else(|| "Arena".to_owned());

        let max_health = self.config.rules.max_health;
        let fight = Fight {
            id: Uuid::new_v4(),
            arena_index,
            arena_name,
            slots: [
                FighterSlot::new(profile_a, max_health),
                FighterSlot::new(profile_b, max_health),
            ],
            kind_index: first.kind_index,
            kind,
            status: FightStatus::Pending,
            round: 0,
            total_rounds: self.config.rules.total_rounds,
            rounds: Vec::new(),
            winner: None,
            end_reason: None,
            created_at: OffsetDateTime::now_utc(),
            started_at: None,
            ended_at: None,
            odds,
        };

        info!(
            fight_id = %fight.id,
            first = %fight.slots[0].profile.id,
            second = %fight.slots[1].profile.id,
            arena = %fight.arena_name,
            "fight created"
        );

        self.persist(&fight).await;
        self.schedule(
            Duration::from_secs(self.config.rules.accept_timeout_secs),
            FightCommand::AcceptTimeout { fight_id: fight.id },
        );

        let timeout = self.config.rules.accept_timeout_secs;
        for (side, slot) in fight.slots.iter().enumerate() {
            let opponent = &fight.slots[1 - side].profile.name;
            self.notify(
                Recipient::Fighter(slot.profile.id.clone()),
                NoticeKind::Success,
                format!(
                    "Match found! You fight {} at {}. Accept within {}s",
                    opponent, fight.arena_name, timeout
                ),
            )
            .await;
        }
        self.emit_update(&fight, FightEventKind::Created).await;
        self.fights.insert(fight.id, fight);
    }

    /// Mark a fighter ready; the fight starts when both sides are.
    async fn handle_accept(&mut self, fight_id: Uuid, fighter_id: &str) -> bool {
        let Some(fight) = self.fights.get_mut(&fight_id) else {
            return false;
        };
        if fight.status != FightStatus::Pending {
            return false;
        }
        let Some(side) = fight.side_of(fighter_id) else {
            return false;
        };
        if fight.slots[side].ready {
            return true;
        }
        fight.slots[side].ready = true;

        if fight.slots.iter().all(|slot| slot.ready) {
            self.start_fight(fight_id).await;
            return true;
        }

        let snapshot = fight.clone();
        self.persist(&snapshot).await;
        self.notify(
            Recipient::Fighter(snapshot.slots[1 - side].profile.id.clone()),
            NoticeKind::Info,
            format!("{} is ready", snapshot.slots[side].profile.name),
        )
        .await;
        self.emit_update(
            &snapshot,
            FightEventKind::OpponentReady {
                fighter_id: fighter_id.to_owned(),
            },
        )
        .await;
        true
    }

    async fn start_fight(&mut self, fight_id: Uuid) {
        let Some(fight) = self.fights.get_mut(&fight_id) else {
            return;
        };
        fight.status = FightStatus::InProgress;
        fight.started_at = Some(OffsetDateTime::now_utc());
        fight.round = 1;
        fight.rounds.push(RoundResult { damage: [0, 0] });
        for slot in &mut fight.slots {
            slot.state = FighterState::Active;
        }
        let snapshot = fight.clone();

        info!(fight_id = %snapshot.id, arena = %snapshot.arena_name, "fight started");
        self.persist(&snapshot).await;
        self.schedule(
            Duration::from_secs(self.config.rules.round_duration_secs),
            FightCommand::RoundElapsed { fight_id, round: 1 },
        );
        self.notify(
            Recipient::Broadcast,
            NoticeKind::Info,
            format!(
                "{} vs {} is underway at {}!",
                snapshot.slots[0].profile.name, snapshot.slots[1].profile.name, snapshot.arena_name
            ),
        )
        .await;
        self.emit_update(&snapshot, FightEventKind::Started).await;
    }

    /// Apply a telemetry damage report to the defender.
    async fn handle_damage(&mut self, fight_id: Uuid, attacker_id: &str, amount: u32) -> bool {
        let Some(fight) = self.fights.get_mut(&fight_id) else {
            return false;
        };
        if fight.status != FightStatus::InProgress {
            return false;
        }
        let Some(attacker) = fight.side_of(attacker_id) else {
            return false;
        };
        let defender = 1 - attacker;

        if let Some(current) = fight.rounds.last_mut() {
            current.damage[attacker] = current.damage[attacker].saturating_add(amount);
        }
        let health = &mut fight.slots[defender].health;
        *health = (*health - amount as i32).max(0);
        let knocked_out = *health == 0;
        let snapshot = fight.clone();

        self.emit_update(&snapshot, FightEventKind::HealthChanged).await;
        if knocked_out {
            self.end_fight(fight_id, Some(attacker), EndReason::Knockout)
                .await;
        }
        true
    }

    /// Close out the referenced round. Stale callbacks (fight gone,
    /// terminal, or a different round) are ignored.
    async fn handle_round_elapsed(&mut self, fight_id: Uuid, round: u32) {
        let Some(fight) = self.fights.get_mut(&fight_id) else {
            return;
        };
        if fight.status != FightStatus::InProgress || fight.round != round {
            return;
        }

        // Rounds without telemetry are simulated from the ratings.
        let untouched = fight
            .rounds
            .last()
            .is_some_and(|r| r.damage == [0, 0]);
        if untouched {
            let [rating_a, rating_b] = [0, 1].map(|side| fight.slots[side].profile.rating);
            let base = self.config.rules.base_round_damage;
            let cap = self.config.rules.round_damage_cap;
            let dealt = [
                simulated_round_damage(rating_a, rating_b, base, cap),
                simulated_round_damage(rating_b, rating_a, base, cap),
            ];
            if let Some(current) = fight.rounds.last_mut() {
                current.damage = dealt;
            }
            for side in 0..2 {
                let health = &mut fight.slots[side].health;
                *health = (*health - dealt[1 - side] as i32).max(0);
            }
        }

        let down = [fight.slots[0].health <= 0, fight.slots[1].health <= 0];
        match down {
            [true, true] => {
                // Double knockout: cumulative damage breaks the tie.
                let winner = fight.decision_winner();
                let reason = if winner.is_some() {
                    EndReason::Knockout
                } else {
                    EndReason::Draw
                };
                self.end_fight(fight_id, winner, reason).await;
            }
            [false, true] => self.end_fight(fight_id, Some(0), EndReason::Knockout).await,
            [true, false] => self.end_fight(fight_id, Some(1), EndReason::Knockout).await,
            [false, false] if round >= fight.total_rounds => {
                let winner = fight.decision_winner();
                let reason = if winner.is_some() {
                    EndReason::Decision
                } else {
                    EndReason::Draw
                };
                self.end_fight(fight_id, winner, reason).await;
            }
            _ => {
                fight.round += 1;
                fight.rounds.push(RoundResult { damage: [0, 0] });
                let next = fight.round;
                let snapshot = fight.clone();
                self.persist(&snapshot).await;
                self.schedule(
                    Duration::from_secs(self.config.rules.round_duration_secs),
                    FightCommand::RoundElapsed {
                        fight_id,
                        round: next,
                    },
                );
                self.emit_update(&snapshot, FightEventKind::RoundEnded).await;
            }
        }
    }

    async fn handle_forfeit(&mut self, fight_id: Uuid, fighter_id: &str) -> bool {
        let Some(fight) = self.fights.get(&fight_id) else {
            return false;
        };
        let Some(side) = fight.side_of(fighter_id) else {
            return false;
        };
        match fight.status {
            // Backing out before the start abandons the whole fight.
            FightStatus::Pending => {
                self.cancel_fight(fight_id, CancelReason::Abandoned).await;
                true
            }
            FightStatus::InProgress => {
                self.end_fight(fight_id, Some(1 - side), EndReason::Forfeit)
                    .await;
                true
            }
            _ => false,
        }
    }

    async fn handle_place_wager(
        &mut self,
        fight_id: Uuid,
        bettor_id: &str,
        amount: i64,
        side: usize,
    ) -> Result<crate::entities::Wager, WagerError> {
        let Some(fight) = self.fights.get(&fight_id) else {
            return Err(WagerError::NotBettable);
        };
        let wager = self
            .ledger
            .place(
                fight,
                bettor_id,
                amount,
                side,
                &self.config.betting,
                self.economy.as_ref(),
                self.store.as_ref(),
            )
            .await?;
        info!(
            wager_id = %wager.id,
            fight_id = %fight_id,
            bettor_id,
            amount,
            side,
            "wager placed"
        );
        let side_name = self
            .fights
            .get(&fight_id)
            .and_then(|fight| fight.slots.get(side))
            .map(|slot| slot.profile.name.clone())
            .unwrap_or_else(|| format!("side {side}"));
        self.notify(
            Recipient::Fighter(bettor_id.to_owned()),
            NoticeKind::Success,
            format!("Bet placed: ${amount} on {side_name}"),
        )
        .await;
        Ok(wager)
    }

    async fn handle_accept_timeout(&mut self, fight_id: Uuid) {
        let still_pending = self
            .fights
            .get(&fight_id)
            .is_some_and(|fight| fight.status == FightStatus::Pending);
        if still_pending {
            info!(fight_id = %fight_id, "accept window expired");
            self.cancel_fight(fight_id, CancelReason::AcceptTimeout).await;
        }
    }

    /// Cancel every non-terminal fight older than the stale threshold.
    async fn sweep_stale(&mut self, now: OffsetDateTime) {
        let threshold = time::Duration::seconds(self.config.rules.stale_fight_secs as i64);

        // Terminal fights stay visible for a while, then drop out of
        // the live set. The store keeps the archive.
        self.fights.retain(|_, fight| {
            !(fight.status.is_terminal()
                && fight.ended_at.is_some_and(|ended| now - ended > threshold))
        });

        let stale: Vec<Uuid> = self
            .fights
            .values()
            .filter(|fight| !fight.status.is_terminal() && now - fight.created_at > threshold)
            .map(|fight| fight.id)
            .collect();
        for fight_id in stale {
            warn!(fight_id = %fight_id, "sweeping stale fight");
            self.cancel_fight(fight_id, CancelReason::Abandoned).await;
        }
    }

    /// Move a fight to `Completed` and pay out everything that hangs
    /// off it. Safe to call with a timer's stale id: terminal and
    /// missing fights are left alone.
    async fn end_fight(&mut self, fight_id: Uuid, winner_side: Option<usize>, reason: EndReason) {
        let Some(fight) = self.fights.get_mut(&fight_id) else {
            return;
        };
        if fight.status.is_terminal() {
            return;
        }
        fight.status = FightStatus::Completed;
        fight.ended_at = Some(OffsetDateTime::now_utc());
        fight.end_reason = Some(reason);
        if let Some(winner) = winner_side {
            fight.winner = Some(fight.slots[winner].profile.id.clone());
            fight.slots[1 - winner].state = FighterState::Down;
        }
        let snapshot = fight.clone();

        info!(
            fight_id = %snapshot.id,
            winner = ?snapshot.winner,
            reason = ?reason,
            "fight ended"
        );

        self.apply_outcome(&snapshot, winner_side, reason).await;
        self.ledger
            .settle(
                fight_id,
                winner_side,
                self.config.betting.payout_multiplier,
                self.economy.as_ref(),
                self.store.as_ref(),
                &self.outbound,
            )
            .await;
        self.persist(&snapshot).await;
        self.publish_leaderboard().await;

        match winner_side {
            Some(winner) => {
                let loser = 1 - winner;
                self.notify(
                    Recipient::Fighter(snapshot.slots[winner].profile.id.clone()),
                    NoticeKind::Success,
                    format!("You won! +${}", snapshot.kind.winner_reward),
                )
                .await;
                self.notify(
                    Recipient::Fighter(snapshot.slots[loser].profile.id.clone()),
                    NoticeKind::Info,
                    format!("You lost to {}", snapshot.slots[winner].profile.name),
                )
                .await;
                self.notify(
                    Recipient::Broadcast,
                    NoticeKind::Info,
                    format!(
                        "{} defeated {} ({:?})",
                        snapshot.slots[winner].profile.name,
                        snapshot.slots[loser].profile.name,
                        reason
                    ),
                )
                .await;
            }
            None => {
                self.notify(
                    Recipient::Broadcast,
                    NoticeKind::Info,
                    format!(
                        "{} vs {} ended in a draw",
                        snapshot.slots[0].profile.name, snapshot.slots[1].profile.name
                    ),
                )
                .await;
            }
        }
        self.emit_update(&snapshot, FightEventKind::Ended).await;
    }

    /// Ratings, win/loss records, money and item drops for a decided
    /// fight. Draws update ratings only.
    async fn apply_outcome(&self, fight: &Fight, winner_side: Option<usize>, reason: EndReason) {
        let score_for_first = match winner_side {
            Some(0) => 1.0,
            Some(_) => 0.0,
            None => 0.5,
        };
        let (new_a, new_b) = update_ratings(
            fight.slots[0].profile.rating,
            fight.slots[1].profile.rating,
            score_for_first,
            self.config.skill.k_factor,
        );
        let new_ratings = [new_a, new_b];

        for side in 0..2 {
            let mut profile = match self.store.load_fighter(&fight.slots[side].profile.id).await {
                Ok(Some(profile)) => profile,
                Ok(None) => fight.slots[side].profile.clone(),
                Err(err) => {
                    error!(
                        fighter_id = %fight.slots[side].profile.id,
                        error = %err,
                        "failed to load profile for settlement"
                    );
                    fight.slots[side].profile.clone()
                }
            };
            profile.rating = new_ratings[side];

            match winner_side {
                Some(winner) if winner == side => {
                    profile.wins += 1;
                    if reason == EndReason::Knockout {
                        profile.knockouts += 1;
                    }
                    profile.earnings += fight.kind.winner_reward;
                    self.pay(&profile.id, fight.kind.winner_reward).await;
                    self.drop_items(&profile.id, &self.config.rewards.winner).await;
                }
                Some(_) => {
                    profile.losses += 1;
                    profile.earnings += fight.kind.loser_reward;
                    self.pay(&profile.id, fight.kind.loser_reward).await;
                    self.drop_items(&profile.id, &self.config.rewards.loser).await;
                }
                None => {}
            }

            if let Err(err) = self.store.save_fighter(&profile).await {
                error!(fighter_id = %profile.id, error = %err, "failed to persist fighter");
            }
        }
    }

    async fn pay(&self, fighter_id: &str, amount: i64) {
        if amount > 0 && !self.economy.deposit(fighter_id, amount).await {
            warn!(fighter_id, amount, "reward deposit failed, amount owed");
        }
    }

    async fn drop_items(&self, fighter_id: &str, table: &[ItemReward]) {
        for reward in table {
            if rand::rng().random_bool(reward.chance.clamp(0.0, 1.0))
                && !self.economy.add_item(fighter_id, &reward.name, reward.count).await
            {
                warn!(fighter_id, item = %reward.name, "item grant failed");
            }
        }
    }

    /// Cancel a non-terminal fight: entry fees come back, wagers are
    /// refunded, nobody's record moves.
    async fn cancel_fight(&mut self, fight_id: Uuid, reason: CancelReason) {
        let Some(fight) = self.fights.get_mut(&fight_id) else {
            return;
        };
        if fight.status.is_terminal() {
            return;
        }
        fight.status = FightStatus::Cancelled;
        fight.ended_at = Some(OffsetDateTime::now_utc());
        let snapshot = fight.clone();

        info!(fight_id = %snapshot.id, reason = ?reason, "fight cancelled");

        for slot in &snapshot.slots {
            if snapshot.kind.entry_fee > 0
                && !self.economy.deposit(&slot.profile.id, snapshot.kind.entry_fee).await
            {
                warn!(
                    fighter_id = %slot.profile.id,
                    amount = snapshot.kind.entry_fee,
                    "entry fee refund failed, amount owed"
                );
            }
        }

        let text = match reason {
            CancelReason::AcceptTimeout => "The fight was cancelled: not everyone showed up",
            CancelReason::Abandoned => "The fight was abandoned",
        };
        self.ledger
            .refund_all(
                fight_id,
                text,
                self.economy.as_ref(),
                self.store.as_ref(),
                &self.outbound,
            )
            .await;
        self.persist(&snapshot).await;

        for slot in &snapshot.slots {
            self.notify(
                Recipient::Fighter(slot.profile.id.clone()),
                NoticeKind::Warning,
                format!("{text}. Entry fee refunded"),
            )
            .await;
        }
        self.emit_update(&snapshot, FightEventKind::Cancelled).await;
    }

    async fn persist(&self, fight: &Fight) {
        if let Err(err) = self.store.save_fight(fight).await {
            error!(fight_id = %fight.id, error = %err, "failed to persist fight");
        }
    }

    async fn publish_leaderboard(&self) {
        self.leaderboard.invalidate().await;
        match self.leaderboard.entries(self.store.as_ref()).await {
            Ok(entries) => {
                if self
                    .outbound
                    .send(Outbound::LeaderboardUpdate { entries })
                    .await
                    .is_err()
                {
                    warn!("outbound channel closed, dropping leaderboard update");
                }
            }
            Err(err) => warn!(error = %err, "failed to refresh leaderboard"),
        }
    }

    async fn notify(&self, to: Recipient, kind: NoticeKind, text: String) {
        if self
            .outbound
            .send(Outbound::Notice { to, kind, text })
            .await
            .is_err()
        {
            warn!("outbound channel closed, dropping notice");
        }
    }

    async fn emit_update(&self, fight: &Fight, event: FightEventKind) {
        if self
            .outbound
            .send(Outbound::FightUpdate {
                fight: Box::new(fight.clone()),
                event,
            })
            .await
            .is_err()
        {
            warn!("outbound channel closed, dropping fight update");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::MemoryEconomy;
    use crate::events::{fight_command_channel, outbound_channel};
    use crate::leaderboard::Leaderboard;
    use crate::store::MemoryStore;

    const START_BALANCE: i64 = 10_000;

    struct Harness {
        engine: FightEngine,
        economy: Arc<MemoryEconomy>,
        store: Arc<MemoryStore>,
        outbound_rx: crate::events::OutboundReceiver,
        _shutdown_tx: watch::Sender<bool>,
    }

    async fn harness() -> Harness {
        let store = Arc::new(MemoryStore::new());
        for (id, name, rating) in [("a", "Alice", 1000), ("b", "Bob", 1000), ("g", "Gus", 1000)] {
            store
                .save_fighter(&FighterProfile::new(id, name, rating))
                .await
                .unwrap();
        }
        let economy = Arc::new(MemoryEconomy::new(START_BALANCE));
        let (command_tx, command_rx) = fight_command_channel();
        let (outbound, outbound_rx) = outbound_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let engine = FightEngine::new(
            Arc::new(GameConfig::default()),
            economy.clone(),
            store.clone(),
            Arc::new(Leaderboard::default()),
            command_rx,
            command_tx,
            outbound,
            shutdown_rx,
        );
        Harness {
            engine,
            economy,
            store,
            outbound_rx,
            _shutdown_tx: shutdown_tx,
        }
    }

    fn ticket(id: &str, rating: i32) -> QueueTicket {
        QueueTicket::new(id, id, rating, 0)
    }

    async fn created_fight(h: &mut Harness) -> Uuid {
        h.engine.handle_create(ticket("a", 1000), ticket("b", 1000)).await;
        *h.engine.fights.keys().next().unwrap()
    }

    async fn started_fight(h: &mut Harness) -> Uuid {
        let id = created_fight(h).await;
        assert!(h.engine.handle_accept(id, "a").await);
        assert!(h.engine.handle_accept(id, "b").await);
        id
    }

    #[tokio::test]
    async fn create_builds_a_pending_fight() {
        let mut h = harness().await;
        let id = created_fight(&mut h).await;
        let fight = &h.engine.fights[&id];
        assert_eq!(fight.status, FightStatus::Pending);
        assert_eq!(fight.odds, [2.0, 2.0]);
        assert_eq!(fight.slots[0].health, 100);
        assert!(h.engine.fights[&id].arena_index < 3);
        // Persisted immediately.
        assert_eq!(h.store.load_open_fights().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn fight_starts_when_both_accept() {
        let mut h = harness().await;
        let id = created_fight(&mut h).await;

        assert!(h.engine.handle_accept(id, "a").await);
        assert_eq!(h.engine.fights[&id].status, FightStatus::Pending);

        assert!(h.engine.handle_accept(id, "b").await);
        let fight = &h.engine.fights[&id];
        assert_eq!(fight.status, FightStatus::InProgress);
        assert_eq!(fight.round, 1);
        assert_eq!(fight.rounds.len(), 1);
        assert!(fight.started_at.is_some());

        // Strangers and double-accepts.
        assert!(!h.engine.handle_accept(id, "nobody").await);
        assert!(!h.engine.handle_accept(id, "a").await);
    }

    #[tokio::test]
    async fn accept_timeout_cancels_and_refunds() {
        let mut h = harness().await;
        let id = created_fight(&mut h).await;
        h.engine.handle_accept(id, "a").await;

        h.engine.handle_accept_timeout(id).await;
        let fight = &h.engine.fights[&id];
        assert_eq!(fight.status, FightStatus::Cancelled);
        // Entry fee (500) returned to both.
        assert_eq!(h.economy.balance("a").await, START_BALANCE + 500);
        assert_eq!(h.economy.balance("b").await, START_BALANCE + 500);

        // Timer firing again is a no-op.
        h.engine.handle_accept_timeout(id).await;
        assert_eq!(h.economy.balance("a").await, START_BALANCE + 500);
    }

    #[tokio::test]
    async fn knockout_ends_the_fight_and_pays_out() {
        let mut h = harness().await;
        let id = started_fight(&mut h).await;

        assert!(h.engine.handle_damage(id, "a", 100).await);
        let fight = &h.engine.fights[&id];
        assert_eq!(fight.status, FightStatus::Completed);
        assert_eq!(fight.winner.as_deref(), Some("a"));
        assert_eq!(fight.end_reason, Some(EndReason::Knockout));
        assert_eq!(fight.slots[1].health, 0);
        assert_eq!(fight.slots[1].state, FighterState::Down);

        // Winner reward for the fistfight kind.
        assert_eq!(h.economy.balance("a").await, START_BALANCE + 1000);
        assert_eq!(h.economy.balance("b").await, START_BALANCE);

        let winner = h.store.load_fighter("a").await.unwrap().unwrap();
        let loser = h.store.load_fighter("b").await.unwrap().unwrap();
        assert_eq!((winner.wins, winner.knockouts, winner.rating), (1, 1, 1016));
        assert_eq!((loser.losses, loser.rating), (1, 984));

        // Damage after the bell is refused.
        assert!(!h.engine.handle_damage(id, "b", 50).await);
    }

    #[tokio::test]
    async fn decision_goes_to_cumulative_damage() {
        let mut h = harness().await;
        let id = started_fight(&mut h).await;

        for round in 1..=3 {
            assert!(h.engine.handle_damage(id, "a", 30).await);
            assert!(h.engine.handle_damage(id, "b", 20).await);
            h.engine.handle_round_elapsed(id, round).await;
        }

        let fight = &h.engine.fights[&id];
        assert_eq!(fight.status, FightStatus::Completed);
        assert_eq!(fight.end_reason, Some(EndReason::Decision));
        assert_eq!(fight.winner.as_deref(), Some("a"));
        assert_eq!(fight.damage_dealt(0), 90);
        assert_eq!(fight.damage_dealt(1), 60);
    }

    #[tokio::test]
    async fn quiet_rounds_are_simulated_within_the_cap() {
        let mut h = harness().await;
        let id = started_fight(&mut h).await;

        h.engine.handle_round_elapsed(id, 1).await;
        let fight = &h.engine.fights[&id];
        assert_eq!(fight.round, 2);
        let dealt = fight.rounds[0].damage;
        // Equal ratings: base 20 scaled by [0.8, 1.2].
        for side in 0..2 {
            assert!((16..=24).contains(&dealt[side]), "dealt {dealt:?}");
        }
        assert_eq!(fight.slots[0].health, 100 - dealt[1] as i32);
    }

    #[tokio::test]
    async fn stale_round_callbacks_are_ignored() {
        let mut h = harness().await;
        let id = started_fight(&mut h).await;

        h.engine.handle_round_elapsed(id, 1).await;
        assert_eq!(h.engine.fights[&id].round, 2);

        // The round-1 timer firing late changes nothing.
        h.engine.handle_round_elapsed(id, 1).await;
        assert_eq!(h.engine.fights[&id].round, 2);
        assert_eq!(h.engine.fights[&id].rounds.len(), 2);
    }

    #[tokio::test]
    async fn forfeit_awards_the_opponent() {
        let mut h = harness().await;
        let id = started_fight(&mut h).await;

        assert!(h.engine.handle_forfeit(id, "b").await);
        let fight = &h.engine.fights[&id];
        assert_eq!(fight.winner.as_deref(), Some("a"));
        assert_eq!(fight.end_reason, Some(EndReason::Forfeit));

        // A second forfeit on a finished fight is refused.
        assert!(!h.engine.handle_forfeit(id, "a").await);
    }

    #[tokio::test]
    async fn forfeit_before_start_cancels() {
        let mut h = harness().await;
        let id = created_fight(&mut h).await;
        assert!(h.engine.handle_forfeit(id, "b").await);
        assert_eq!(h.engine.fights[&id].status, FightStatus::Cancelled);
        assert_eq!(h.economy.balance("a").await, START_BALANCE + 500);
    }

    #[tokio::test]
    async fn wagers_ride_the_fight_to_settlement() {
        let mut h = harness().await;
        let id = created_fight(&mut h).await;

        let wager = h.engine.handle_place_wager(id, "g", 200, 0).await.unwrap();
        assert_eq!(wager.amount, 200);
        assert_eq!(h.economy.balance("g").await, START_BALANCE - 200);

        h.engine.handle_accept(id, "a").await;
        h.engine.handle_accept(id, "b").await;
        // Betting closes at the bell.
        assert!(matches!(
            h.engine.handle_place_wager(id, "g", 200, 1).await,
            Err(WagerError::NotBettable)
        ));

        h.engine.handle_damage(id, "a", 100).await;
        // Stake returned at 1.9x: -200 + 380.
        assert_eq!(h.economy.balance("g").await, START_BALANCE + 180);
    }

    #[tokio::test]
    async fn cancellation_refunds_wagers() {
        let mut h = harness().await;
        let id = created_fight(&mut h).await;
        h.engine.handle_place_wager(id, "g", 500, 1).await.unwrap();

        h.engine.handle_accept_timeout(id).await;
        assert_eq!(h.economy.balance("g").await, START_BALANCE);
        assert_eq!(h.engine.ledger.active_count(), 0);
    }

    #[tokio::test]
    async fn sweep_cancels_old_fights_only() {
        let mut h = harness().await;
        let id = started_fight(&mut h).await;

        h.engine.sweep_stale(OffsetDateTime::now_utc()).await;
        assert_eq!(h.engine.fights[&id].status, FightStatus::InProgress);

        let later = OffsetDateTime::now_utc() + time::Duration::seconds(31 * 60);
        h.engine.sweep_stale(later).await;
        assert_eq!(h.engine.fights[&id].status, FightStatus::Cancelled);
    }

    #[tokio::test]
    async fn ending_twice_settles_once() {
        let mut h = harness().await;
        let id = started_fight(&mut h).await;

        h.engine.handle_damage(id, "a", 100).await;
        h.engine.end_fight(id, Some(1), EndReason::Forfeit).await;

        let fight = &h.engine.fights[&id];
        assert_eq!(fight.winner.as_deref(), Some("a"));
        assert_eq!(h.economy.balance("a").await, START_BALANCE + 1000);
        assert_eq!(h.economy.balance("b").await, START_BALANCE);
    }

    #[tokio::test]
    async fn leaderboard_update_is_published_on_fight_end() {
        let mut h = harness().await;
        let id = started_fight(&mut h).await;
        h.engine.handle_damage(id, "a", 100).await;

        let mut saw_leaderboard = false;
        while let Ok(event) = h.outbound_rx.try_recv() {
            if let Outbound::LeaderboardUpdate { entries } = event {
                assert_eq!(entries[0].id, "a");
                saw_leaderboard = true;
            }
        }
        assert!(saw_leaderboard);
    }
}
