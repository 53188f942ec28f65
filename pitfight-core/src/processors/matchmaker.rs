//! Matchmaker processor.
//!
//! The Matchmaker is responsible for:
//! - Receiving `QueueCommand` join/leave/snapshot requests
//! - Charging and refunding entry fees around queue membership
//! - Running the pairing pass on every enqueue and on its own tick
//! - Evicting fighters who waited past the matchmaking timeout
//! - Emitting `FightCommand::Create` for each pairing

use crate::config::GameConfig;
use crate::economy::Economy;
use crate::entities::QueueTicket;
use crate::events::{
    FightCommand, FightCommandSender, NoticeKind, Outbound, OutboundSender, QueueCommand,
    QueueCommandReceiver, Recipient,
};
use crate::queue::MatchQueue;
use crate::store::{Store, StoreError};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use time::OffsetDateTime;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Why a queue request was refused.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("unknown match kind")]
    UnknownMatchKind,

    /// The fighter has no profile yet; registration comes first.
    #[error("unknown fighter")]
    UnknownFighter,

    #[error("insufficient funds for the entry fee")]
    InsufficientFunds,

    #[error("not in the queue")]
    NotQueued,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Matchmaker owns the queue and turns waiting fighters into fights.
pub struct Matchmaker {
    config: Arc<GameConfig>,
    queue: MatchQueue,
    economy: Arc<dyn Economy>,
    store: Arc<dyn Store>,
    queue_rx: QueueCommandReceiver,
    fight_tx: FightCommandSender,
    outbound: OutboundSender,
    shutdown_rx: watch::Receiver<bool>,
}

impl Matchmaker {
    pub fn new(
        config: Arc<GameConfig>,
        economy: Arc<dyn Economy>,
        store: Arc<dyn Store>,
        queue_rx: QueueCommandReceiver,
        fight_tx: FightCommandSender,
        outbound: OutboundSender,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        let queue = MatchQueue::new(
            config.skill.min_relaxation_step,
            config.skill.max_relaxation,
        );
        Self {
            config,
            queue,
            economy,
            store,
            queue_rx,
            fight_tx,
            outbound,
            shutdown_rx,
        }
    }

    /// Run the Matchmaker.
    pub async fn run(mut self) {
        info!("Matchmaker started");

        let mut tick = tokio::time::interval(Duration::from_secs(
            self.config.rules.queue_tick_secs.max(1),
        ));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown_rx.changed() => {
                    if *self.shutdown_rx.borrow() {
                        info!("Matchmaker received shutdown signal");
                        break;
                    }
                }

                Some(command) = self.queue_rx.recv() => {
                    self.handle_command(command).await;
                }

                _ = tick.tick() => {
                    self.run_cycle(OffsetDateTime::now_utc()).await;
                }

                else => {
                    info!("queue command channel closed");
                    break;
                }
            }
        }

        info!("Matchmaker shutdown complete");
    }

    async fn handle_command(&mut self, command: QueueCommand) {
        match command {
            QueueCommand::Join {
                fighter_id,
                kind_index,
                reply,
            } => {
                let result = self.handle_join(&fighter_id, kind_index).await;
                if let Err(err) = &result {
                    debug!(fighter_id, error = %err, "queue join refused");
                }
                let _ = reply.send(result);
            }
            QueueCommand::Leave { fighter_id, reply } => {
                let result = self.handle_leave(&fighter_id).await;
                let _ = reply.send(result);
            }
            QueueCommand::Snapshot { reply } => {
                let _ = reply.send(self.queue.tickets().to_vec());
            }
        }
    }

    /// Charge the entry fee and enqueue. A fighter already waiting is
    /// moved to the new kind: the new fee is charged first, then the
    /// old ticket's fee refunded, so a failed charge leaves the old
    /// ticket untouched.
    async fn handle_join(&mut self, fighter_id: &str, kind_index: usize) -> Result<(), QueueError> {
        let kind = self
            .config
            .match_kind(kind_index)
            .ok_or(QueueError::UnknownMatchKind)?
            .clone();
        let profile = self
            .store
            .load_fighter(fighter_id)
            .await?
            .ok_or(QueueError::UnknownFighter)?;

        if kind.entry_fee > 0 && !self.economy.withdraw(fighter_id, kind.entry_fee).await {
            return Err(QueueError::InsufficientFunds);
        }

        if let Some(old) = self.queue.dequeue(fighter_id) {
            self.refund_entry_fee(&old).await;
        }

        let ticket = QueueTicket::new(fighter_id, profile.name, profile.rating, kind_index);
        self.queue.enqueue(ticket);
        debug!(fighter_id, kind = %kind.name, "fighter queued");

        self.notify(
            fighter_id,
            NoticeKind::Success,
            format!("You are in the queue for {}", kind.name),
        )
        .await;

        // A compatible opponent may already be waiting.
        self.pair_waiting(OffsetDateTime::now_utc()).await;
        Ok(())
    }

    async fn handle_leave(&mut self, fighter_id: &str) -> Result<(), QueueError> {
        let ticket = self.queue.dequeue(fighter_id).ok_or(QueueError::NotQueued)?;
        self.refund_entry_fee(&ticket).await;
        self.notify(
            fighter_id,
            NoticeKind::Info,
            "You left the queue. Entry fee refunded".to_owned(),
        )
        .await;
        Ok(())
    }

    /// One matchmaking cycle: pair whoever fits, then recompute
    /// relaxation and evict timed-out leftovers. Pairing goes first so
    /// a fighter whose range widened onto a compatible opponent this
    /// cycle is matched, not refunded.
    async fn run_cycle(&mut self, now: OffsetDateTime) {
        self.pair_waiting(now).await;

        let timeout = self.config.rules.matchmaking_timeout_secs as i64;
        let outcome = self.queue.refresh(now, timeout);

        for ticket in &outcome.evicted {
            self.refund_entry_fee(ticket).await;
            self.notify(
                &ticket.fighter_id,
                NoticeKind::Warning,
                "No opponent found. Entry fee refunded".to_owned(),
            )
            .await;
        }
        for (fighter_id, wait) in &outcome.notices {
            self.notify(
                fighter_id,
                NoticeKind::Info,
                format!("Still searching for an opponent ({wait}s)"),
            )
            .await;
        }
    }

    async fn pair_waiting(&mut self, now: OffsetDateTime) {
        for (first, second) in self.queue.pair(now) {
            info!(
                first = %first.fighter_id,
                second = %second.fighter_id,
                kind_index = first.kind_index,
                "paired fighters"
            );
            if self
                .fight_tx
                .send(FightCommand::Create { first, second })
                .await
                .is_err()
            {
                warn!("fight command channel closed, dropping pairing");
                return;
            }
        }
    }

    async fn refund_entry_fee(&self, ticket: &QueueTicket) {
        let Some(kind) = self.config.match_kind(ticket.kind_index) else {
            return;
        };
        if kind.entry_fee > 0 && !self.economy.deposit(&ticket.fighter_id, kind.entry_fee).await {
            warn!(
                fighter_id = %ticket.fighter_id,
                amount = kind.entry_fee,
                "entry fee refund failed, amount owed to fighter"
            );
        }
    }

    async fn notify(&self, fighter_id: &str, kind: NoticeKind, text: String) {
        let event = Outbound::Notice {
            to: Recipient::Fighter(fighter_id.to_owned()),
            kind,
            text,
        };
        if self.outbound.send(event).await.is_err() {
            warn!("outbound channel closed, dropping queue notice");
        }
    }
}
