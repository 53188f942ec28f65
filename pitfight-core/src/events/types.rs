//! Command and notification type definitions.

use crate::entities::{CancelReason, Fight, LeaderboardEntry, QueueTicket, Wager};
use crate::ledger::WagerError;
use crate::processors::matchmaker::QueueError;
use tokio::sync::oneshot;
use uuid::Uuid;

/// Inbound requests for the matchmaking queue.
///
/// Join and leave carry a oneshot reply so the caller learns whether
/// the request was accepted; the pairing work itself happens on the
/// matchmaker's own tick.
#[derive(Debug)]
pub enum QueueCommand {
    Join {
        fighter_id: String,
        kind_index: usize,
        reply: oneshot::Sender<Result<(), QueueError>>,
    },
    Leave {
        fighter_id: String,
        reply: oneshot::Sender<Result<(), QueueError>>,
    },
    Snapshot {
        reply: oneshot::Sender<Vec<QueueTicket>>,
    },
}

/// Inbound requests and timer callbacks for the fight engine.
///
/// `AcceptTimeout` and `RoundElapsed` are produced by timers the engine
/// schedules against its own channel; handlers treat them as
/// at-least-once deliveries and no-op when the fight is gone, terminal,
/// or no longer on the referenced round.
#[derive(Debug)]
pub enum FightCommand {
    /// Pair two queue tickets into a new fight.
    Create {
        first: QueueTicket,
        second: QueueTicket,
    },
    Accept {
        fight_id: Uuid,
        fighter_id: String,
        reply: oneshot::Sender<bool>,
    },
    /// Out-of-band damage report from live telemetry.
    Damage {
        fight_id: Uuid,
        attacker_id: String,
        amount: u32,
        reply: oneshot::Sender<bool>,
    },
    Forfeit {
        fight_id: Uuid,
        fighter_id: String,
        reply: oneshot::Sender<bool>,
    },
    Cancel {
        fight_id: Uuid,
        reason: CancelReason,
    },
    PlaceWager {
        fight_id: Uuid,
        bettor_id: String,
        amount: i64,
        side: usize,
        reply: oneshot::Sender<Result<Wager, WagerError>>,
    },
    AcceptTimeout {
        fight_id: Uuid,
    },
    RoundElapsed {
        fight_id: Uuid,
        round: u32,
    },
    List {
        reply: oneshot::Sender<Vec<Fight>>,
    },
}

/// Who a notice is addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    Fighter(String),
    Broadcast,
}

/// Severity of a player-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Info,
    Warning,
    Error,
}

/// Which lifecycle edge a fight update describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FightEventKind {
    Created,
    OpponentReady { fighter_id: String },
    Started,
    RoundEnded,
    HealthChanged,
    Ended,
    Cancelled,
}

/// Fire-and-forget traffic for the presentation layer. Best effort,
/// at most once per call.
#[derive(Debug, Clone)]
pub enum Outbound {
    Notice {
        to: Recipient,
        kind: NoticeKind,
        text: String,
    },
    FightUpdate {
        fight: Box<Fight>,
        event: FightEventKind,
    },
    LeaderboardUpdate {
        entries: Vec<LeaderboardEntry>,
    },
}
