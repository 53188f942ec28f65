//! Event and command plumbing for the processor tasks.
//!
//! All mutation of the queue, the live fight set and the active wager
//! set happens inside the owning processor's select loop; everything
//! else talks to it through these channels.
//!
//! # Flow
//!
//! 1. `QueueCommand` -> `Matchmaker` (join/leave plus its own tick)
//! 2. `Matchmaker` emits `FightCommand::Create` -> `FightEngine`
//! 3. `FightEngine` timers re-enter as `FightCommand`s on its own channel
//! 4. Both emit `Outbound` -> `Notifier` -> `Presenter`

pub mod channels;
pub mod types;

pub use channels::{
    fight_command_channel, outbound_channel, queue_command_channel, CommandSenders,
    FightCommandReceiver, FightCommandSender, OutboundReceiver, OutboundSender,
    QueueCommandReceiver, QueueCommandSender, DEFAULT_CHANNEL_BUFFER,
};
pub use types::{FightCommand, FightEventKind, NoticeKind, Outbound, QueueCommand, Recipient};
