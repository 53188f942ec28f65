//! Channel factories and sender handles.

use super::types::{FightCommand, Outbound, QueueCommand};
use tokio::sync::mpsc;

/// Default buffer size for command and notification channels.
///
/// Enough to absorb bursts while keeping memory bounded.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

/// Sender handle for queue commands.
pub type QueueCommandSender = mpsc::Sender<QueueCommand>;
/// Receiver handle for queue commands.
pub type QueueCommandReceiver = mpsc::Receiver<QueueCommand>;

/// Sender handle for fight-engine commands.
pub type FightCommandSender = mpsc::Sender<FightCommand>;
/// Receiver handle for fight-engine commands.
pub type FightCommandReceiver = mpsc::Receiver<FightCommand>;

/// Sender handle for outbound presentation traffic.
pub type OutboundSender = mpsc::Sender<Outbound>;
/// Receiver handle for outbound presentation traffic.
pub type OutboundReceiver = mpsc::Receiver<Outbound>;

/// Create a new queue command channel.
pub fn queue_command_channel() -> (QueueCommandSender, QueueCommandReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}

/// Create a new fight command channel.
///
/// The engine keeps a clone of the sender for its own timer callbacks.
pub fn fight_command_channel() -> (FightCommandSender, FightCommandReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}

/// Create a new outbound notification channel.
pub fn outbound_channel() -> (OutboundSender, OutboundReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}

/// Container for the senders the inbound surface needs.
#[derive(Clone)]
pub struct CommandSenders {
    pub queue: QueueCommandSender,
    pub fight: FightCommandSender,
    pub outbound: OutboundSender,
}
