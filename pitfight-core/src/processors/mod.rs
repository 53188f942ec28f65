//! Processor tasks for the event-driven architecture.
//!
//! This module contains the processors that own the mutable state:
//!
//! - `Matchmaker`: owns the queue; receives `QueueCommand`, emits
//!   `FightCommand::Create` and `Outbound`
//! - `FightEngine`: owns live fights and the wager ledger; receives
//!   `FightCommand` (including its own timer callbacks), emits
//!   `Outbound`
//! - `Notifier`: drains `Outbound` into the presenter

pub mod fight_engine;
pub mod matchmaker;
pub mod notifier;

pub use fight_engine::FightEngine;
pub use matchmaker::{Matchmaker, QueueError};
pub use notifier::Notifier;
