pub mod fight;
pub mod fighter;
pub mod ticket;
pub mod wager;

pub use fight::{CancelReason, EndReason, Fight, FightStatus, FighterSlot, FighterState, RoundResult};
pub use fighter::{FighterProfile, LeaderboardEntry};
pub use ticket::QueueTicket;
pub use wager::{Wager, WagerStatus};
