#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod config;
pub mod economy;
pub mod entities;
pub mod events;
pub mod leaderboard;
pub mod ledger;
pub mod presenter;
pub mod processors;
pub mod queue;
pub mod rating;
pub mod store;
