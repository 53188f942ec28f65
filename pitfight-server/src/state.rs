//! Application state shared across all request handlers.

use pitfight_core::config::GameConfig;
use pitfight_core::events::CommandSenders;
use pitfight_core::leaderboard::Leaderboard;
use pitfight_core::store::Store;
use std::sync::Arc;

/// Application state that is shared across all request handlers.
///
/// Cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    /// Command channels into the matchmaker and the fight engine.
    pub commands: CommandSenders,
    /// Read-only store handle for queries that bypass the processors.
    pub store: Arc<dyn Store>,
    pub leaderboard: Arc<Leaderboard>,
    pub game: Arc<GameConfig>,
    /// Bearer token for `/admin` routes; empty disables them.
    pub admin_secret: Arc<str>,
}

impl AppState {
    pub fn new(
        commands: CommandSenders,
        store: Arc<dyn Store>,
        leaderboard: Arc<Leaderboard>,
        game: Arc<GameConfig>,
        admin_secret: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            commands,
            store,
            leaderboard,
            game,
            admin_secret: admin_secret.into(),
        }
    }
}
