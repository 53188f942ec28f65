//! Persistence collaborator.
//!
//! The core rehydrates live state from the store at startup and writes
//! back on every meaningful transition; how the store keeps the data is
//! its own business. [`JsonStore`] is the flat-file default backend and
//! [`MemoryStore`] backs tests.

pub mod json;
pub mod memory;

pub use json::JsonStore;
pub use memory::MemoryStore;

use crate::entities::{Fight, FighterProfile, Wager};
use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend-specific failure that is neither IO nor serialization.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Persistence contract consumed by the core.
#[async_trait]
pub trait Store: Send + Sync {
    /// Fights that were pending or in progress when last saved.
    async fn load_open_fights(&self) -> Result<Vec<Fight>, StoreError>;

    /// Insert or update a fight by id. Terminal fights stay archived.
    async fn save_fight(&self, fight: &Fight) -> Result<(), StoreError>;

    /// Wagers still in the active state.
    async fn load_active_wagers(&self) -> Result<Vec<Wager>, StoreError>;

    /// Insert or update a wager by id.
    async fn save_wager(&self, wager: &Wager) -> Result<(), StoreError>;

    async fn load_fighter(&self, id: &str) -> Result<Option<FighterProfile>, StoreError>;

    /// Insert or update a fighter profile by id.
    async fn save_fighter(&self, profile: &FighterProfile) -> Result<(), StoreError>;

    /// Top fighters by rating, descending.
    async fn top_fighters(&self, limit: usize) -> Result<Vec<FighterProfile>, StoreError>;
}
