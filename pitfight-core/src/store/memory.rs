//! In-memory store backend for tests and ephemeral deployments.

use super::{Store, StoreError};
use crate::entities::{Fight, FighterProfile, Wager, WagerStatus};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryStore {
    fights: RwLock<HashMap<Uuid, Fight>>,
    wagers: RwLock<HashMap<Uuid, Wager>>,
    fighters: RwLock<HashMap<String, FighterProfile>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of wagers ever saved, regardless of status.
    pub async fn wager_count(&self) -> usize {
        self.wagers.read().await.len()
    }

    /// A saved fight by id, archived or live.
    pub async fn fight(&self, id: Uuid) -> Option<Fight> {
        self.fights.read().await.get(&id).cloned()
    }

    /// A saved wager by id.
    pub async fn wager(&self, id: Uuid) -> Option<Wager> {
        self.wagers.read().await.get(&id).cloned()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn load_open_fights(&self) -> Result<Vec<Fight>, StoreError> {
        Ok(self
            .fights
            .read()
            .await
            .values()
            .filter(|fight| !fight.status.is_terminal())
            .cloned()
            .collect())
    }

    async fn save_fight(&self, fight: &Fight) -> Result<(), StoreError> {
        self.fights.write().await.insert(fight.id, fight.clone());
        Ok(())
    }

    async fn load_active_wagers(&self) -> Result<Vec<Wager>, StoreError> {
        Ok(self
            .wagers
            .read()
            .await
            .values()
            .filter(|wager| wager.status == WagerStatus::Active)
            .cloned()
            .collect())
    }

    async fn save_wager(&self, wager: &Wager) -> Result<(), StoreError> {
        self.wagers.write().await.insert(wager.id, wager.clone());
        Ok(())
    }

    async fn load_fighter(&self, id: &str) -> Result<Option<FighterProfile>, StoreError> {
        Ok(self.fighters.read().await.get(id).cloned())
    }

    async fn save_fighter(&self, profile: &FighterProfile) -> Result<(), StoreError> {
        self.fighters
            .write()
            .await
            .insert(profile.id.clone(), profile.clone());
        Ok(())
    }

    async fn top_fighters(&self, limit: usize) -> Result<Vec<FighterProfile>, StoreError> {
        let mut fighters: Vec<FighterProfile> =
            self.fighters.read().await.values().cloned().collect();
        fighters.sort_by(|a, b| b.rating.cmp(&a.rating));
        fighters.truncate(limit);
        Ok(fighters)
    }
}
