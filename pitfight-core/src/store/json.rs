//! Flat-file JSON store backend.
//!
//! One file per collection under a data directory, rewritten whole on
//! each save. Fine for the entity counts a single game server sees; a
//! relational backend can replace this behind the same trait.

use super::{Store, StoreError};
use crate::entities::{Fight, FighterProfile, Wager, WagerStatus};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

const FIGHTS_FILE: &str = "fights.json";
const WAGERS_FILE: &str = "wagers.json";
const FIGHTERS_FILE: &str = "fighters.json";

pub struct JsonStore {
    dir: PathBuf,
    /// Serializes read-modify-write cycles across collections.
    write_lock: Mutex<()>,
}

impl JsonStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    async fn read_collection<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>, StoreError> {
        let path = self.dir.join(file);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }

    async fn write_collection<T: Serialize>(
        &self,
        file: &str,
        items: &[T],
    ) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(items)?;
        let tmp = self.dir.join(format!("{file}.tmp"));
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, self.dir.join(file)).await?;
        Ok(())
    }

    /// Upsert `item` into the collection in `file`, keyed by `matches`.
    async fn upsert<T, F>(&self, file: &str, item: T, matches: F) -> Result<(), StoreError>
    where
        T: Serialize + DeserializeOwned,
        F: Fn(&T) -> bool,
    {
        let _guard = self.write_lock.lock().await;
        let mut items: Vec<T> = self.read_collection(file).await?;
        match items.iter_mut().find(|existing| matches(existing)) {
            Some(existing) => *existing = item,
            None => items.push(item),
        }
        self.write_collection(file, &items).await
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl Store for JsonStore {
    async fn load_open_fights(&self) -> Result<Vec<Fight>, StoreError> {
        let fights: Vec<Fight> = self.read_collection(FIGHTS_FILE).await?;
        Ok(fights
            .into_iter()
            .filter(|fight| !fight.status.is_terminal())
            .collect())
    }

    async fn save_fight(&self, fight: &Fight) -> Result<(), StoreError> {
        let id = fight.id;
        self.upsert(FIGHTS_FILE, fight.clone(), |existing: &Fight| {
            existing.id == id
        })
        .await
    }

    async fn load_active_wagers(&self) -> Result<Vec<Wager>, StoreError> {
        let wagers: Vec<Wager> = self.read_collection(WAGERS_FILE).await?;
        Ok(wagers
            .into_iter()
            .filter(|wager| wager.status == WagerStatus::Active)
            .collect())
    }

    async fn save_wager(&self, wager: &Wager) -> Result<(), StoreError> {
        let id = wager.id;
        self.upsert(WAGERS_FILE, wager.clone(), |existing: &Wager| {
            existing.id == id
        })
        .await
    }

    async fn load_fighter(&self, id: &str) -> Result<Option<FighterProfile>, StoreError> {
        let fighters: Vec<FighterProfile> = self.read_collection(FIGHTERS_FILE).await?;
        Ok(fighters.into_iter().find(|fighter| fighter.id == id))
    }

    async fn save_fighter(&self, profile: &FighterProfile) -> Result<(), StoreError> {
        let id = profile.id.clone();
        self.upsert(
            FIGHTERS_FILE,
            profile.clone(),
            |existing: &FighterProfile| existing.id == id,
        )
        .await
    }

    async fn top_fighters(&self, limit: usize) -> Result<Vec<FighterProfile>, StoreError> {
        let mut fighters: Vec<FighterProfile> = self.read_collection(FIGHTERS_FILE).await?;
        fighters.sort_by(|a, b| b.rating.cmp(&a.rating));
        fighters.truncate(limit);
        Ok(fighters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::FighterProfile;

    #[tokio::test]
    async fn fighters_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path()).await.unwrap();

        assert!(store.load_fighter("f1").await.unwrap().is_none());

        let mut profile = FighterProfile::new("f1", "Alice", 1000);
        store.save_fighter(&profile).await.unwrap();
        profile.wins = 3;
        profile.rating = 1050;
        store.save_fighter(&profile).await.unwrap();

        let loaded = store.load_fighter("f1").await.unwrap().unwrap();
        assert_eq!(loaded, profile);

        // Upsert, not append.
        let top = store.top_fighters(10).await.unwrap();
        assert_eq!(top.len(), 1);
    }

    #[tokio::test]
    async fn top_fighters_sorted_and_limited() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path()).await.unwrap();

        for (id, rating) in [("a", 900), ("b", 1200), ("c", 1100)] {
            let mut profile = FighterProfile::new(id, id, 1000);
            profile.rating = rating;
            store.save_fighter(&profile).await.unwrap();
        }

        let top = store.top_fighters(2).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].id, "b");
        assert_eq!(top[1].id, "c");
    }
}
