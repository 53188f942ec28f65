//! Cached leaderboard reads.
//!
//! Ranking queries hit the store at most once per TTL window; fight
//! settlement invalidates the cache so a freshly decided fight shows
//! up on the next read instead of five minutes later.

use crate::entities::LeaderboardEntry;
use crate::store::{Store, StoreError};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

pub const DEFAULT_LIMIT: usize = 10;
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

struct CacheEntry {
    entries: Vec<LeaderboardEntry>,
    fetched_at: Instant,
}

pub struct Leaderboard {
    limit: usize,
    ttl: Duration,
    cache: Mutex<Option<CacheEntry>>,
}

impl Default for Leaderboard {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT, DEFAULT_TTL)
    }
}

impl Leaderboard {
    pub fn new(limit: usize, ttl: Duration) -> Self {
        Self {
            limit,
            ttl,
            cache: Mutex::new(None),
        }
    }

    /// Current top fighters, served from cache while it is fresh.
    pub async fn entries(&self, store: &dyn Store) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let mut cache = self.cache.lock().await;
        if let Some(entry) = cache.as_ref() {
            if entry.fetched_at.elapsed() < self.ttl {
                return Ok(entry.entries.clone());
            }
        }

        let profiles = store.top_fighters(self.limit).await?;
        let entries: Vec<LeaderboardEntry> = profiles.iter().map(LeaderboardEntry::from).collect();
        *cache = Some(CacheEntry {
            entries: entries.clone(),
            fetched_at: Instant::now(),
        });
        Ok(entries)
    }

    /// Drop the cache; the next read hits the store.
    pub async fn invalidate(&self) {
        *self.cache.lock().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::FighterProfile;
    use crate::store::MemoryStore;

    async fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        for (id, rating) in [("a", 1200), ("b", 1100), ("c", 1000)] {
            let mut profile = FighterProfile::new(id, id, rating);
            profile.wins = 1;
            store.save_fighter(&profile).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn ranks_by_rating_descending() {
        let store = seeded_store().await;
        let board = Leaderboard::new(2, DEFAULT_TTL);
        let entries = board.entries(&store).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "a");
        assert_eq!(entries[1].name, "b");
    }

    #[tokio::test]
    async fn serves_cached_entries_until_invalidated() {
        let store = seeded_store().await;
        let board = Leaderboard::default();
        let before = board.entries(&store).await.unwrap();

        let mut climber = FighterProfile::new("d", "d", 2000);
        climber.wins = 5;
        store.save_fighter(&climber).await.unwrap();

        // Cache still fresh: the new fighter is invisible.
        let cached = board.entries(&store).await.unwrap();
        assert_eq!(cached, before);

        board.invalidate().await;
        let refreshed = board.entries(&store).await.unwrap();
        assert_eq!(refreshed[0].name, "d");
    }
}
