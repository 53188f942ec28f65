//! Matchmaking queue.
//!
//! Pure collection logic: the [`Matchmaker`](crate::processors::matchmaker)
//! processor owns an instance and drives it from its tick loop. Pairing
//! scans ascending by rating and takes the first opponent inside the
//! initiator's relaxed rating range; this tie-break is part of the
//! contract (deterministic, not nearest-rating).

use crate::entities::QueueTicket;
use std::collections::{BTreeSet, HashSet};
use time::OffsetDateTime;

/// Result of an enqueue: a fighter already waiting gets their ticket
/// replaced rather than duplicated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueued {
    Added,
    Replaced,
}

/// Tickets evicted and notices due after a refresh pass.
#[derive(Debug, Default)]
pub struct RefreshOutcome {
    /// Tickets that waited past the matchmaking timeout, removed.
    pub evicted: Vec<QueueTicket>,
    /// Fighters owed a "still searching" notice, with their wait in
    /// seconds. One notice per 30 seconds of waiting.
    pub notices: Vec<(String, i64)>,
}

/// How much the acceptable rating gap has grown after `wait_secs` in
/// the queue: one step per 10 seconds, capped.
pub fn relaxation(wait_secs: i64, step: i32, max: i32) -> i32 {
    let steps = wait_secs.max(0) / 10;
    steps
        .saturating_mul(i64::from(step))
        .min(i64::from(max)) as i32
}

pub struct MatchQueue {
    tickets: Vec<QueueTicket>,
    relaxation_step: i32,
    max_relaxation: i32,
}

impl MatchQueue {
    pub fn new(relaxation_step: i32, max_relaxation: i32) -> Self {
        Self {
            tickets: Vec::new(),
            relaxation_step,
            max_relaxation,
        }
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    pub fn contains(&self, fighter_id: &str) -> bool {
        self.tickets
            .iter()
            .any(|ticket| ticket.fighter_id == fighter_id)
    }

    pub fn get(&self, fighter_id: &str) -> Option<&QueueTicket> {
        self.tickets
            .iter()
            .find(|ticket| ticket.fighter_id == fighter_id)
    }

    pub fn tickets(&self) -> &[QueueTicket] {
        &self.tickets
    }

    /// Add a ticket, replacing any existing ticket for the same
    /// fighter (idempotent upsert).
    pub fn enqueue(&mut self, ticket: QueueTicket) -> Enqueued {
        match self
            .tickets
            .iter_mut()
            .find(|existing| existing.fighter_id == ticket.fighter_id)
        {
            Some(existing) => {
                *existing = ticket;
                Enqueued::Replaced
            }
            None => {
                self.tickets.push(ticket);
                Enqueued::Added
            }
        }
    }

    /// Remove and return a fighter's ticket, if queued.
    pub fn dequeue(&mut self, fighter_id: &str) -> Option<QueueTicket> {
        let index = self
            .tickets
            .iter()
            .position(|ticket| ticket.fighter_id == fighter_id)?;
        Some(self.tickets.remove(index))
    }

    /// One pairing pass over every match kind present in the queue.
    ///
    /// For each kind: sort waiting tickets ascending by rating, then
    /// for each unmatched initiator take the first unmatched opponent
    /// whose rating gap fits the initiator's relaxation. At most one
    /// pairing per initiator per pass.
    pub fn pair(&mut self, now: OffsetDateTime) -> Vec<(QueueTicket, QueueTicket)> {
        if self.tickets.len() <= 1 {
            return Vec::new();
        }

        let kinds: BTreeSet<usize> = self.tickets.iter().map(|t| t.kind_index).collect();
        let mut taken: HashSet<String> = HashSet::new();
        let mut paired_ids: Vec<(String, String)> = Vec::new();

        for kind in kinds {
            let mut group: Vec<(i32, String)> = self
                .tickets
                .iter()
                .filter(|ticket| ticket.kind_index == kind)
                .map(|ticket| (ticket.rating, ticket.fighter_id.clone()))
                .collect();
            if group.len() <= 1 {
                continue;
            }
            // Stable sort: equal ratings keep enqueue order.
            group.sort_by_key(|(rating, _)| *rating);

            for i in 0..group.len() {
                let (rating_a, ref id_a) = group[i];
                if taken.contains(id_a) {
                    continue;
                }
                let range = self
                    .get(id_a)
                    .map(|ticket| {
                        relaxation(
                            ticket.wait_secs(now),
                            self.relaxation_step,
                            self.max_relaxation,
                        )
                    })
                    .unwrap_or(0);

                for (j, (rating_b, id_b)) in group.iter().enumerate() {
                    if i == j || taken.contains(id_b) {
                        continue;
                    }
                    if (rating_a - rating_b).abs() <= range {
                        taken.insert(id_a.clone());
                        taken.insert(id_b.clone());
                        paired_ids.push((id_a.clone(), id_b.clone()));
                        break;
                    }
                }
            }
        }

        let mut pairs = Vec::with_capacity(paired_ids.len());
        for (id_a, id_b) in paired_ids {
            if let (Some(a), Some(b)) = (self.dequeue(&id_a), self.dequeue(&id_b)) {
                pairs.push((a, b));
            }
        }
        pairs
    }

    /// Refresh relaxation for everyone still waiting, evict tickets
    /// past the matchmaking timeout and collect due notices.
    pub fn refresh(&mut self, now: OffsetDateTime, timeout_secs: i64) -> RefreshOutcome {
        let mut outcome = RefreshOutcome::default();
        let mut remaining = Vec::with_capacity(self.tickets.len());

        for mut ticket in self.tickets.drain(..) {
            let wait = ticket.wait_secs(now);
            if wait >= timeout_secs {
                outcome.evicted.push(ticket);
                continue;
            }
            ticket.relaxation = relaxation(wait, self.relaxation_step, self.max_relaxation);
            let notice_epoch = (wait / 30) as u32;
            if wait >= 30 && notice_epoch > ticket.notices {
                ticket.notices = notice_epoch;
                outcome.notices.push((ticket.fighter_id.clone(), wait));
            }
            remaining.push(ticket);
        }

        self.tickets = remaining;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn ticket(id: &str, rating: i32, kind: usize) -> QueueTicket {
        QueueTicket::new(id, id, rating, kind)
    }

    fn aged(mut t: QueueTicket, secs: i64) -> QueueTicket {
        t.queued_at -= Duration::seconds(secs);
        t
    }

    fn queue() -> MatchQueue {
        MatchQueue::new(50, 500)
    }

    #[test]
    fn relaxation_grows_and_caps() {
        assert_eq!(relaxation(0, 50, 500), 0);
        assert_eq!(relaxation(9, 50, 500), 0);
        assert_eq!(relaxation(10, 50, 500), 50);
        assert_eq!(relaxation(45, 50, 500), 200);
        assert_eq!(relaxation(3600, 50, 500), 500);
    }

    #[test]
    fn enqueue_is_an_upsert() {
        let mut q = queue();
        assert_eq!(q.enqueue(ticket("a", 1000, 0)), Enqueued::Added);
        assert_eq!(q.enqueue(ticket("a", 1200, 1)), Enqueued::Replaced);
        assert_eq!(q.len(), 1);
        assert_eq!(q.get("a").map(|t| t.rating), Some(1200));
    }

    #[test]
    fn equal_ratings_pair_immediately() {
        let mut q = queue();
        q.enqueue(ticket("a", 1000, 0));
        q.enqueue(ticket("b", 1000, 0));
        let pairs = q.pair(OffsetDateTime::now_utc());
        assert_eq!(pairs.len(), 1);
        assert!(q.is_empty());
    }

    #[test]
    fn gap_outside_relaxation_does_not_pair() {
        let mut q = queue();
        q.enqueue(ticket("a", 1000, 0));
        q.enqueue(ticket("b", 1100, 0));
        assert!(q.pair(OffsetDateTime::now_utc()).is_empty());
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn waiting_widens_the_range() {
        let mut q = queue();
        // 20s of waiting buys 100 points of relaxation.
        q.enqueue(aged(ticket("a", 1000, 0), 20));
        q.enqueue(aged(ticket("b", 1100, 0), 20));
        let pairs = q.pair(OffsetDateTime::now_utc());
        assert_eq!(pairs.len(), 1);
    }

    #[test]
    fn first_compatible_opponent_wins_not_the_closest() {
        let mut q = queue();
        q.enqueue(aged(ticket("low", 1000, 0), 60));
        q.enqueue(aged(ticket("mid", 1040, 0), 60));
        q.enqueue(aged(ticket("near", 1010, 0), 60));
        let pairs = q.pair(OffsetDateTime::now_utc());
        // Initiator is the lowest rating; "near" (1010) precedes "mid"
        // (1040) in ascending order and is taken first.
        assert_eq!(pairs.len(), 1);
        let (a, b) = &pairs[0];
        assert_eq!(a.fighter_id, "low");
        assert_eq!(b.fighter_id, "near");
        assert_eq!(q.len(), 1);
        assert!(q.contains("mid"));
    }

    #[test]
    fn kinds_never_mix() {
        let mut q = queue();
        q.enqueue(aged(ticket("a", 1000, 0), 120));
        q.enqueue(aged(ticket("b", 1000, 1), 120));
        assert!(q.pair(OffsetDateTime::now_utc()).is_empty());
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn four_tickets_two_pairs() {
        let mut q = queue();
        for (id, rating) in [("a", 1000), ("b", 1005), ("c", 2000), ("d", 2010)] {
            q.enqueue(aged(ticket(id, rating, 0), 15));
        }
        let pairs = q.pair(OffsetDateTime::now_utc());
        assert_eq!(pairs.len(), 2);
        assert!(q.is_empty());
    }

    #[test]
    fn refresh_evicts_after_timeout() {
        let mut q = queue();
        q.enqueue(aged(ticket("old", 1000, 0), 75));
        q.enqueue(aged(ticket("fresh", 1000, 1), 5));
        let outcome = q.refresh(OffsetDateTime::now_utc(), 60);
        assert_eq!(outcome.evicted.len(), 1);
        assert_eq!(outcome.evicted[0].fighter_id, "old");
        assert_eq!(q.len(), 1);
        assert!(q.contains("fresh"));
    }

    #[test]
    fn refresh_updates_relaxation_and_notices_once() {
        let mut q = queue();
        q.enqueue(aged(ticket("a", 1000, 0), 35));
        let outcome = q.refresh(OffsetDateTime::now_utc(), 600);
        assert_eq!(outcome.notices.len(), 1);
        assert_eq!(q.get("a").map(|t| t.relaxation), Some(150));

        // Same 30s window: no second notice.
        let outcome = q.refresh(OffsetDateTime::now_utc(), 600);
        assert!(outcome.notices.is_empty());
    }

    #[test]
    fn no_fighter_appears_twice() {
        let mut q = queue();
        q.enqueue(aged(ticket("a", 1000, 0), 60));
        q.enqueue(aged(ticket("b", 1000, 0), 60));
        q.enqueue(aged(ticket("c", 1000, 0), 60));
        let pairs = q.pair(OffsetDateTime::now_utc());
        assert_eq!(pairs.len(), 1);
        let mut seen: Vec<&str> = Vec::new();
        for (a, b) in &pairs {
            seen.push(&a.fighter_id);
            seen.push(&b.fighter_id);
        }
        for ticket in q.tickets() {
            seen.push(&ticket.fighter_id);
        }
        let unique: HashSet<&&str> = seen.iter().collect();
        assert_eq!(unique.len(), seen.len());
    }
}
