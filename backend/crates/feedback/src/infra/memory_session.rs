//! Bounded in-memory session store
//!
//! Holds at most `capacity` conversations. Each entry owns one expiry timer,
//! replaced on every save. Inserting a new key into a full store first
//! evicts the earliest still-present insertion. Timer expiry, capacity
//! eviction and lazy read expiry all go through [`release`].

use crate::domain::entities::Turn;
use crate::domain::repository::SessionRepository;
use crate::domain::value_objects::SessionKey;
use crate::error::FeedbackResult;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use tokio::task::AbortHandle;
use tokio::time::Instant;

/// Deadline used when `now + ttl` is not representable
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

fn deadline_after(now: Instant, ttl: Duration) -> Instant {
    now.checked_add(ttl).unwrap_or_else(|| now + FAR_FUTURE)
}

#[derive(Debug)]
struct Entry {
    turns: Vec<Turn>,
    /// Sequence number of the save that first inserted this key
    insertion: u64,
    /// Sequence number of the latest save; identifies the live timer
    generation: u64,
    deadline: Instant,
    timer: AbortHandle,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, Entry>,
    /// Insertion order; pairs whose entry is gone or was reinserted are stale
    order: VecDeque<(String, u64)>,
    next_seq: u64,
}

/// Remove `key` if `matches` holds for its entry, cancelling its timer
///
/// Idempotent: a missing key or a non-matching entry is left alone.
fn release(inner: &mut Inner, key: &str, matches: impl FnOnce(&Entry) -> bool) -> bool {
    if !inner.entries.get(key).is_some_and(matches) {
        return false;
    }
    if let Some(entry) = inner.entries.remove(key) {
        entry.timer.abort();
    }
    true
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Clone)]
pub struct MemorySessionStore {
    inner: Arc<Mutex<Inner>>,
    capacity: usize,
    ttl: Duration,
}

impl MemorySessionStore {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            inner: Arc::default(),
            capacity: capacity.max(1),
            ttl,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        lock(&self.inner).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &SessionKey) -> bool {
        lock(&self.inner).entries.contains_key(&key.to_string())
    }

    fn arm_timer(&self, key: String, generation: u64, deadline: Instant) -> AbortHandle {
        let inner: Weak<Mutex<Inner>> = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let Some(inner) = inner.upgrade() else {
                return;
            };
            let mut inner = lock(&inner);
            if release(&mut inner, &key, |entry| entry.generation == generation) {
                tracing::debug!(session_key = %key, "Session expired");
            }
        })
        .abort_handle()
    }

    fn evict_for_insert(&self, inner: &mut Inner) {
        while inner.entries.len() >= self.capacity {
            let Some((key, insertion)) = inner.order.pop_front() else {
                break;
            };
            if release(inner, &key, |entry| entry.insertion == insertion) {
                tracing::debug!(session_key = %key, "Evicted session at capacity");
            }
        }
    }

    fn compact_order(&self, inner: &mut Inner) {
        if inner.order.len() <= self.capacity * 2 + 16 {
            return;
        }
        let Inner { entries, order, .. } = inner;
        order.retain(|(key, insertion)| {
            entries
                .get(key)
                .is_some_and(|entry| entry.insertion == *insertion)
        });
    }
}

impl SessionRepository for MemorySessionStore {
    async fn load(&self, key: &SessionKey) -> FeedbackResult<Vec<Turn>> {
        let key = key.to_string();
        let now = Instant::now();
        let mut inner = lock(&self.inner);
        if release(&mut inner, &key, |entry| entry.deadline <= now) {
            tracing::debug!(session_key = %key, "Session expired on read");
            return Ok(Vec::new());
        }
        Ok(inner
            .entries
            .get(&key)
            .map(|entry| entry.turns.clone())
            .unwrap_or_default())
    }

    async fn save(&self, key: &SessionKey, turns: &[Turn]) -> FeedbackResult<()> {
        let key = key.to_string();
        let deadline = deadline_after(Instant::now(), self.ttl);
        let mut inner = lock(&self.inner);
        inner.next_seq += 1;
        let generation = inner.next_seq;
        let timer = self.arm_timer(key.clone(), generation, deadline);

        if let Some(entry) = inner.entries.get_mut(&key) {
            entry.timer.abort();
            entry.turns = turns.to_vec();
            entry.generation = generation;
            entry.deadline = deadline;
            entry.timer = timer;
            return Ok(());
        }

        self.evict_for_insert(&mut inner);
        inner.entries.insert(
            key.clone(),
            Entry {
                turns: turns.to_vec(),
                insertion: generation,
                generation,
                deadline,
                timer,
            },
        );
        inner.order.push_back((key, generation));
        self.compact_order(&mut inner);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::id::FeedbackId;

    fn key() -> SessionKey {
        SessionKey::new(FeedbackId::new())
    }

    async fn settle() {
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_unrepresentable_ttl_saves_and_loads() {
        let store = MemorySessionStore::new(4, Duration::from_secs(u64::MAX / 2));
        let k = key();
        store.save(&k, &[Turn::user("x")]).await.unwrap();
        tokio::time::advance(Duration::from_secs(86_400 * 365)).await;
        settle().await;

        assert_eq!(store.load(&k).await.unwrap(), vec![Turn::user("x")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_capacity_evicts_earliest_insertion() {
        let store = MemorySessionStore::new(3, Duration::from_secs(3600));
        let keys: Vec<_> = (0..3).map(|_| key()).collect();
        for k in &keys {
            store.save(k, &[Turn::user("x")]).await.unwrap();
        }

        let fourth = key();
        store.save(&fourth, &[Turn::user("x")]).await.unwrap();

        assert_eq!(store.len(), 3);
        assert!(!store.contains(&keys[0]));
        assert!(store.contains(&keys[1]));
        assert!(store.contains(&keys[2]));
        assert!(store.contains(&fourth));
    }

    #[tokio::test(start_paused = true)]
    async fn test_saving_existing_key_never_evicts() {
        let store = MemorySessionStore::new(2, Duration::from_secs(3600));
        let (a, b) = (key(), key());
        store.save(&a, &[Turn::user("1")]).await.unwrap();
        store.save(&b, &[Turn::user("1")]).await.unwrap();

        store
            .save(&a, &[Turn::user("1"), Turn::assistant("2")])
            .await
            .unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.load(&a).await.unwrap().len(), 2);
        assert!(store.contains(&b));

        // Re-saving keeps the original insertion position
        let c = key();
        store.save(&c, &[Turn::user("1")]).await.unwrap();
        assert!(!store.contains(&a));
        assert!(store.contains(&b));
    }

    #[tokio::test(start_paused = true)]
    async fn test_eviction_skips_entries_already_expired() {
        let store = MemorySessionStore::new(2, Duration::from_secs(60));
        let a = key();
        store.save(&a, &[Turn::user("1")]).await.unwrap();
        tokio::time::sleep(Duration::from_secs(61)).await;
        settle().await;
        assert!(!store.contains(&a));

        let (b, c) = (key(), key());
        store.save(&b, &[Turn::user("1")]).await.unwrap();
        store.save(&c, &[Turn::user("1")]).await.unwrap();
        assert_eq!(store.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_removes_entry_after_ttl() {
        let store = MemorySessionStore::new(10, Duration::from_secs(60));
        let k = key();
        store.save(&k, &[Turn::user("x")]).await.unwrap();

        tokio::time::sleep(Duration::from_secs(59)).await;
        settle().await;
        assert!(store.contains(&k));

        tokio::time::sleep(Duration::from_secs(2)).await;
        settle().await;
        assert!(!store.contains(&k));
        assert!(store.load(&k).await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_replaces_timer() {
        let store = MemorySessionStore::new(10, Duration::from_secs(60));
        let k = key();
        store.save(&k, &[Turn::user("x")]).await.unwrap();

        tokio::time::sleep(Duration::from_secs(40)).await;
        store
            .save(&k, &[Turn::user("x"), Turn::assistant("y")])
            .await
            .unwrap();

        // Past the first deadline, inside the second
        tokio::time::sleep(Duration::from_secs(40)).await;
        settle().await;
        assert_eq!(store.load(&k).await.unwrap().len(), 2);

        tokio::time::sleep(Duration::from_secs(25)).await;
        settle().await;
        assert!(!store.contains(&k));
    }

    #[tokio::test(start_paused = true)]
    async fn test_order_queue_stays_bounded() {
        let store = MemorySessionStore::new(2, Duration::from_millis(10));
        for _ in 0..50 {
            store.save(&key(), &[Turn::user("x")]).await.unwrap();
            tokio::time::sleep(Duration::from_millis(20)).await;
            settle().await;
        }
        let inner = lock(&store.inner);
        assert!(inner.order.len() <= store.capacity() * 2 + 16);
    }
}
