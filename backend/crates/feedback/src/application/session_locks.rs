//! Per-key mutual exclusion for conversation updates
//!
//! A transform loads a history, calls the gateway and saves the extended
//! history. Holding the key's lock for that whole span keeps two concurrent
//! transforms on one conversation from overwriting each other within this
//! process. Locks for idle keys are dropped from the map.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Default)]
pub struct SessionLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

/// Held lock on one key; releases on drop
pub struct SessionGuard<'a> {
    locks: &'a SessionLocks,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`
    pub async fn lock(&self, key: &str) -> SessionGuard<'_> {
        let mutex = self.locks.entry(key.to_string()).or_default().clone();
        let guard = mutex.lock_owned().await;
        SessionGuard {
            locks: self,
            key: key.to_string(),
            guard: Some(guard),
        }
    }

    /// Number of keys with a live lock
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        // Unlock first so the count below only sees waiters
        self.guard.take();
        self.locks
            .locks
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_lock_entry_removed_when_idle() {
        let locks = SessionLocks::new();
        {
            let _guard = locks.lock("a").await;
            assert_eq!(locks.len(), 1);
        }
        assert!(locks.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_key_is_serialized() {
        let locks = Arc::new(SessionLocks::new());
        let first = locks.lock("k").await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.lock("k").await;
            })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());

        drop(first);
        waiter.await.unwrap();
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_block() {
        let locks = SessionLocks::new();
        let _a = locks.lock("a").await;
        let _b = locks.lock("b").await;
        assert_eq!(locks.len(), 2);
    }
}
