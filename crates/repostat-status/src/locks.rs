//! Per-repository lock registry.
//!
//! [`LockRegistry`] maps a canonical repository root to a [`RepoLock`],
//! created on first use and never evicted. The key space is bounded by the
//! number of distinct repositories a process touches.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OwnedMutexGuard;

/// Exclusive async lock for one repository root.
///
/// Tracks how many guards are alive and the highest count ever observed, so
/// the one-holder invariant can be checked from the outside.
#[derive(Debug, Default)]
pub struct RepoLock {
    mutex: Arc<tokio::sync::Mutex<()>>,
    holders: AtomicUsize,
    peak_holders: AtomicUsize,
    acquisitions: AtomicU64,
}

impl RepoLock {
    /// Wait for exclusive access.
    pub async fn acquire(self: &Arc<Self>) -> RepoLockGuard {
        let guard = Arc::clone(&self.mutex).lock_owned().await;
        let holders = self.holders.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_holders.fetch_max(holders, Ordering::SeqCst);
        self.acquisitions.fetch_add(1, Ordering::Relaxed);
        RepoLockGuard {
            lock: Arc::clone(self),
            _guard: guard,
        }
    }

    /// Guards currently alive (0 or 1).
    pub fn holders(&self) -> usize {
        self.holders.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneous guards ever observed.
    pub fn peak_holders(&self) -> usize {
        self.peak_holders.load(Ordering::SeqCst)
    }

    /// Total successful acquisitions.
    pub fn acquisitions(&self) -> u64 {
        self.acquisitions.load(Ordering::Relaxed)
    }
}

/// Held while a computation is inside a repository's critical section.
#[derive(Debug)]
pub struct RepoLockGuard {
    lock: Arc<RepoLock>,
    _guard: OwnedMutexGuard<()>,
}

impl Drop for RepoLockGuard {
    fn drop(&mut self) {
        // Runs before `_guard` is dropped, so the count falls before the
        // mutex is released.
        self.lock.holders.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Concurrent map from repository root to its lock.
#[derive(Debug, Default)]
pub struct LockRegistry {
    locks: Mutex<HashMap<PathBuf, Arc<RepoLock>>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock for `root`, inserting one if this is the first request.
    ///
    /// Insertion happens under the map lock, so concurrent first requests
    /// for the same root always share one [`RepoLock`].
    pub fn lock_for(&self, root: &Path) -> Arc<RepoLock> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(root.to_path_buf()).or_default())
    }

    /// The lock for `root` if it has ever been requested.
    pub fn get(&self, root: &Path) -> Option<Arc<RepoLock>> {
        let locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.get(root).cloned()
    }

    /// Number of distinct roots seen so far.
    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn same_root_shares_a_lock() {
        let registry = LockRegistry::new();
        let a = registry.lock_for(Path::new("/repo/a"));
        let b = registry.lock_for(Path::new("/repo/a"));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn distinct_roots_get_distinct_locks() {
        let registry = LockRegistry::new();
        let a = registry.lock_for(Path::new("/repo/a"));
        let b = registry.lock_for(Path::new("/repo/b"));
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 2);
        assert!(registry.get(Path::new("/repo/c")).is_none());
    }

    #[test]
    fn concurrent_first_access_creates_one_lock() {
        let registry = Arc::new(LockRegistry::new());
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.lock_for(Path::new("/repo/shared")))
            })
            .collect();
        let locks: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(locks.iter().all(|l| Arc::ptr_eq(l, &locks[0])));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn guard_release_updates_counters() {
        let lock = Arc::new(RepoLock::default());
        {
            let _guard = lock.acquire().await;
            assert_eq!(lock.holders(), 1);
        }
        assert_eq!(lock.holders(), 0);
        assert_eq!(lock.peak_holders(), 1);
        assert_eq!(lock.acquisitions(), 1);
    }

    #[tokio::test]
    async fn second_acquire_waits_for_release() {
        let lock = Arc::new(RepoLock::default());
        let guard = lock.acquire().await;

        let waiter = {
            let lock = Arc::clone(&lock);
            tokio::spawn(async move {
                let _g = lock.acquire().await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        waiter.await.unwrap();
        assert_eq!(lock.peak_holders(), 1);
        assert_eq!(lock.acquisitions(), 2);
    }
}
