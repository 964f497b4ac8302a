//! Process-wide holder for the current pool.

use std::sync::Arc;

use repostat_status::StatusResolver;
use tracing::info;

use crate::config::PoolConfig;
use crate::error::PoolError;
use crate::pool::WorkerPool;

/// Holder for a process's current [`WorkerPool`].
///
/// The pool is created on first [`get`](Self::get). [`swap`](Self::swap)
/// closes the current pool before publishing a replacement, so callers
/// never observe two live pools through one slot.
#[derive(Debug)]
pub struct PoolSlot {
    resolver: Arc<StatusResolver>,
    config: PoolConfig,
    current: tokio::sync::Mutex<Option<Arc<WorkerPool>>>,
}

impl PoolSlot {
    pub fn new(resolver: Arc<StatusResolver>, config: PoolConfig) -> Self {
        Self {
            resolver,
            config,
            current: tokio::sync::Mutex::new(None),
        }
    }

    /// The current pool, starting one if the slot is empty.
    pub async fn get(&self) -> Result<Arc<WorkerPool>, PoolError> {
        let mut current = self.current.lock().await;
        if let Some(pool) = current.as_ref() {
            return Ok(Arc::clone(pool));
        }
        let pool = Arc::new(WorkerPool::new(Arc::clone(&self.resolver), &self.config)?);
        *current = Some(Arc::clone(&pool));
        Ok(pool)
    }

    /// Replace the current pool with `pool`, closing the old one first.
    pub async fn swap(&self, pool: WorkerPool) -> Arc<WorkerPool> {
        let mut current = self.current.lock().await;
        if let Some(old) = current.take() {
            old.close().await;
            info!("replaced worker pool");
        }
        let pool = Arc::new(pool);
        *current = Some(Arc::clone(&pool));
        pool
    }

    /// Close and clear the current pool, if any.
    pub async fn close(&self) {
        if let Some(pool) = self.current.lock().await.take() {
            pool.close().await;
        }
    }

    pub fn resolver(&self) -> &Arc<StatusResolver> {
        &self.resolver
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::PoolState;
    use repostat_status::ResolverConfig;

    fn slot() -> PoolSlot {
        let resolver = Arc::new(StatusResolver::new(ResolverConfig::default()));
        PoolSlot::new(resolver, PoolConfig::with_workers(1))
    }

    #[tokio::test]
    async fn get_is_lazy_and_stable() {
        let slot = slot();
        let a = slot.get().await.unwrap();
        let b = slot.get().await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        slot.close().await;
        assert_eq!(a.state(), PoolState::Closed);
    }

    #[tokio::test]
    async fn swap_closes_the_old_pool_first() {
        let slot = slot();
        let old = slot.get().await.unwrap();

        let replacement =
            WorkerPool::new(Arc::clone(slot.resolver()), &PoolConfig::with_workers(2)).unwrap();
        let new = slot.swap(replacement).await;

        assert_eq!(old.state(), PoolState::Closed);
        assert_eq!(new.state(), PoolState::Running);
        assert_eq!(new.worker_count(), 2);
        assert!(Arc::ptr_eq(&new, &slot.get().await.unwrap()));
        slot.close().await;
    }
}
