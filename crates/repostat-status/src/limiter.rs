//! Global concurrency limiter.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::cancel::CancelSignal;

/// A fixed-capacity counting gate shared by every status computation.
///
/// It bounds parallel filesystem and repository reads only; it does not
/// provide mutual exclusion for any repository.
#[derive(Clone, Debug)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl ConcurrencyLimiter {
    /// A limiter admitting `capacity` holders (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Wait for a slot. Returns `None` if `cancel` fires first or had
    /// already fired.
    pub async fn acquire(&self, cancel: &CancelSignal) -> Option<OwnedSemaphorePermit> {
        if cancel.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            () = cancel.cancelled() => None,
            permit = Arc::clone(&self.semaphore).acquire_owned() => permit.ok(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots not currently held.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn zero_capacity_is_raised_to_one() {
        assert_eq!(ConcurrencyLimiter::new(0).capacity(), 1);
    }

    #[tokio::test]
    async fn permits_are_bounded_and_returned() {
        let limiter = ConcurrencyLimiter::new(2);
        let cancel = CancelSignal::new();
        let a = limiter.acquire(&cancel).await.unwrap();
        let _b = limiter.acquire(&cancel).await.unwrap();
        assert_eq!(limiter.available(), 0);
        drop(a);
        assert_eq!(limiter.available(), 1);
    }

    #[tokio::test]
    async fn pre_cancelled_acquire_returns_none() {
        let limiter = ConcurrencyLimiter::new(1);
        let cancel = CancelSignal::new();
        cancel.cancel();
        assert!(limiter.acquire(&cancel).await.is_none());
        assert_eq!(limiter.available(), 1);
    }

    #[tokio::test]
    async fn pending_acquire_aborts_on_cancel() {
        let limiter = ConcurrencyLimiter::new(1);
        let _held = limiter.acquire(&CancelSignal::new()).await.unwrap();

        let cancel = CancelSignal::new();
        let pending = {
            let limiter = limiter.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { limiter.acquire(&cancel).await.is_some() })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();

        let got = tokio::time::timeout(Duration::from_secs(5), pending)
            .await
            .expect("acquire should abort")
            .unwrap();
        assert!(!got);
    }
}
