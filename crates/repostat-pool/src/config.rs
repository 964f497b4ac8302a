//! Pool sizing.

use serde::{Deserialize, Serialize};

/// Workers started when zero are requested.
pub const DEFAULT_WORKERS: usize = 4;

/// Worker pool sizing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Worker tasks to start. `0` means [`DEFAULT_WORKERS`].
    pub workers: usize,
    /// Pending requests the queue holds. Defaults to twice the worker count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_depth: Option<usize>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            queue_depth: None,
        }
    }
}

impl PoolConfig {
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers,
            ..Self::default()
        }
    }

    pub fn worker_count(&self) -> usize {
        if self.workers == 0 {
            DEFAULT_WORKERS
        } else {
            self.workers
        }
    }

    pub fn queue_capacity(&self) -> usize {
        match self.queue_depth {
            Some(depth) if depth > 0 => depth,
            _ => self.worker_count() * 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = PoolConfig::default();
        assert_eq!(c.worker_count(), 4);
        assert_eq!(c.queue_capacity(), 8);
    }

    #[test]
    fn zero_workers_means_default() {
        let c = PoolConfig::with_workers(0);
        assert_eq!(c.worker_count(), DEFAULT_WORKERS);
        assert_eq!(c.queue_capacity(), 2 * DEFAULT_WORKERS);
    }

    #[test]
    fn queue_depth_follows_workers_unless_set() {
        assert_eq!(PoolConfig::with_workers(3).queue_capacity(), 6);
        let c: PoolConfig = toml::from_str("workers = 2\nqueue_depth = 5").unwrap();
        assert_eq!(c.worker_count(), 2);
        assert_eq!(c.queue_capacity(), 5);
    }
}
