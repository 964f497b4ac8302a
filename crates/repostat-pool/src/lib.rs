//! Worker pool for repostat.
//!
//! A fixed set of tokio tasks drains a bounded queue of [`StatusRequest`]s,
//! runs each through a shared [`StatusResolver`](repostat_status::StatusResolver)
//! and hands the result to the request's callback. Submission never blocks:
//! when the queue is full the request is dropped.
//!
//! [`PoolSlot`] holds the process's current pool and lets a composition
//! root replace it at runtime.

pub mod config;
pub mod error;
pub mod pool;
pub mod request;
pub mod slot;

pub use config::PoolConfig;
pub use error::PoolError;
pub use pool::{PoolState, WorkerPool};
pub use request::StatusRequest;
pub use slot::PoolSlot;
