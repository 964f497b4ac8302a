//! Status resolver for repostat.
//!
//! Computes a [`RepoStatus`](repostat_types::RepoStatus) for a file or
//! directory inside a working tree while many callers query many
//! repositories at once.
//!
//! # Concurrency model
//!
//! - Each repository root has one async lock ([`LockRegistry`]); at most one
//!   computation per root reads the status table at a time.
//! - A process-wide [`ConcurrencyLimiter`] caps how many computations touch
//!   the filesystem concurrently, regardless of repository.
//! - Every wait is cancellable through a [`CancelSignal`]; cancellation
//!   yields the best partial result instead of an error.
//!
//! # Modules
//!
//! - [`cancel`]: Cooperative cancellation signal
//! - [`config`]: [`ResolverConfig`] tuning knobs
//! - [`limiter`]: Global counting gate
//! - [`locks`]: Per-repository lock registry
//! - [`resolver`]: The [`StatusResolver`] pipeline

pub mod cancel;
pub mod config;
pub mod limiter;
pub mod locks;
pub mod resolver;

pub use cancel::CancelSignal;
pub use config::ResolverConfig;
pub use limiter::ConcurrencyLimiter;
pub use locks::{LockRegistry, RepoLock, RepoLockGuard};
pub use resolver::StatusResolver;
