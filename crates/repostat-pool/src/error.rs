/// Errors from worker pool construction.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("worker pool requires a running tokio runtime: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}
