//! Fixed-size worker pool draining a bounded queue of status requests.
//!
//! Submission never blocks: a full queue drops the request and counts it.
//! Closing cancels in-flight queries and joins the workers.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use repostat_git::RepoHandle;
use repostat_status::{CancelSignal, StatusResolver};
use repostat_types::{RepoStatus, TargetKind};
use tokio::runtime::Handle;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::PoolConfig;
use crate::error::PoolError;
use crate::request::StatusRequest;

const RUNNING: u8 = 0;
const CLOSING: u8 = 1;
const CLOSED: u8 = 2;

/// Lifecycle of a [`WorkerPool`]. Only moves forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PoolState {
    Running,
    Closing,
    Closed,
}

type Queue = Arc<tokio::sync::Mutex<mpsc::Receiver<StatusRequest>>>;

/// Fixed-size set of async workers consuming a bounded request queue.
pub struct WorkerPool {
    sender: Mutex<Option<mpsc::Sender<StatusRequest>>>,
    workers: tokio::sync::Mutex<Vec<JoinHandle<()>>>,
    cancel: CancelSignal,
    state: AtomicU8,
    dropped: AtomicU64,
    worker_count: usize,
    queue_capacity: usize,
}

impl WorkerPool {
    /// Start the pool's workers on the current tokio runtime.
    pub fn new(resolver: Arc<StatusResolver>, config: &PoolConfig) -> Result<Self, PoolError> {
        let runtime = Handle::try_current()?;
        let worker_count = config.worker_count();
        let queue_capacity = config.queue_capacity();

        let (sender, receiver) = mpsc::channel(queue_capacity);
        let queue: Queue = Arc::new(tokio::sync::Mutex::new(receiver));
        let cancel = CancelSignal::new();

        let workers = (0..worker_count)
            .map(|id| {
                runtime.spawn(run_worker(
                    id,
                    Arc::clone(&resolver),
                    Arc::clone(&queue),
                    cancel.clone(),
                ))
            })
            .collect();

        info!(workers = worker_count, queue = queue_capacity, "worker pool started");
        Ok(Self {
            sender: Mutex::new(Some(sender)),
            workers: tokio::sync::Mutex::new(workers),
            cancel,
            state: AtomicU8::new(RUNNING),
            dropped: AtomicU64::new(0),
            worker_count,
            queue_capacity,
        })
    }

    /// Queue a request without waiting.
    ///
    /// Returns `false` if the pool is not running or the queue is full; the
    /// request (and its callback) is dropped in that case.
    pub fn submit(&self, request: StatusRequest) -> bool {
        if self.state() != PoolState::Running {
            return false;
        }
        let sender = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(sender) = sender.as_ref() else {
            return false;
        };
        match sender.try_send(request) {
            Ok(()) => true,
            Err(TrySendError::Full(request)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                debug!(path = %request.path.display(), "queue full, dropping request");
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    /// Queue a query and receive its result on a oneshot channel instead of
    /// a callback. `None` if the request was not accepted.
    pub fn submit_with_reply(
        &self,
        repo: RepoHandle,
        path: impl Into<PathBuf>,
        kind: TargetKind,
    ) -> Option<oneshot::Receiver<Option<RepoStatus>>> {
        let (tx, rx) = oneshot::channel();
        let request = StatusRequest::new(repo, path, kind, move |result| {
            // The caller may have stopped listening.
            let _ = tx.send(result);
        });
        self.submit(request).then_some(rx)
    }

    /// Stop accepting work, cancel in-flight queries and wait for every
    /// worker to exit. Safe to call more than once, and concurrently.
    pub async fn close(&self) {
        let first = self
            .state
            .compare_exchange(RUNNING, CLOSING, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();

        self.cancel.cancel();
        drop(
            self.sender
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take(),
        );

        let mut workers = self.workers.lock().await;
        for handle in workers.drain(..) {
            if let Err(e) = handle.await {
                warn!(error = %e, "worker task failed");
            }
        }
        self.state.store(CLOSED, Ordering::SeqCst);

        if first {
            info!(dropped = self.dropped(), "worker pool closed");
        }
    }

    pub fn state(&self) -> PoolState {
        match self.state.load(Ordering::SeqCst) {
            RUNNING => PoolState::Running,
            CLOSING => PoolState::Closing,
            _ => PoolState::Closed,
        }
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    /// Requests rejected because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("state", &self.state())
            .field("workers", &self.worker_count)
            .field("queue_capacity", &self.queue_capacity)
            .field("dropped", &self.dropped())
            .finish()
    }
}

async fn run_worker(id: usize, resolver: Arc<StatusResolver>, queue: Queue, cancel: CancelSignal) {
    debug!(worker = id, "worker started");
    loop {
        let next = {
            let mut receiver = queue.lock().await;
            tokio::select! {
                biased;
                () = cancel.cancelled() => None,
                request = receiver.recv() => request,
            }
        };
        let Some(request) = next else {
            break;
        };

        let result = resolver
            .resolve(&request.repo, &request.path, request.kind, &cancel)
            .await;
        request.complete(result);
    }
    debug!(worker = id, "worker stopped");
}
