//! Single-writer store worker.
//!
//! # Responsibility
//! - Own the `EntityStore` inside one task and run queued jobs in order.
//! - Let any number of handles submit jobs or schedule deferred ones.
//!
//! # Invariants
//! - Jobs run one at a time, in submission order, each to completion.
//! - Deferred jobs are never cancelled; they run even after the caller that
//!   scheduled them is gone.
//! - The worker stops once every handle (including those held by pending
//!   deferred jobs) is dropped, and yields the store back.

use crate::store::EntityStore;
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

type Job = Box<dyn FnOnce(&mut EntityStore) + Send + 'static>;

/// The worker task is no longer running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerError;

impl Display for WorkerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "store worker stopped")
    }
}

impl Error for WorkerError {}

/// Cloneable handle to the store worker.
#[derive(Clone)]
pub struct StoreHandle {
    jobs: mpsc::UnboundedSender<Job>,
}

/// Moves `store` into a worker task on the current tokio runtime.
///
/// The join handle resolves to the store after the last handle is dropped.
pub fn spawn_store_worker(mut store: EntityStore) -> (StoreHandle, JoinHandle<EntityStore>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<Job>();
    let join = tokio::spawn(async move {
        let mut processed: u64 = 0;
        while let Some(job) = rx.recv().await {
            job(&mut store);
            processed += 1;
        }
        debug!("event=store_worker_stop module=worker status=ok jobs={processed}");
        store
    });
    (StoreHandle { jobs: tx }, join)
}

impl StoreHandle {
    /// Runs `f` against the store and returns its result.
    pub async fn call<R, F>(&self, f: F) -> Result<R, WorkerError>
    where
        R: Send + 'static,
        F: FnOnce(&mut EntityStore) -> R + Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let job: Job = Box::new(move |store: &mut EntityStore| {
            // The caller may have stopped waiting; the job still ran.
            let _ = reply_tx.send(f(store));
        });
        self.jobs.send(job).map_err(|_| WorkerError)?;
        reply_rx.await.map_err(|_| WorkerError)
    }

    /// Queues `f` without waiting for it.
    pub fn submit<F>(&self, f: F) -> Result<(), WorkerError>
    where
        F: FnOnce(&mut EntityStore) + Send + 'static,
    {
        self.jobs.send(Box::new(f)).map_err(|_| WorkerError)
    }

    /// Queues `f` after `delay` elapses. Fire-and-forget.
    pub fn defer<F>(&self, delay: Duration, f: F) -> JoinHandle<()>
    where
        F: FnOnce(&mut EntityStore) + Send + 'static,
    {
        let handle = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if handle.submit(f).is_err() {
                warn!(
                    "event=deferred_job module=worker status=dropped delay_ms={}",
                    delay.as_millis()
                );
            }
        })
    }
}
