//! Debounced batching of server create requests.
//!
//! Concurrent create handlers submit one payload each through
//! [`ServerCollector::add_request`]. Payloads of the same [`ResourceKind`]
//! whose fields match except for their host lists are grouped by checksum.
//! Every submission pushes a single shared deadline one debounce window into
//! the future; once the collector has been quiet for that long, each group is
//! merged into one upstream create call and its outcome is delivered to every
//! request of the group.

mod batch;
mod checksum;
mod error;
mod input;
mod table;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{Notify, oneshot, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

use crate::api::ServerCreator;
use crate::config::ServerscomConfig;
use table::{AggregationTable, BatchGroup, PendingRequest};

pub use checksum::checksum;
pub use error::CollectorError;
pub use input::{CreateInput, CreatedServers, HostMerge, ResourceKind};

/// Outcome delivered to each request: the servers created by its batch, or
/// the error that applies to it.
pub type BatchResult = Result<Arc<CreatedServers>, CollectorError>;

/// Receiving end of a queued request. Resolves exactly once.
#[derive(Debug)]
#[must_use = "the batch result is only observable through the receiver"]
pub struct BatchReceiver {
    receiver: oneshot::Receiver<BatchResult>,
}

impl BatchReceiver {
    /// Waits for the batch containing this request to be flushed.
    ///
    /// There is no built-in deadline: the wait lasts at least one debounce
    /// window after the latest submission to the collector. Wrap the call in
    /// [`tokio::time::timeout`] when a bound is required.
    ///
    /// # Errors
    ///
    /// Returns the error delivered for this request, or
    /// [`CollectorError::Abandoned`] when the batch was dropped without a
    /// delivery.
    pub async fn recv(self) -> BatchResult {
        self.receiver
            .await
            .unwrap_or_else(|_| Err(CollectorError::Abandoned))
    }
}

#[derive(Debug, Default)]
struct CollectorState {
    table: AggregationTable,
    deadline: Option<Instant>,
    closed: bool,
}

struct Shared<C> {
    creator: Arc<C>,
    debounce: Duration,
    state: Mutex<CollectorState>,
    wake: Notify,
    stop: watch::Sender<bool>,
    stopped: watch::Sender<bool>,
}

impl<C> Shared<C> {
    fn lock_state(&self) -> MutexGuard<'_, CollectorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drains the table if the deadline has passed. A deadline pushed back
    /// after the worker started sleeping leaves the table untouched, so a
    /// reset never races with a stale expiry.
    fn take_expired(&self) -> Option<Vec<BatchGroup>> {
        let mut state = self.lock_state();
        match state.deadline {
            Some(at) if at <= Instant::now() => {
                state.deadline = None;
                Some(state.table.drain())
            }
            _ => None,
        }
    }

    fn take_all(&self) -> Vec<BatchGroup> {
        let mut state = self.lock_state();
        state.deadline = None;
        state.table.drain()
    }
}

/// Collects create requests and dispatches them in debounced batches.
///
/// Cloning yields another handle to the same collector.
pub struct ServerCollector<C> {
    shared: Arc<Shared<C>>,
    worker: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl<C> Clone for ServerCollector<C> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            worker: Arc::clone(&self.worker),
        }
    }
}

impl<C> ServerCollector<C>
where
    C: ServerCreator + Send + Sync + 'static,
{
    /// Starts a collector whose batches are created through `creator`,
    /// flushing after `debounce` of inactivity.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime, as the flush worker is
    /// spawned onto the current runtime.
    #[must_use]
    pub fn start(creator: C, debounce: Duration) -> Self {
        let (stop, stop_rx) = watch::channel(false);
        let shared = Arc::new(Shared {
            creator: Arc::new(creator),
            debounce,
            state: Mutex::new(CollectorState::default()),
            wake: Notify::new(),
            stop,
            stopped: watch::Sender::new(false),
        });
        let worker = tokio::spawn(run_worker(Arc::clone(&shared), stop_rx));
        debug!(?debounce, "server collector started");
        Self {
            shared,
            worker: Arc::new(Mutex::new(Some(worker))),
        }
    }

    /// Starts a collector using the debounce window from `config`.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    #[must_use]
    pub fn from_config(creator: C, config: &ServerscomConfig) -> Self {
        Self::start(creator, config.debounce())
    }

    /// Queues `input` under `kind` and restarts the debounce window.
    ///
    /// The returned receiver resolves once the batch holding this request
    /// has been dispatched. Failures of the batch itself are only reported
    /// through the receiver.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::Checksum`] when the payload cannot be
    /// serialised and [`CollectorError::ShutDown`] after
    /// [`ServerCollector::shutdown`].
    pub fn add_request(
        &self,
        kind: ResourceKind,
        input: CreateInput,
    ) -> Result<BatchReceiver, CollectorError> {
        let key = input.checksum()?;
        let (sender, receiver) = oneshot::channel();
        {
            let mut state = self.shared.lock_state();
            if state.closed {
                return Err(CollectorError::ShutDown);
            }
            state
                .table
                .push(kind, key.clone(), PendingRequest { input, sender });
            state.deadline = Some(Instant::now() + self.shared.debounce);
        }
        self.shared.wake.notify_one();
        debug!(
            %kind,
            checksum = checksum::short(&key),
            "queued create request"
        );
        Ok(BatchReceiver { receiver })
    }

    /// Number of requests waiting for the next flush.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.shared.lock_state().table.pending_count()
    }

    /// Whether no request is waiting for a flush.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.shared.lock_state().table.is_empty()
    }

    /// Flushes every pending request immediately, stops the worker, and
    /// rejects later submissions. Every call, including concurrent and
    /// repeated ones, returns only after the final flush has completed.
    pub async fn shutdown(&self) {
        self.shared.lock_state().closed = true;
        self.shared.stop.send_replace(true);
        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = worker {
            if let Err(err) = handle.await {
                warn!(error = %err, "server collector worker failed");
            }
            self.shared.stopped.send_replace(true);
        }

        let mut stopped = self.shared.stopped.subscribe();
        let finished = stopped.wait_for(|done| *done).await.map(drop);
        if finished.is_err() {
            warn!("server collector stop signal closed");
        }
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending::<()>().await,
    }
}

async fn run_worker<C>(shared: Arc<Shared<C>>, mut stop: watch::Receiver<bool>)
where
    C: ServerCreator + Send + Sync + 'static,
{
    loop {
        let deadline = shared.lock_state().deadline;
        tokio::select! {
            _ = stop.changed() => break,
            () = shared.wake.notified() => {}
            () = wait_for(deadline) => {
                if let Some(groups) = shared.take_expired() {
                    execute_requests(&shared.creator, groups).await;
                }
            }
        }
    }

    execute_requests(&shared.creator, shared.take_all()).await;
    shared.stopped.send_replace(true);
    debug!("server collector stopped");
}

/// Dispatches every drained group concurrently. A group task that panics
/// only drops its own result senders; its callers observe
/// [`CollectorError::Abandoned`] while other groups complete normally.
async fn execute_requests<C>(creator: &Arc<C>, groups: Vec<BatchGroup>)
where
    C: ServerCreator + Send + Sync + 'static,
{
    if groups.is_empty() {
        return;
    }
    info!(groups = groups.len(), "flushing server collector");

    let mut tasks = JoinSet::new();
    for group in groups {
        let creator = Arc::clone(creator);
        tasks.spawn(async move { batch::create_batch(creator.as_ref(), group).await });
    }
    while let Some(joined) = tasks.join_next().await {
        if let Err(err) = joined {
            warn!(error = %err, "batch task failed");
        }
    }
}

#[cfg(test)]
mod tests;
