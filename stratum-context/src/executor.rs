//! Context-propagating task execution.
//!
//! A fixed pool of worker tasks drains an unbounded queue. Every submitted
//! future is wrapped so that the submitter's ambient context is installed
//! on the worker for exactly the duration of that one task, then torn down
//! whether the task completed, returned an error value, or panicked.
//! Submission never blocks and never rejects; back-pressure is queue growth
//! only, bounded by the callers.

use crate::context::{self, AmbientContext};
use futures_util::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

type WorkItem = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Errors surfaced through a [`TaskHandle`]
#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    /// The executor shut down before the task produced a result
    #[error("executor shut down before the task completed")]
    ShutDown,

    /// The task panicked; the payload message is preserved
    #[error("task panicked: {0}")]
    TaskPanicked(String),
}

/// Executor configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Number of worker tasks
    pub workers: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self { workers: 4 }
    }
}

impl ExecutorConfig {
    /// Create a config with an explicit worker count
    pub fn new(workers: usize) -> Self {
        Self { workers }
    }

    /// Load configuration from environment variables
    ///
    /// `STRATUM_EXECUTOR_WORKERS` overrides the worker count.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(workers) = std::env::var("STRATUM_EXECUTOR_WORKERS") {
            if let Ok(workers) = workers.parse::<usize>() {
                config.workers = workers;
            }
        }
        config
    }
}

/// Result handle for a submitted task.
pub struct TaskHandle<T> {
    receiver: oneshot::Receiver<Result<T, ExecutorError>>,
}

impl<T> TaskHandle<T> {
    /// Wait for the task's result.
    ///
    /// A task that panicked reports [`ExecutorError::TaskPanicked`]; its
    /// context cleanup has already run by the time the error is observed.
    pub async fn join(self) -> Result<T, ExecutorError> {
        match self.receiver.await {
            Ok(outcome) => outcome,
            Err(_) => Err(ExecutorError::ShutDown),
        }
    }
}

/// Worker pool that carries ambient context across the submission boundary.
///
/// The diagnostic map and attribute bag ambient at `submit` time are
/// installed on the worker before the task runs and cleared afterwards,
/// unconditionally, so diagnostic and security context survives
/// asynchronous execution without leaking between tasks.
pub struct ContextPropagatingExecutor {
    queue: mpsc::UnboundedSender<WorkItem>,
    pending: Arc<AtomicUsize>,
    workers: Vec<JoinHandle<()>>,
}

impl ContextPropagatingExecutor {
    /// Start a pool of workers. Must be called within a Tokio runtime.
    pub fn new(config: ExecutorConfig) -> Self {
        let (queue, receiver) = mpsc::unbounded_channel::<WorkItem>();
        let receiver = Arc::new(Mutex::new(receiver));
        let pending = Arc::new(AtomicUsize::new(0));

        let workers = (0..config.workers.max(1))
            .map(|worker| {
                let receiver = Arc::clone(&receiver);
                let pending = Arc::clone(&pending);
                tokio::spawn(async move {
                    loop {
                        let item = { receiver.lock().await.recv().await };
                        match item {
                            Some(task) => {
                                pending.fetch_sub(1, Ordering::SeqCst);
                                task.await;
                            }
                            None => break,
                        }
                    }
                    debug!(worker, "executor worker stopped");
                })
            })
            .collect();

        Self {
            queue,
            pending,
            workers,
        }
    }

    /// Submit a task, capturing the current ambient context.
    ///
    /// Submission is non-blocking. Tasks submitted concurrently have no
    /// ordering guarantee, and sequential submissions from one caller may
    /// still complete out of order across workers.
    pub fn submit<F, T>(&self, task: F) -> TaskHandle<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let captured = context::capture();
        let (sender, receiver) = oneshot::channel();

        let wrapped: WorkItem = Box::pin(async move {
            let ambient = match captured {
                Some(ambient) => ambient,
                None => {
                    warn!("no ambient context was captured at submission, running with an empty one");
                    AmbientContext::default()
                }
            };

            // the scope tears the context down on every exit path,
            // including a panic unwinding out of the task
            let result = AssertUnwindSafe(context::scope(ambient, task))
                .catch_unwind()
                .await;

            let outcome = result.map_err(|panic| {
                let message = if let Some(message) = panic.downcast_ref::<&str>() {
                    (*message).to_string()
                } else if let Some(message) = panic.downcast_ref::<String>() {
                    message.clone()
                } else {
                    "opaque panic payload".to_string()
                };
                ExecutorError::TaskPanicked(message)
            });

            // the submitter may have dropped the handle; that is fine
            let _ = sender.send(outcome);
        });

        self.pending.fetch_add(1, Ordering::SeqCst);
        if self.queue.send(wrapped).is_err() {
            // workers are gone; the dropped sender resolves the handle
            self.pending.fetch_sub(1, Ordering::SeqCst);
        }

        TaskHandle { receiver }
    }

    /// Number of submitted tasks not yet started
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Number of workers in the pool
    pub fn workers(&self) -> usize {
        self.workers.len()
    }

    /// Drain the queue and wait for every worker to finish.
    pub async fn shutdown(self) {
        drop(self.queue);
        for handle in self.workers {
            let _ = handle.await;
        }
    }
}
