//! The serial, state-owning task queue.

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::trace;

/// Error returned when a job cannot be submitted or observed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// The queue has been shut down; the job was not executed.
    #[error("task queue is shut down")]
    Closed,
}

enum Command<S> {
    Run(Box<dyn FnOnce(&mut S) + Send>),
    Shutdown(oneshot::Sender<()>),
}

/// A serial work queue that owns a piece of state of type `S`.
///
/// Jobs are closures over `&mut S`. They execute strictly one at a time,
/// in submission order, on a dedicated tokio task that owns `S` outright.
/// Handles are cheap to clone; all clones feed the same queue.
///
/// Shutting down drops `S` on the queue task, which is how owned
/// resources (e.g. a codec engine) get released.
pub struct TaskQueue<S> {
    tx: mpsc::UnboundedSender<Command<S>>,
}

impl<S> Clone for TaskQueue<S> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<S: Send + 'static> TaskQueue<S> {
    /// Spawns a new queue task owning `state`.
    ///
    /// `name` only labels trace output.
    pub fn spawn(name: impl Into<String>, state: S) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Command<S>>();
        let name = name.into();

        tokio::spawn(async move {
            let mut state = state;
            while let Some(command) = rx.recv().await {
                match command {
                    Command::Run(job) => job(&mut state),
                    Command::Shutdown(ack) => {
                        // Reject anything queued behind the shutdown and
                        // release the state before acknowledging, so a
                        // completed shutdown implies released resources.
                        rx.close();
                        drop(state);
                        let _ = ack.send(());
                        break;
                    }
                }
            }
            trace!(queue = %name, "task queue terminated");
        });

        Self { tx }
    }

    /// Submits `job` for execution and returns immediately.
    ///
    /// The job runs after every previously submitted job has finished.
    pub fn dispatch<F>(&self, job: F) -> Result<(), QueueError>
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        self.tx
            .send(Command::Run(Box::new(job)))
            .map_err(|_| QueueError::Closed)
    }

    /// Submits `job` and waits until it has executed, returning its result.
    ///
    /// This is the submit-and-wait primitive: when the future resolves, the
    /// job, and every job submitted before it, has completed on the queue.
    pub async fn dispatch_sync<F, R>(&self, job: F) -> Result<R, QueueError>
    where
        F: FnOnce(&mut S) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.dispatch(move |state| {
            let _ = ack_tx.send(job(state));
        })?;
        ack_rx.await.map_err(|_| QueueError::Closed)
    }

    /// Shuts the queue down and waits for in-flight work to finish.
    ///
    /// Jobs already queued ahead of the shutdown still run; anything
    /// submitted afterwards fails with [`QueueError::Closed`]. Safe to
    /// call more than once.
    pub async fn shutdown(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(Command::Shutdown(ack_tx)).is_err() {
            // Already shut down.
            return;
        }
        let _ = ack_rx.await;
    }

    /// Returns `true` if the queue can still accept jobs.
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn jobs_run_in_submission_order() {
        let queue = TaskQueue::spawn("order", Vec::new());
        for i in 0..100 {
            queue.dispatch(move |log: &mut Vec<u32>| log.push(i)).unwrap();
        }
        let log = queue.dispatch_sync(|log| log.clone()).await.unwrap();
        assert_eq!(log, (0..100).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn dispatch_sync_observes_prior_dispatches() {
        let queue = TaskQueue::spawn("sync", 0u64);
        queue.dispatch(|n| *n += 1).unwrap();
        queue.dispatch(|n| *n += 1).unwrap();
        assert_eq!(queue.dispatch_sync(|n| *n).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn shutdown_is_idempotent_and_closes_the_queue() {
        let queue = TaskQueue::spawn("shutdown", ());
        queue.shutdown().await;
        queue.shutdown().await;
        assert!(!queue.is_open());
        assert_eq!(queue.dispatch(|_| {}), Err(QueueError::Closed));
        assert_eq!(
            queue.dispatch_sync(|_| 1).await,
            Err(QueueError::Closed)
        );
    }

    #[tokio::test]
    async fn state_drops_on_shutdown() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;

        struct Flagged(Arc<AtomicBool>);
        impl Drop for Flagged {
            fn drop(&mut self) {
                self.0.store(true, Ordering::SeqCst);
            }
        }

        let dropped = Arc::new(AtomicBool::new(false));
        let queue = TaskQueue::spawn("drop", Flagged(dropped.clone()));
        queue.shutdown().await;
        assert!(dropped.load(Ordering::SeqCst));
    }
}
