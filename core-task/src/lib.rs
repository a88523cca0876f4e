//! Serial task-execution context for the media decode core.
//!
//! Decoder sessions keep all of their mutable state on a single logical
//! owner "thread": a [`TaskQueue`] that executes submitted jobs one at a
//! time, in submission order, against state it exclusively owns. This
//! removes any need for locking inside a decoder, since nothing else can
//! ever observe the state mid-mutation.
//!
//! Downstream crates depend on this crate instead of reaching for tokio
//! directly, so the executor choice stays in one place.
//!
//! # Examples
//!
//! ```rust
//! use core_task::TaskQueue;
//!
//! # async fn example() {
//! let queue = TaskQueue::spawn("demo", 0u32);
//!
//! // Fire-and-forget dispatch; runs after any previously queued job.
//! queue.dispatch(|count| *count += 1).unwrap();
//!
//! // Submit-and-wait: resolves once the job has actually executed.
//! let seen = queue.dispatch_sync(|count| *count).await.unwrap();
//! assert_eq!(seen, 1);
//!
//! queue.shutdown().await;
//! # }
//! ```

mod queue;

pub use queue::{QueueError, TaskQueue};
