//! Integration tests for the serial task queue.
//!
//! Verifies the guarantees decoder sessions rely on:
//! - strict serial execution against exclusively owned state
//! - submit-and-wait semantics of `dispatch_sync`
//! - clones feeding a single queue

use core_task::{QueueError, TaskQueue};
use futures::future::join_all;

#[tokio::test]
async fn concurrent_submitters_never_interleave_a_job() {
    // Each job reads the counter, yields nothing, then writes it back
    // incremented. If two jobs ever overlapped, the final count would
    // fall short.
    let queue = TaskQueue::spawn("contended", 0u64);

    let submitters = (0..8).map(|_| {
        let queue = queue.clone();
        tokio::spawn(async move {
            for _ in 0..250 {
                queue
                    .dispatch(|count| {
                        let seen = *count;
                        *count = seen + 1;
                    })
                    .unwrap();
            }
        })
    });
    join_all(submitters).await;

    let total = queue.dispatch_sync(|count| *count).await.unwrap();
    assert_eq!(total, 8 * 250);
}

#[tokio::test]
async fn dispatch_sync_returns_job_results() {
    let queue = TaskQueue::spawn("results", String::from("vorbis"));
    let upper = queue
        .dispatch_sync(|name| name.to_uppercase())
        .await
        .unwrap();
    assert_eq!(upper, "VORBIS");
}

#[tokio::test]
async fn clones_share_the_same_state() {
    let queue = TaskQueue::spawn("cloned", Vec::new());
    let other = queue.clone();
    queue.dispatch(|log: &mut Vec<&str>| log.push("a")).unwrap();
    other.dispatch(|log: &mut Vec<&str>| log.push("b")).unwrap();
    let log = queue.dispatch_sync(|log| log.clone()).await.unwrap();
    assert_eq!(log, vec!["a", "b"]);
}

#[tokio::test]
async fn shutdown_from_one_clone_closes_all() {
    let queue = TaskQueue::spawn("shared-shutdown", ());
    let other = queue.clone();
    other.shutdown().await;
    assert_eq!(queue.dispatch(|_| {}), Err(QueueError::Closed));
}
