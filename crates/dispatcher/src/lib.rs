#![deny(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

//! Bounded-parallelism fan-out over a set of identifiers.
//!
//! `SyncAll` on every syncer in `groupsync-engine` is driven by
//! [`Dispatcher::run`]: a worker pool bounded by an explicit concurrency
//! parameter (default: the number of logical CPUs) processes one item per
//! worker slot, joins every per-item failure into a single
//! [`DispatchOutcome`], and never aborts siblings because one item failed
//! (`spec.md` §4.8).

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

pub use tokio_util::sync::CancellationToken;

/// The result of running a batch of work items through [`Dispatcher::run`].
#[derive(Debug)]
pub struct DispatchOutcome<E> {
    /// `(item_id, error)` pairs for every item whose work closure failed.
    pub errors: Vec<(String, E)>,
    /// Whether the cancellation signal was observed before every item had
    /// a chance to run.
    pub cancelled: bool,
}

impl<E> DispatchOutcome<E> {
    /// Whether every item succeeded and the run was not cancelled.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.errors.is_empty() && !self.cancelled
    }
}

/// Runs a collection of fallible async operations with a global
/// concurrency bound.
pub struct Dispatcher {
    concurrency: usize,
}

impl Dispatcher {
    /// Creates a dispatcher with an explicit worker pool size (clamped to at least 1).
    #[must_use]
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    /// Creates a dispatcher sized to the number of logical CPUs (at least 1).
    #[must_use]
    pub fn with_default_concurrency() -> Self {
        let cpus = std::thread::available_parallelism().map(std::num::NonZeroUsize::get).unwrap_or(1);
        Self::new(cpus)
    }

    /// Runs `work(id)` for every id in `ids`, bounded by this dispatcher's
    /// concurrency, and aggregates every failure instead of aborting.
    ///
    /// Ordering across ids is unspecified; within a single `work(id)`
    /// invocation, the closure runs sequentially on its worker. Once
    /// `cancellation` fires, no further items are dispatched, but items
    /// already running are allowed to finish — they are expected to check
    /// `cancellation` themselves between their own long-running sub-steps
    /// (`spec.md` §4.8).
    pub async fn run<F, Fut, E>(&self, ids: Vec<String>, cancellation: CancellationToken, work: F) -> DispatchOutcome<E>
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Send + 'static,
    {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let work = Arc::new(work);
        let mut set = JoinSet::new();
        let mut cancelled = false;

        for id in ids {
            if cancellation.is_cancelled() {
                cancelled = true;
                break;
            }
            let semaphore = Arc::clone(&semaphore);
            let work = Arc::clone(&work);
            let cancellation = cancellation.clone();
            set.spawn(async move {
                let _permit = semaphore.acquire_owned().await.expect("dispatcher semaphore never closes");
                if cancellation.is_cancelled() {
                    return (id, None, true);
                }
                match work(id.clone()).await {
                    Ok(()) => (id, None, false),
                    Err(err) => (id, Some(err), false),
                }
            });
        }

        let mut errors = Vec::new();
        while let Some(outcome) = set.join_next().await {
            match outcome {
                Ok((_, None, was_cancelled)) => cancelled |= was_cancelled,
                Ok((id, Some(err), _)) => errors.push((id, err)),
                Err(join_error) => {
                    tracing::warn!(error = %join_error, "dispatcher worker task panicked");
                }
            }
        }

        DispatchOutcome { errors, cancelled }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn all_items_complete_even_when_some_fail() {
        let dispatcher = Dispatcher::new(2);
        let ids = vec!["a".to_owned(), "b".to_owned(), "c".to_owned()];

        let outcome = dispatcher
            .run(ids, CancellationToken::new(), |id| async move {
                if id == "b" {
                    Err("boom".to_owned())
                } else {
                    Ok(())
                }
            })
            .await;

        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].0, "b");
        assert!(!outcome.cancelled);
    }

    #[tokio::test]
    async fn concurrency_bound_limits_in_flight_work() {
        let dispatcher = Dispatcher::new(2);
        let ids: Vec<String> = (0..8).map(|i| i.to_string()).collect();
        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_observed = Arc::new(AtomicUsize::new(0));

        let in_flight_clone = Arc::clone(&in_flight);
        let max_observed_clone = Arc::clone(&max_observed);
        let outcome: DispatchOutcome<std::convert::Infallible> = dispatcher
            .run(ids, CancellationToken::new(), move |_id| {
                let in_flight = Arc::clone(&in_flight_clone);
                let max_observed = Arc::clone(&max_observed_clone);
                async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    max_observed.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    Ok(())
                }
            })
            .await;

        assert!(outcome.is_success());
        assert!(max_observed.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn cancellation_stops_new_dispatch() {
        let dispatcher = Dispatcher::new(1);
        let cancellation = CancellationToken::new();
        cancellation.cancel();
        let ids = vec!["a".to_owned(), "b".to_owned()];

        let outcome: DispatchOutcome<std::convert::Infallible> = dispatcher
            .run(ids, cancellation, |_id| async move { Ok(()) })
            .await;

        assert!(outcome.cancelled);
    }
}
