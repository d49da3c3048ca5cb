use crate::config::PoolConfig;
use crate::error::PoolError;
use crate::settled::{Rejection, Settled};
use crate::task::{invoke, settle};

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::task::Poll;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::runtime::Handle as TokioHandle;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, info_span, trace, warn, Instrument};

lazy_static::lazy_static! {
  static ref NEXT_RUN_ID_COUNTER: AtomicU64 = AtomicU64::new(0);
}

/// Runs an operation over every item of a sequence with at most `limit`
/// operations in flight, and collects every item's outcome in input order.
///
/// A runner holds only its settings. Every call to [`run`](Self::run) or
/// [`run_spawned`](Self::run_spawned) owns its own in-flight set and result
/// slots, so one runner can serve any number of concurrent runs.
#[derive(Debug, Clone)]
pub struct PoolRunner {
  pool_name: Arc<str>,
  limit: usize,
  tokio_handle: Option<TokioHandle>,
}

impl PoolRunner {
  /// Builds a runner, rejecting an invalid limit before any item is started.
  pub fn new(config: PoolConfig) -> Result<Self, PoolError> {
    let limit = config.effective_limit()?;
    if limit != config.limit {
      warn!(pool_name = %config.name, requested = config.limit, limit, "Concurrency limit clamped.");
    }
    Ok(Self {
      pool_name: Arc::from(config.name),
      limit,
      tokio_handle: config.tokio_handle,
    })
  }

  pub fn name(&self) -> &str {
    &self.pool_name
  }

  pub fn limit(&self) -> usize {
    self.limit
  }

  /// Runs `operation` once per item, in input order, on the calling task.
  ///
  /// Each operation is polled once as soon as it is started; one that
  /// completes on that first poll settles without occupying an in-flight
  /// slot. Once `limit` operations are pending, no further item is started
  /// until one of them settles. The returned vector is index-aligned with
  /// `items` and only produced after every operation has settled.
  ///
  /// Errors and panics of individual operations are recorded in their
  /// slot and never abort the run.
  pub async fn run<'a, T, R, E, F, Fut>(&self, items: &'a [T], mut operation: F) -> Vec<Settled<R, E>>
  where
    F: FnMut(&'a T, &'a [T]) -> Fut,
    Fut: Future<Output = Result<R, E>> + 'a,
  {
    let span = self.run_span(items.len());

    async move {
      let mut slots = empty_slots(items.len());
      let mut in_flight = FuturesUnordered::new();

      for (index, item) in items.iter().enumerate() {
        trace!(index, "Starting operation.");
        let future = match invoke(&mut operation, item, items) {
          Ok(future) => future,
          Err(rejected) => {
            record(&mut slots, index, rejected);
            continue;
          }
        };

        let mut pending = Box::pin(settle(index, future));
        match futures::poll!(&mut pending) {
          Poll::Ready((index, outcome)) => record(&mut slots, index, outcome),
          Poll::Pending => in_flight.push(pending),
        }

        if in_flight.len() >= self.limit {
          debug!(in_flight = in_flight.len(), "In-flight limit reached, waiting for an operation to settle.");
          if let Some((index, outcome)) = in_flight.next().await {
            record(&mut slots, index, outcome);
          }
        }
      }

      trace!(in_flight = in_flight.len(), "All operations started, waiting for the rest to settle.");
      while let Some((index, outcome)) = in_flight.next().await {
        record(&mut slots, index, outcome);
      }

      collect_results(slots)
    }
    .instrument(span)
    .await
  }

  /// Like [`run`](Self::run), but spawns every operation onto a Tokio
  /// runtime so operations can execute in parallel.
  ///
  /// Each spawned operation holds one of `limit` semaphore permits until it
  /// settles; the next item is started only once a permit is free. The
  /// operation itself is still invoked on the calling task, in input order.
  pub async fn run_spawned<T, R, E, F, Fut>(&self, items: Vec<T>, mut operation: F) -> Result<Vec<Settled<R, E>>, PoolError>
  where
    F: FnMut(&T, &[T]) -> Fut,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
    R: Send + 'static,
    E: Send + 'static,
  {
    let tokio_handle = match &self.tokio_handle {
      Some(handle) => handle.clone(),
      None => TokioHandle::try_current().map_err(|_| PoolError::NoRuntime)?,
    };
    let span = self.run_span(items.len());

    let results = async move {
      // Tokio caps permits at MAX_PERMITS; more permits than items are never used.
      let permits = self.limit.min(items.len().max(1)).min(Semaphore::MAX_PERMITS);
      let semaphore = Arc::new(Semaphore::new(permits));
      let mut slots = empty_slots(items.len());
      let mut in_flight = JoinSet::new();

      for (index, item) in items.iter().enumerate() {
        if semaphore.available_permits() == 0 {
          debug!(in_flight = permits, "In-flight limit reached, waiting for an operation to settle.");
        }
        // The semaphore is local to this call and never closed.
        let Ok(permit) = semaphore.clone().acquire_owned().await else {
          break;
        };

        trace!(index, "Starting operation.");
        let future = match invoke(&mut operation, item, &items) {
          Ok(future) => future,
          Err(rejected) => {
            record(&mut slots, index, rejected);
            continue;
          }
        };

        in_flight.spawn_on(
          async move {
            let _permit_guard = permit;
            settle(index, future).await
          }
          .instrument(info_span!("pool_operation", index)),
          &tokio_handle,
        );
      }

      trace!(in_flight = in_flight.len(), "All operations started, waiting for the rest to settle.");
      while let Some(joined) = in_flight.join_next().await {
        match joined {
          Ok((index, outcome)) => record(&mut slots, index, outcome),
          // Panics are caught inside `settle`, so this is the runtime dropping the task.
          Err(join_error) => warn!("Spawned operation did not settle: {}", join_error),
        }
      }

      collect_results(slots)
    }
    .instrument(span)
    .await;

    Ok(results)
  }

  fn run_span(&self, item_count: usize) -> tracing::Span {
    let run_id = NEXT_RUN_ID_COUNTER.fetch_add(1, AtomicOrdering::Relaxed);
    info_span!(
      "async_pool_run",
      pool_name = %self.pool_name,
      run_id,
      limit = self.limit,
      items = item_count
    )
  }
}

/// Runs `operation` over `items` with at most `limit` operations in flight.
///
/// Shorthand for building a [`PoolRunner`] with [`PoolConfig::new`] and
/// calling [`PoolRunner::run`]. Fails only if `limit` is zero.
pub async fn async_pool<'a, T, R, E, F, Fut>(limit: usize, items: &'a [T], operation: F) -> Result<Vec<Settled<R, E>>, PoolError>
where
  F: FnMut(&'a T, &'a [T]) -> Fut,
  Fut: Future<Output = Result<R, E>> + 'a,
{
  let runner = PoolRunner::new(PoolConfig::new(limit))?;
  Ok(runner.run(items, operation).await)
}

fn empty_slots<R, E>(len: usize) -> Vec<Option<Settled<R, E>>> {
  (0..len).map(|_| None).collect()
}

fn record<R, E>(slots: &mut [Option<Settled<R, E>>], index: usize, outcome: Settled<R, E>) {
  trace!(index, status = %outcome.status(), "Operation settled.");
  debug_assert!(slots[index].is_none(), "slot {index} settled twice");
  slots[index] = Some(outcome);
}

fn collect_results<R, E>(slots: Vec<Option<Settled<R, E>>>) -> Vec<Settled<R, E>> {
  let results: Vec<Settled<R, E>> = slots
    .into_iter()
    .map(|slot| slot.unwrap_or_else(|| Settled::Rejected(Rejection::Cancelled)))
    .collect();

  let fulfilled = results.iter().filter(|settled| settled.is_fulfilled()).count();
  info!(fulfilled, rejected = results.len() - fulfilled, "Pool run finished.");
  results
}
