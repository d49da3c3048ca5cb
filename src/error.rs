use thiserror::Error;

/// Errors raised by the pool itself.
///
/// These only ever signal misuse of the pool or a broken runtime. A failing
/// operation is never reported here; it is recorded in that item's
/// [`Settled`](crate::Settled) slot instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
  #[error("Concurrency limit must be at least 1, got {0}")]
  InvalidLimit(usize),

  #[error("No Tokio runtime available to spawn pool operations onto")]
  NoRuntime,
}
