use crate::error::PoolError;

use tokio::runtime::Handle as TokioHandle;

const DEFAULT_POOL_NAME: &str = "async_pool";

/// What to do with a concurrency limit of zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LimitPolicy {
  /// Refuse to build the pool with [`PoolError::InvalidLimit`].
  #[default]
  Reject,
  /// Treat a zero limit as a limit of one.
  Clamp,
}

/// Settings for a [`PoolRunner`](crate::PoolRunner).
#[derive(Debug, Clone)]
pub struct PoolConfig {
  pub(crate) limit: usize,
  pub(crate) name: String,
  pub(crate) limit_policy: LimitPolicy,
  pub(crate) tokio_handle: Option<TokioHandle>,
}

impl PoolConfig {
  pub fn new(limit: usize) -> Self {
    Self {
      limit,
      name: DEFAULT_POOL_NAME.to_string(),
      limit_policy: LimitPolicy::default(),
      tokio_handle: None,
    }
  }

  /// Name used to label the pool's log events.
  pub fn name(mut self, name: impl Into<String>) -> Self {
    self.name = name.into();
    self
  }

  pub fn limit_policy(mut self, policy: LimitPolicy) -> Self {
    self.limit_policy = policy;
    self
  }

  /// Runtime that [`PoolRunner::run_spawned`](crate::PoolRunner::run_spawned) spawns onto.
  /// Without one, the runtime current at run time is used.
  pub fn tokio_handle(mut self, handle: TokioHandle) -> Self {
    self.tokio_handle = Some(handle);
    self
  }

  /// Returns the limit the pool will actually enforce.
  pub(crate) fn effective_limit(&self) -> Result<usize, PoolError> {
    match (self.limit, self.limit_policy) {
      (0, LimitPolicy::Reject) => Err(PoolError::InvalidLimit(0)),
      (limit, _) => Ok(limit.max(1)),
    }
  }
}
