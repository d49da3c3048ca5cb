use std::fmt;

use thiserror::Error;

/// The two ways an item can settle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettleStatus {
  Fulfilled,
  Rejected,
}

impl fmt::Display for SettleStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SettleStatus::Fulfilled => f.write_str("fulfilled"),
      SettleStatus::Rejected => f.write_str("rejected"),
    }
  }
}

/// Why an item was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection<E> {
  /// The operation returned an error.
  #[error("{0}")]
  Failed(E),

  /// The operation panicked, either while being invoked or while being polled.
  #[error("Operation panicked: {0}")]
  Panicked(String),

  /// The spawned operation was aborted by its runtime before it settled.
  #[error("Operation was cancelled before it settled")]
  Cancelled,
}

impl<E> Rejection<E> {
  /// Returns the operation's own error, if that is what caused the rejection.
  pub fn error(&self) -> Option<&E> {
    match self {
      Rejection::Failed(error) => Some(error),
      _ => None,
    }
  }
}

/// The outcome recorded for one item of a pool run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settled<R, E> {
  Fulfilled(R),
  Rejected(Rejection<E>),
}

impl<R, E> Settled<R, E> {
  pub fn status(&self) -> SettleStatus {
    SettleStatus::from(self)
  }

  pub fn is_fulfilled(&self) -> bool {
    matches!(self, Settled::Fulfilled(_))
  }

  pub fn is_rejected(&self) -> bool {
    matches!(self, Settled::Rejected(_))
  }

  pub fn value(&self) -> Option<&R> {
    match self {
      Settled::Fulfilled(value) => Some(value),
      Settled::Rejected(_) => None,
    }
  }

  pub fn reason(&self) -> Option<&Rejection<E>> {
    match self {
      Settled::Fulfilled(_) => None,
      Settled::Rejected(reason) => Some(reason),
    }
  }

  pub fn into_result(self) -> Result<R, Rejection<E>> {
    match self {
      Settled::Fulfilled(value) => Ok(value),
      Settled::Rejected(reason) => Err(reason),
    }
  }
}

impl<R, E> From<&Settled<R, E>> for SettleStatus {
  fn from(settled: &Settled<R, E>) -> Self {
    match settled {
      Settled::Fulfilled(_) => SettleStatus::Fulfilled,
      Settled::Rejected(_) => SettleStatus::Rejected,
    }
  }
}

impl<R, E> From<Result<R, E>> for Settled<R, E> {
  fn from(result: Result<R, E>) -> Self {
    match result {
      Ok(value) => Settled::Fulfilled(value),
      Err(error) => Settled::Rejected(Rejection::Failed(error)),
    }
  }
}
