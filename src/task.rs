use crate::settled::{Rejection, Settled};

use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};

use futures::FutureExt;
use tracing::error;

/// Invokes the caller's operation for one item, turning a panic raised while
/// building the future into a rejection.
pub(crate) fn invoke<'a, T, R, E, F, Fut>(operation: &mut F, item: &'a T, items: &'a [T]) -> Result<Fut, Settled<R, E>>
where
  F: FnMut(&'a T, &'a [T]) -> Fut,
{
  panic::catch_unwind(AssertUnwindSafe(|| operation(item, items))).map_err(|payload| {
    let message = panic_message(payload.as_ref());
    error!(%message, "Operation panicked while being invoked.");
    Settled::Rejected(Rejection::Panicked(message))
  })
}

/// Drives one operation to settlement and tags the outcome with its item's index.
pub(crate) async fn settle<R, E, Fut>(index: usize, future: Fut) -> (usize, Settled<R, E>)
where
  Fut: Future<Output = Result<R, E>>,
{
  let outcome = match AssertUnwindSafe(future).catch_unwind().await {
    Ok(result) => Settled::from(result),
    Err(payload) => {
      let message = panic_message(payload.as_ref());
      error!(index, %message, "Operation panicked during execution.");
      Settled::Rejected(Rejection::Panicked(message))
    }
  };
  (index, outcome)
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
  if let Some(message) = payload.downcast_ref::<&str>() {
    (*message).to_string()
  } else if let Some(message) = payload.downcast_ref::<String>() {
    message.clone()
  } else {
    "non-string panic payload".to_string()
  }
}
