//! Run an async operation over a sequence of items with bounded concurrency.
//!
//! Every item's outcome is collected, in input order, as a [`Settled`]
//! value. A failing or panicking operation never aborts the run.

mod config;
mod error;
mod runner;
mod settled;
mod task;

pub use config::{LimitPolicy, PoolConfig};
pub use error::PoolError;
pub use runner::{async_pool, PoolRunner};
pub use settled::{Rejection, SettleStatus, Settled};
