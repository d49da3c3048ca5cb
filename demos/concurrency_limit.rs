use async_pool::{PoolConfig, PoolRunner};
use std::convert::Infallible;
use std::time::{Duration, Instant};
use tracing::info;

async fn long_task_fn(id: usize) -> Result<String, Infallible> {
  info!("Task {} starting (concurrency test - should take 1s)", id);
  tokio::time::sleep(Duration::from_secs(1)).await;
  let result = format!("Task {} finished", id);
  info!("{}", result);
  Ok(result)
}

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt()
    .with_max_level(tracing::Level::DEBUG)
    .with_target(false)
    .init();

  info!("--- Concurrency Limit Example (Limit: 2) ---");

  let concurrency_limit = 2;
  let runner = PoolRunner::new(PoolConfig::new(concurrency_limit).name("concurrency_pool")).expect("limit is non-zero");

  let num_tasks = 5;
  info!(
    "Running {} tasks, each takes 1 sec. With concurrency {}, this should take ~{} secs.",
    num_tasks,
    concurrency_limit,
    (num_tasks as f32 / concurrency_limit as f32).ceil()
  );

  let started = Instant::now();
  let results = runner
    .run_spawned((0..num_tasks).collect::<Vec<usize>>(), |&id, _| long_task_fn(id))
    .await
    .expect("Pool run failed");

  for (id, settled) in results.into_iter().enumerate() {
    match settled.into_result() {
      Ok(result) => info!("Task {} main: Received result: {}", id, result),
      Err(e) => info!("Task {} main: Received error: {}", id, e),
    }
  }

  info!("All tasks processed in {:.2?}.", started.elapsed());
  info!("--- Concurrency Limit Example End ---");
}
