use async_pool::{async_pool, Settled};
use std::time::Duration;
use tracing::info;

async fn fetch_length(id: usize, word: &str, delay_ms: u64) -> Result<usize, String> {
  info!("Item {} ({}) starting, will sleep for {}ms", id, word, delay_ms);
  tokio::time::sleep(Duration::from_millis(delay_ms)).await;
  if word.is_empty() {
    return Err(format!("item {} is empty", id));
  }
  Ok(word.len())
}

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt()
    .with_max_level(tracing::Level::DEBUG)
    .with_target(false) // Disable module paths for cleaner example output
    .init();

  info!("--- Basic Usage Example ---");

  let words = vec!["tokio", "futures", "", "tracing", "pool"];

  let results = async_pool(2, &words, |word, all| {
    let id = all.iter().position(|w| std::ptr::eq(w, word)).unwrap_or_default();
    // Alternate sleep times for variety
    let delay_ms = 200 + (id as u64 % 3 * 150);
    fetch_length(id, word, delay_ms)
  })
  .await
  .expect("limit is non-zero");

  for (word, settled) in words.iter().zip(&results) {
    match settled {
      Settled::Fulfilled(len) => info!("{:?}: {} -> {}", word, settled.status(), len),
      Settled::Rejected(reason) => info!("{:?}: {} -> {}", word, settled.status(), reason),
    }
  }

  info!("--- Basic Usage Example End ---");
}
