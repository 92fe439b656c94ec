use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::time::sleep;

/// Retries `operation` up to `max_retries` extra times with doubling delays.
/// Used around store writes that can hit SQLite busy contention when several
/// component processes share the database file.
pub async fn retry_with_backoff<F, T, E>(
    mut operation: F,
    max_retries: usize,
    initial_delay: Duration,
) -> Result<T, E>
where
    F: FnMut() -> Pin<Box<dyn Future<Output = Result<T, E>> + Send>>,
    E: std::fmt::Display,
{
    let mut delay = initial_delay;
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                if attempt >= max_retries {
                    return Err(e);
                }
                attempt += 1;
                tracing::warn!(
                    "Write attempt {}/{} failed: {}. Retrying in {:?}",
                    attempt,
                    max_retries,
                    e,
                    delay
                );
                sleep(delay).await;
                delay *= 2;
            }
        }
    }
}
