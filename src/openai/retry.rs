//! Capped retry for transient remote failures.

use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Run `op` up to `max_attempts` times (at least once).
///
/// Only errors for which `is_transient` returns true are retried; anything else is
/// returned immediately. The wait before attempt `n + 1` is `backoff * n`.
pub async fn with_retry<T, E, F, Fut, P>(
    label: &str,
    max_attempts: u32,
    backoff: Duration,
    is_transient: P,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(v) => return Ok(v),
            Err(e) if attempt < max_attempts && is_transient(&e) => {
                warn!(
                    target: "openai",
                    call = label,
                    attempt,
                    error = %e,
                    "transient failure, retrying"
                );
                tokio::time::sleep(backoff * attempt).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
