use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::{error, warn};

use crate::config::RetrySettings;
use crate::error::Result;

/// Upper bound of the random extra wait, as a fraction of the current delay.
const MAX_JITTER: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            initial_delay: Duration::from_millis(settings.initial_delay_ms),
        }
    }
}

fn with_jitter(delay: Duration) -> Duration {
    let factor = rand::thread_rng().gen_range(0.0..=MAX_JITTER);
    delay + delay.mul_f64(factor)
}

/// Runs `operation` until it succeeds, fails with a non-retryable error, or
/// `max_attempts` is used up. The delay doubles after every failed attempt.
pub async fn retry_with_backoff<T, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut delay = policy.initial_delay;
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_retryable() => {
                error!("Attempt {} failed with a fatal error: {}", attempt, e);
                return Err(e);
            }
            Err(e) => {
                if attempt >= policy.max_attempts {
                    error!("Max retries exceeded after {} attempts: {}", attempt, e);
                    return Err(e);
                }
                let wait = with_jitter(delay);
                warn!(
                    "Error occurred: {}. Retrying in {:?} (attempt {}/{})",
                    e,
                    wait,
                    attempt + 1,
                    policy.max_attempts
                );
                tokio::time::sleep(wait).await;
                delay *= 2;
                attempt += 1;
            }
        }
    }
}
