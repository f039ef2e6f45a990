//! Retry backoff computation.

use std::time::Duration;

use rand::Rng;

use remindd_config::DispatcherSettings;

/// Delay before retrying a job that has failed `attempt` times.
///
/// Capped exponential with equal jitter: the base delay doubles per
/// attempt up to the cap, then the actual delay is drawn from the upper
/// half of that window so concurrent retries spread out.
pub fn backoff_delay(settings: &DispatcherSettings, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(16);
    let raw = settings.retry_base_secs.saturating_mul(1_u64 << exponent);
    let capped = raw.min(settings.retry_max_secs).max(1);

    let half = capped / 2;
    let jitter = rand::thread_rng().gen_range(0..=capped - half);
    Duration::from_secs(half + jitter)
}

/// Pause after `consecutive` failed poll cycles (store or queue down).
pub fn degraded_pause(consecutive: u32) -> Duration {
    Duration::from_secs((1_u64 << consecutive.min(6)).min(60))
}
