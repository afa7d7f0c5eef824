use rand::Rng;
use std::time::Duration;

/// Adds up to `jitter_percent` of random extra wait on top of `base_ms`.
pub fn jitter_wait(base_ms: u64, jitter_percent: u32) -> u64 {
    let jitter_range = if jitter_percent == 0 {
        1
    } else {
        std::cmp::max(1, (base_ms.saturating_mul(u64::from(jitter_percent))) / 100)
    };
    let mut rng = rand::rng();
    base_ms.saturating_add(rng.random_range(0..jitter_range))
}

/// Exponential delay before retry `attempt` (1-based), with 10% jitter.
pub fn retry_delay(base: Duration, attempt: u32) -> Duration {
    let factor = 1u64 << attempt.saturating_sub(1).min(16);
    let base_ms = u64::try_from(base.as_millis()).unwrap_or(u64::MAX);
    Duration::from_millis(jitter_wait(base_ms.saturating_mul(factor), 10))
}
