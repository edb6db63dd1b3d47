//! Per-failure exponential backoff with jitter.

use std::time::Duration;

use rand::Rng;

use crate::config::WorkQueueSettings;

/// Delay before retry number `failures` (1-based).
///
/// `base * 2^(failures - 1)` capped at `max`, plus up to 10% jitter.
/// Zero failures means no delay.
pub fn retry_delay(failures: u32, queue: &WorkQueueSettings) -> Duration {
    if failures == 0 {
        return Duration::ZERO;
    }

    let base_ms = queue.rate_limiter_base_ms;
    let max_ms = queue.rate_limiter_max_ms;

    let factor = 2u64.saturating_pow(failures - 1);
    let capped = base_ms.saturating_mul(factor).min(max_ms);

    let jitter_range = capped / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped + jitter)
}
