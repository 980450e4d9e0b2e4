//! Exponential backoff without jitter.

use std::time::Duration;

/// Delay to wait after failed attempt `retry` (zero-indexed) before the next one.
///
/// `base * 2^retry`, saturating, clamped to `max` when a cap is configured.
pub fn calculate_backoff(retry: u32, base: Duration, max: Option<Duration>) -> Duration {
    let factor = 2u32.checked_pow(retry).unwrap_or(u32::MAX);
    let delay = base.saturating_mul(factor);

    match max {
        Some(cap) => delay.min(cap),
        None => delay,
    }
}

/// The full delay schedule for a retry budget.
pub fn schedule(max_retries: u32, base: Duration, max: Option<Duration>) -> Vec<Duration> {
    (0..max_retries)
        .map(|retry| calculate_backoff(retry, base, max))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_calculation() {
        let base = Duration::from_millis(1000);
        assert_eq!(calculate_backoff(0, base, None), Duration::from_millis(1000));
        assert_eq!(calculate_backoff(1, base, None), Duration::from_millis(2000));
        assert_eq!(calculate_backoff(2, base, None), Duration::from_millis(4000));
    }

    #[test]
    fn test_default_schedule() {
        let delays = schedule(3, Duration::from_secs(1), Some(Duration::from_secs(30)));
        assert_eq!(
            delays,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4)
            ]
        );
    }

    #[test]
    fn test_cap_applies() {
        let cap = Some(Duration::from_secs(30));
        assert_eq!(
            calculate_backoff(10, Duration::from_secs(1), cap),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn test_uncapped_growth_saturates() {
        let delay = calculate_backoff(64, Duration::from_secs(1), None);
        assert!(delay >= Duration::from_secs(u32::MAX as u64));
    }
}
