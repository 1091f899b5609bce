use std::time::Duration;

/// Configures per-attempt timeout and retry behavior.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientOptions {
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,
    /// Base retry backoff in milliseconds (exponential strategy).
    pub retry_backoff_ms: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            max_attempts: 3,
            retry_backoff_ms: 1_000,
        }
    }
}

impl ClientOptions {
    pub(crate) fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Delay to wait after the failed `attempt` (1-based) before the next one.
///
/// `base * 2^(attempt - 1)`, so with a 1000 ms base: 1s, 2s, 4s.
pub fn backoff_delay(base_ms: u64, attempt: u32) -> Duration {
    let exp = attempt.saturating_sub(1).min(16);
    let multiplier = 1u64 << exp;
    Duration::from_millis(base_ms.saturating_mul(multiplier))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{backoff_delay, ClientOptions};

    #[test]
    fn defaults_match_webhook_budget() {
        let opts = ClientOptions::default();
        assert_eq!(opts.timeout_ms, 30_000);
        assert_eq!(opts.max_attempts, 3);
        assert_eq!(opts.retry_backoff_ms, 1_000);
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        assert_eq!(backoff_delay(1_000, 1), Duration::from_millis(1_000));
        assert_eq!(backoff_delay(1_000, 2), Duration::from_millis(2_000));
        assert_eq!(backoff_delay(1_000, 3), Duration::from_millis(4_000));
    }

    #[test]
    fn backoff_saturates_instead_of_overflowing() {
        assert_eq!(backoff_delay(u64::MAX, 5), Duration::from_millis(u64::MAX));
        assert_eq!(backoff_delay(1, 100), Duration::from_millis(1 << 16));
    }
}
