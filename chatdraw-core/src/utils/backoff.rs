use std::time::Duration;

/// Highest exponent used for reconnect delays (2^6 = 64 seconds).
pub const MAX_BACKOFF_EXPONENT: u32 = 6;

/// Delay before reconnect attempt number `attempt` (zero-based).
///
/// Uses exponential backoff: 2^attempt seconds, capped.
pub fn reconnect_delay(attempt: u32) -> Duration {
    Duration::from_secs(2u64.pow(attempt.min(MAX_BACKOFF_EXPONENT)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconnect_delay_calculation() {
        assert_eq!(reconnect_delay(0), Duration::from_secs(1));
        assert_eq!(reconnect_delay(1), Duration::from_secs(2));
        assert_eq!(reconnect_delay(5), Duration::from_secs(32));
        assert_eq!(reconnect_delay(6), Duration::from_secs(64));
        // Max capped at 6
        assert_eq!(reconnect_delay(7), Duration::from_secs(64));
        assert_eq!(reconnect_delay(u32::MAX), Duration::from_secs(64));
    }
}
