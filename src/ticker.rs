use std::time::Duration;

/// Polling interval in milliseconds. The countdown itself only advances on
/// whole-second boundaries; this just bounds display latency.
pub const DEFAULT_TICK_MS: u64 = 100;

/// Get tick duration
pub fn tick_duration() -> Duration {
    Duration::from_millis(DEFAULT_TICK_MS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_duration_is_sub_second() {
        let duration = tick_duration();
        assert_eq!(duration, Duration::from_millis(100));
        assert!(duration < Duration::from_secs(1));
    }
}
