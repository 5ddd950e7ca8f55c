//! Poll interval selection and change debouncing shared by the scanner.

use std::time::Duration;

use tokio::time::Instant;

/// Timing configuration for the status scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Period of the clock tick driving the scanner. Not every tick
    /// issues a query.
    pub base_tick: Duration,
    /// Minimum spacing between queries while the system is in flux.
    pub unstable_interval: Duration,
    /// Minimum spacing between queries once a query has succeeded.
    pub stable_interval: Duration,
    /// A query still pending after this long counts as failed.
    pub query_timeout: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            base_tick: Duration::from_millis(500),
            unstable_interval: Duration::from_millis(1000),
            stable_interval: Duration::from_millis(3000),
            query_timeout: Duration::from_millis(3000),
        }
    }
}

impl ScanConfig {
    /// Two-level backoff: poll aggressively while unstable, relax after
    /// one successful query.
    pub fn effective_interval(&self, unstable: bool) -> Duration {
        if unstable {
            self.unstable_interval
        } else {
            self.stable_interval
        }
    }

    /// Returns `true` when a query should be issued at `now`.
    pub fn is_due(&self, last_issued: Option<Instant>, now: Instant, unstable: bool) -> bool {
        match last_issued {
            None => true,
            Some(at) => now.saturating_duration_since(at) >= self.effective_interval(unstable),
        }
    }
}

/// A value that reports changes only when it actually differs.
#[derive(Debug, Clone)]
pub struct Debounced<T> {
    value: T,
}

impl<T: Copy + PartialEq> Debounced<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }

    pub fn get(&self) -> T {
        self.value
    }

    /// Offers a candidate value. Returns `Some((new, old))` if it replaced
    /// a different value, `None` if it was equal.
    pub fn set(&mut self, candidate: T) -> Option<(T, T)> {
        if candidate == self.value {
            return None;
        }
        let old = std::mem::replace(&mut self.value, candidate);
        Some((candidate, old))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_config_defaults() {
        let config = ScanConfig::default();
        assert_eq!(config.base_tick, Duration::from_millis(500));
        assert_eq!(config.unstable_interval, Duration::from_millis(1000));
        assert_eq!(config.stable_interval, Duration::from_millis(3000));
    }

    #[test]
    fn effective_interval_depends_on_stability() {
        let config = ScanConfig::default();
        assert_eq!(config.effective_interval(true), Duration::from_millis(1000));
        assert_eq!(config.effective_interval(false), Duration::from_millis(3000));
    }

    #[test]
    fn first_query_is_always_due() {
        let config = ScanConfig::default();
        assert!(config.is_due(None, Instant::now(), false));
    }

    #[test]
    fn due_only_after_interval_elapsed() {
        let config = ScanConfig::default();
        let t0 = Instant::now();

        assert!(!config.is_due(Some(t0), t0 + Duration::from_millis(500), true));
        assert!(config.is_due(Some(t0), t0 + Duration::from_millis(1000), true));

        assert!(!config.is_due(Some(t0), t0 + Duration::from_millis(2500), false));
        assert!(config.is_due(Some(t0), t0 + Duration::from_millis(3000), false));
    }

    #[test]
    fn debounced_reports_only_changes() {
        let mut value = Debounced::new(1);
        assert_eq!(value.set(1), None);
        assert_eq!(value.set(2), Some((2, 1)));
        assert_eq!(value.get(), 2);
        assert_eq!(value.set(2), None);
    }
}
