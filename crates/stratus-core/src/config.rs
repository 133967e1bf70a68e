//! Timing parameters for a wait

use std::time::Duration;

/// Default gap between probes
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default ceiling for the backed-off gap
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Default overall deadline when a catalog entry does not set its own
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Timing knobs of an [`AsyncActionHandler`](crate::AsyncActionHandler)
///
/// A `backoff_factor` of 1.0 keeps a fixed interval. Factors below 1.0 or
/// non-finite factors are treated as 1.0. A zero `timeout` means "probe once".
#[derive(Debug, Clone, PartialEq)]
pub struct WaiterConfig {
    /// Sleep before the first probe
    pub initial_delay: Duration,
    /// Target gap between the start of consecutive probes
    pub poll_interval: Duration,
    /// Ceiling for the interval once backoff kicks in
    pub max_backoff: Duration,
    pub backoff_factor: f64,
    /// Overall deadline measured from the start of the wait
    pub timeout: Duration,
    /// Minimum gap between probes, however fast a probe returns
    pub throttle: Duration,
}

impl Default for WaiterConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::ZERO,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_backoff: DEFAULT_MAX_BACKOFF,
            backoff_factor: 1.0,
            timeout: DEFAULT_TIMEOUT,
            throttle: Duration::ZERO,
        }
    }
}

impl WaiterConfig {
    /// Interval to use after `current` has been slept
    ///
    /// The interval never shrinks below `poll_interval`, so a `max_backoff`
    /// smaller than the poll interval leaves the interval fixed.
    #[must_use]
    pub fn next_interval(&self, current: Duration) -> Duration {
        let factor = if self.backoff_factor.is_finite() && self.backoff_factor >= 1.0 {
            self.backoff_factor
        } else {
            1.0
        };
        let scaled = Duration::try_from_secs_f64(current.as_secs_f64() * factor)
            .unwrap_or(Duration::MAX);
        scaled.min(self.max_backoff.max(self.poll_interval))
    }
}
