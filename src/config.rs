//! # Controller runtime configuration.
//!
//! Provides [`ControllerConfig`], the tuning knobs of the scheduling loop.
//!
//! ## Sentinel values
//! - `max_concurrent = 0` → unlimited (no semaphore created)
//! - `bus_capacity` is clamped to a minimum of 1

use std::time::Duration;

/// Configuration for a [`ServiceController`](crate::ServiceController).
///
/// ## Field semantics
/// - `tick`: period of the scheduling timer
/// - `restart_cooldown`: minimum time since the last (re)creation before a
///   failed service is restarted again
/// - `max_concurrent`: cap on concurrently dispatched units (`0` = unlimited)
/// - `bus_capacity`: lifecycle event ring buffer size (min 1)
#[derive(Clone, Debug)]
pub struct ControllerConfig {
    /// Period of the scheduling timer.
    ///
    /// Every tick the controller lists all services and dispatches the ones
    /// that are `Ready` or eligible for restart.
    pub tick: Duration,

    /// Minimum elapsed time after a restart before another restart of the
    /// same service is attempted.
    pub restart_cooldown: Duration,

    /// Maximum number of dispatched units (runs and restarts) executing at once.
    ///
    /// - `0` = unlimited (every ready service runs every tick it is ready)
    /// - `n > 0` = at most `n` units hold a permit simultaneously
    pub max_concurrent: usize,

    /// Capacity of the lifecycle event broadcast channel.
    ///
    /// Receivers that lag behind more than `bus_capacity` events observe
    /// `Lagged` and skip older items.
    pub bus_capacity: usize,
}

impl ControllerConfig {
    /// Returns the concurrency limit as an `Option`.
    ///
    /// - `None` → unlimited (no semaphore)
    /// - `Some(n)` → at most `n` concurrent units
    #[inline]
    pub fn concurrency_limit(&self) -> Option<usize> {
        if self.max_concurrent == 0 {
            None
        } else {
            Some(self.max_concurrent)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns a tick period that tokio's interval accepts (non-zero).
    #[inline]
    pub fn tick_clamped(&self) -> Duration {
        self.tick.max(Duration::from_millis(1))
    }
}

impl Default for ControllerConfig {
    /// Default configuration:
    ///
    /// - `tick = 30ms`
    /// - `restart_cooldown = 5s`
    /// - `max_concurrent = 0` (unlimited)
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(30),
            restart_cooldown: Duration::from_secs(5),
            max_concurrent: 0,
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = ControllerConfig::default();
        assert_eq!(cfg.tick, Duration::from_millis(30));
        assert_eq!(cfg.restart_cooldown, Duration::from_secs(5));
        assert_eq!(cfg.concurrency_limit(), None);
    }

    #[test]
    fn test_sentinels() {
        let cfg = ControllerConfig {
            tick: Duration::ZERO,
            max_concurrent: 4,
            bus_capacity: 0,
            ..ControllerConfig::default()
        };
        assert_eq!(cfg.concurrency_limit(), Some(4));
        assert_eq!(cfg.bus_capacity_clamped(), 1);
        assert_eq!(cfg.tick_clamped(), Duration::from_millis(1));
    }
}
