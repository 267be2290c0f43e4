//! # Service state and its atomic cell.
//!
//! ```text
//! Undefined ──init ok──► Ready ──dispatch──► Busy ──run ok──► Ready
//!                          │                   │
//!                          └────init/run err───┴──► Failed ──restart ok──► Ready
//! ```
//!
//! The Ready→Busy edge is a single compare-and-swap, so two overlapping ticks
//! can never both dispatch the same instance.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Schedulability of a service.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ServiceState {
    /// Bound but not yet initialized successfully.
    Undefined = 1,
    /// Eligible to run on the next tick.
    Ready = 2,
    /// A `run` call is in flight.
    Busy = 3,
    /// `init` or `run` failed; waiting for a restart.
    Failed = 4,
}

impl ServiceState {
    /// Returns a short stable label (lowercase) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ServiceState::Undefined => "undefined",
            ServiceState::Ready => "ready",
            ServiceState::Busy => "busy",
            ServiceState::Failed => "failed",
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            2 => ServiceState::Ready,
            3 => ServiceState::Busy,
            4 => ServiceState::Failed,
            _ => ServiceState::Undefined,
        }
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ServiceState::Undefined => "Undefined",
            ServiceState::Ready => "Ready",
            ServiceState::Busy => "Busy",
            ServiceState::Failed => "Failed",
        };
        f.write_str(s)
    }
}

/// Lock-free holder of a [`ServiceState`].
#[derive(Debug)]
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    pub(crate) fn new() -> Self {
        Self(AtomicU8::new(ServiceState::Undefined as u8))
    }

    pub(crate) fn load(&self) -> ServiceState {
        ServiceState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub(crate) fn store(&self, state: ServiceState) {
        self.0.store(state as u8, Ordering::Release);
    }

    /// Swaps `from` for `to`; returns false if the current state is not `from`.
    pub(crate) fn transition(&self, from: ServiceState, to: ServiceState) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_undefined() {
        assert_eq!(StateCell::new().load(), ServiceState::Undefined);
    }

    #[test]
    fn test_transition_only_from_expected_state() {
        let cell = StateCell::new();
        assert!(!cell.transition(ServiceState::Ready, ServiceState::Busy));

        cell.store(ServiceState::Ready);
        assert!(cell.transition(ServiceState::Ready, ServiceState::Busy));
        assert!(!cell.transition(ServiceState::Ready, ServiceState::Busy));
        assert_eq!(cell.load(), ServiceState::Busy);
    }

    #[test]
    fn test_display_and_label() {
        assert_eq!(ServiceState::Failed.to_string(), "Failed");
        assert_eq!(ServiceState::Busy.as_label(), "busy");
    }
}
