//! # Lifecycle events emitted by the service controller.
//!
//! The [`EventKind`] enum classifies events in three groups:
//! - **Registration**: a service was created, failed to initialize, or was stopped
//! - **Scheduling**: a run failed, a restart was requested or failed
//! - **Shutdown**: the run loop observed cancellation and finished teardown
//!
//! The [`Event`] struct carries the service name, its variant label and an
//! optional reason string.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use svcvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::RunFailed)
//!     .with_service("poller")
//!     .with_reason("boom");
//!
//! assert_eq!(ev.kind, EventKind::RunFailed);
//! assert_eq!(ev.service.as_deref(), Some("poller"));
//! assert_eq!(ev.reason.as_deref(), Some("boom"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Registration ===
    /// Service was registered and `init` succeeded (state is `Ready`).
    ///
    /// Sets: `service`, `kind_label`
    ServiceCreated,

    /// Service was registered but `init` failed (state is `Failed`).
    ///
    /// Sets: `service`, `kind_label`, `reason`
    ServiceFailed,

    /// Service `stop` succeeded and the entry left the registry.
    ///
    /// Sets: `service`, `kind_label`
    ServiceStopped,

    /// Service `stop` failed; the entry is still registered.
    ///
    /// Sets: `service`, `kind_label`, `reason`
    StopFailed,

    // === Scheduling ===
    /// One `run` call returned an error or panicked (state is `Failed`).
    ///
    /// Sets: `service`, `kind_label`, `reason`
    RunFailed,

    /// The cooldown elapsed and the run loop is rebuilding a failed service.
    ///
    /// Sets: `service`, `kind_label`
    RestartRequested,

    /// Rebuilding a failed service returned an error.
    ///
    /// Sets: `service`, `kind_label`, `reason`
    RestartFailed,

    // === Shutdown ===
    /// The run loop observed cancellation and is draining in-flight work.
    ShutdownRequested,

    /// Every registered service has been killed; the run loop is returning.
    AllStopped,
}

/// Lifecycle event with optional metadata.
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the service, if applicable.
    pub service: Option<Arc<str>>,
    /// Variant label of the service (`"DefaultService"`, `"ScheduledService"`, ...).
    pub kind_label: Option<&'static str>,
    /// Human-readable reason (error messages).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            service: None,
            kind_label: None,
            reason: None,
        }
    }

    /// Attaches a service name.
    #[inline]
    pub fn with_service(mut self, name: impl Into<Arc<str>>) -> Self {
        self.service = Some(name.into());
        self
    }

    /// Attaches the service variant label.
    #[inline]
    pub fn with_kind_label(mut self, label: &'static str) -> Self {
        self.kind_label = Some(label);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Returns true for events that describe a failure.
    #[inline]
    pub fn is_failure(&self) -> bool {
        matches!(
            self.kind,
            EventKind::ServiceFailed
                | EventKind::StopFailed
                | EventKind::RunFailed
                | EventKind::RestartFailed
        )
    }
}
