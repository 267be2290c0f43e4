//! # Shared per-service fields.
//!
//! [`ServiceCore`] holds everything the controller reads and writes on a
//! service: state, bound config and log sink, and the two timestamps. Each
//! field is synchronized on its own, so touching one service never locks the
//! registry or the other fields.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tokio::time::Instant;

use crate::log::LogSink;
use crate::services::config::ServiceConfig;
use crate::services::state::{ServiceState, StateCell};

/// Config and log sink bound by `init`.
#[derive(Debug, Clone)]
struct Binding {
    config: Arc<ServiceConfig>,
    log: LogSink,
}

/// State, binding and timestamps embedded by every service variant.
#[derive(Debug)]
pub struct ServiceCore {
    state: StateCell,
    binding: RwLock<Option<Binding>>,
    last_run: RwLock<Option<Instant>>,
    last_restart: RwLock<Option<Instant>>,
}

impl ServiceCore {
    /// Creates an unbound core in `Undefined` state.
    pub fn new() -> Self {
        Self {
            state: StateCell::new(),
            binding: RwLock::new(None),
            last_run: RwLock::new(None),
            last_restart: RwLock::new(None),
        }
    }

    /// Binds `config` and `log` and resets the state to `Undefined`.
    ///
    /// Rebinding an already bound core is allowed.
    pub fn bind(&self, log: LogSink, config: Arc<ServiceConfig>) {
        *self.binding.write().unwrap_or_else(PoisonError::into_inner) = Some(Binding { config, log });
        self.set_state(ServiceState::Undefined);
    }

    /// Bound name, or an empty string before `init`.
    pub fn name(&self) -> String {
        self.with_binding(|b| b.config.name().to_string())
            .unwrap_or_default()
    }

    /// Bound config, or `None` before `init`.
    pub fn config(&self) -> Option<Arc<ServiceConfig>> {
        self.with_binding(|b| Arc::clone(&b.config))
    }

    /// Bound log sink, or an unscoped one before `init`.
    pub fn log(&self) -> LogSink {
        self.with_binding(|b| b.log.clone()).unwrap_or_default()
    }

    pub fn state(&self) -> ServiceState {
        self.state.load()
    }

    pub fn set_state(&self, state: ServiceState) {
        if state == ServiceState::Failed {
            self.log().info(format_args!("setting state {state}"));
        }
        self.state.store(state);
    }

    /// Atomically moves `Ready` to `Busy`; false if the service was not `Ready`.
    pub(crate) fn begin_run(&self) -> bool {
        self.state.transition(ServiceState::Ready, ServiceState::Busy)
    }

    pub fn last_run(&self) -> Option<Instant> {
        *self.last_run.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_last_run(&self, when: Instant) {
        *self.last_run.write().unwrap_or_else(PoisonError::into_inner) = Some(when);
    }

    pub fn last_restart(&self) -> Option<Instant> {
        *self.last_restart.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_last_restart(&self, when: Instant) {
        *self.last_restart.write().unwrap_or_else(PoisonError::into_inner) = Some(when);
    }

    /// Re-stamps `last_restart` if at least `cooldown` passed since the previous stamp.
    ///
    /// Check and stamp happen under one write lock, so of several concurrent
    /// callers only one wins per cooldown window.
    pub(crate) fn claim_restart(&self, cooldown: Duration, now: Instant) -> bool {
        let mut last = self.last_restart.write().unwrap_or_else(PoisonError::into_inner);
        match *last {
            Some(at) if now.saturating_duration_since(at) < cooldown => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }

    fn with_binding<T>(&self, f: impl FnOnce(&Binding) -> T) -> Option<T> {
        self.binding
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(f)
    }
}

impl Default for ServiceCore {
    fn default() -> Self {
        Self::new()
    }
}
