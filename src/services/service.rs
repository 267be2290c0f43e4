//! # Service abstraction.
//!
//! A [`Service`] is a named unit of recurring work. The controller drives it
//! through a fixed contract:
//!
//! | Call            | When                                      | Expected behavior                              |
//! |-----------------|-------------------------------------------|------------------------------------------------|
//! | `init`          | on registration and on every restart      | bind name/config/log, variant setup            |
//! | `run`           | every tick the service is `Ready`         | one bounded unit of work, safe to repeat       |
//! | `stop`          | before the instance leaves the registry   | release resources, call shutdown hooks         |
//! | `new_instance`  | on restart                                | fresh, uninitialized instance of same variant  |
//!
//! Variants embed a [`ServiceCore`] (directly or through
//! [`DefaultService`](crate::DefaultService)) and expose it via [`Service::core`];
//! all state and timestamp accessors are provided on top of it.
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use svcvisor::{LogSink, Service, ServiceConfig, ServiceCore, ServiceError, ServiceRef};
//!
//! #[derive(Default)]
//! struct Heartbeat {
//!     core: ServiceCore,
//! }
//!
//! #[async_trait]
//! impl Service for Heartbeat {
//!     fn core(&self) -> &ServiceCore { &self.core }
//!
//!     async fn init(&self, log: LogSink, config: Arc<ServiceConfig>) -> Result<(), ServiceError> {
//!         self.core.bind(log, config);
//!         Ok(())
//!     }
//!
//!     fn new_instance(&self) -> ServiceRef { Arc::new(Heartbeat::default()) }
//!
//!     async fn run(&self) -> Result<(), ServiceError> {
//!         self.log().debug("beat");
//!         Ok(())
//!     }
//!
//!     async fn stop(&self) -> Result<(), ServiceError> { Ok(()) }
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::error::ServiceError;
use crate::log::LogSink;
use crate::services::base::ServiceCore;
use crate::services::config::ServiceConfig;
use crate::services::state::ServiceState;

/// Shared handle to a service (`Arc<dyn Service>`).
pub type ServiceRef = Arc<dyn Service>;

/// Lifecycle contract of a supervised service.
#[async_trait]
pub trait Service: Send + Sync + 'static {
    /// Shared fields of this instance.
    fn core(&self) -> &ServiceCore;

    /// Variant label for logs and events.
    fn kind(&self) -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Binds name/config/log, sets `Undefined`, then performs variant setup.
    ///
    /// The controller sets `Ready` on success and `Failed` on error.
    async fn init(&self, log: LogSink, config: Arc<ServiceConfig>) -> Result<(), ServiceError>;

    /// Returns a fresh, uninitialized instance of the same variant.
    fn new_instance(&self) -> ServiceRef;

    /// Performs one unit of work.
    async fn run(&self) -> Result<(), ServiceError>;

    /// Releases resources before the instance is discarded.
    async fn stop(&self) -> Result<(), ServiceError>;

    fn name(&self) -> String {
        self.core().name()
    }

    fn state(&self) -> ServiceState {
        self.core().state()
    }

    fn set_state(&self, state: ServiceState) {
        self.core().set_state(state)
    }

    fn config(&self) -> Option<Arc<ServiceConfig>> {
        self.core().config()
    }

    fn log(&self) -> LogSink {
        self.core().log()
    }

    fn last_run(&self) -> Option<Instant> {
        self.core().last_run()
    }

    fn set_last_run(&self, when: Instant) {
        self.core().set_last_run(when)
    }

    fn last_restart(&self) -> Option<Instant> {
        self.core().last_restart()
    }

    fn set_last_restart(&self, when: Instant) {
        self.core().set_last_restart(when)
    }
}

/// `my_crate::services::Poller<T>` → `Poller`.
fn short_type_name(full: &'static str) -> &'static str {
    let head = full.split('<').next().unwrap_or(full);
    head.rsplit("::").next().unwrap_or(head)
}
