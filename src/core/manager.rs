//! # ServiceManager: lazily built controller handle.
//!
//! The manager is constructed explicitly with a [`LogSink`] and handed to
//! whoever needs the controller; there is no process-wide global.
//! [`controller`](ServiceManager::controller) builds the one
//! [`ServiceController`] on first access and seeds it with a
//! [`DefaultService`] registered as [`DEFAULT_SERVICE`].
//!
//! ```text
//! ServiceManager::new(log)
//!        │
//!        ├─► controller()  (first call, under OnceCell)
//!        │       └─► ServiceController::new(cfg, log.named("svcManager"))
//!        │       └─► new_service("default", DefaultService)
//!        │
//!        └─► controller()  (later calls) ─► same Arc<ServiceController>
//! ```

use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::config::ControllerConfig;
use crate::core::controller::ServiceController;
use crate::log::LogSink;
use crate::log_event;
use crate::services::{DefaultService, ServiceConfig};

/// Reserved name of the seed service.
pub const DEFAULT_SERVICE: &str = "default";

/// Hands out a single, lazily created [`ServiceController`].
pub struct ServiceManager {
    log: LogSink,
    cfg: ControllerConfig,
    controller: OnceCell<Arc<ServiceController>>,
}

impl ServiceManager {
    /// Creates a manager with [`ControllerConfig::default`].
    pub fn new(log: LogSink) -> Self {
        Self::with_config(log, ControllerConfig::default())
    }

    /// Creates a manager whose controller will use `cfg`.
    pub fn with_config(log: LogSink, cfg: ControllerConfig) -> Self {
        Self {
            log,
            cfg,
            controller: OnceCell::new(),
        }
    }

    /// Returns the controller, building and seeding it on first access.
    ///
    /// Concurrent first callers wait for a single initialization.
    ///
    /// # Panics
    /// If the seed service cannot be registered. That registration cannot
    /// fail for [`DefaultService`], so a failure means the controller itself
    /// is broken.
    ///
    /// The panic unwinds the task that awaited `controller()`, not the whole
    /// process. It ends the process only when raised on the `main` task or
    /// when the binary is built with `panic = "abort"`. The cell stays empty,
    /// so a later call retries the initialization.
    pub async fn controller(&self) -> Arc<ServiceController> {
        let ctrl = self
            .controller
            .get_or_init(|| async {
                let ctrl = ServiceController::new(self.cfg.clone(), self.log.named("svcManager"));
                if let Err(e) = ctrl
                    .new_service(ServiceConfig::new(DEFAULT_SERVICE), DefaultService::arc())
                    .await
                {
                    log_event!(
                        ctrl.log(),
                        ERROR,
                        error = %e,
                        "default service creation failed"
                    );
                    panic!("default service creation failed: {e}");
                }
                ctrl
            })
            .await;
        Arc::clone(ctrl)
    }

    /// Returns the controller if it was already built.
    pub fn get(&self) -> Option<Arc<ServiceController>> {
        self.controller.get().cloned()
    }

    pub fn log(&self) -> &LogSink {
        &self.log
    }
}
