//! # No-op service.
//!
//! [`DefaultService`] binds its config and log sink and otherwise does
//! nothing. The manager seeds one under the reserved name `"default"`, and
//! other variants embed it to inherit the binding behavior.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ServiceError;
use crate::log::LogSink;
use crate::services::base::ServiceCore;
use crate::services::config::ServiceConfig;
use crate::services::service::{Service, ServiceRef};

/// Placeholder service whose `run` and `stop` always succeed.
#[derive(Debug, Default)]
pub struct DefaultService {
    core: ServiceCore,
}

impl DefaultService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the service and returns it as a shared handle.
    pub fn arc() -> ServiceRef {
        Arc::new(Self::new())
    }
}

#[async_trait]
impl Service for DefaultService {
    fn core(&self) -> &ServiceCore {
        &self.core
    }

    fn kind(&self) -> &'static str {
        "DefaultService"
    }

    async fn init(&self, log: LogSink, config: Arc<ServiceConfig>) -> Result<(), ServiceError> {
        self.core.bind(log, config);
        Ok(())
    }

    fn new_instance(&self) -> ServiceRef {
        self.log().debug("new instance");
        DefaultService::arc()
    }

    async fn run(&self) -> Result<(), ServiceError> {
        Ok(())
    }

    async fn stop(&self) -> Result<(), ServiceError> {
        self.log().debug("stop");
        Ok(())
    }
}
