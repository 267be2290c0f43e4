//! Error types used by the svcvisor runtime and services.
//!
//! This module defines two error enums:
//!
//! - [`ServiceError`] - errors raised by service operations (registration, run, stop).
//! - [`RuntimeError`] - errors raised by the scheduling loop itself.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use thiserror::Error;

/// # Errors produced by services and controller operations.
///
/// `NotFound` and `Config` are raised by the controller or a variant's `init`;
/// `Init`, `Run` and `Stop` wrap opaque, variant-specific failures.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Operation targeted a name that is not registered.
    #[error("service {name:?} does not exist")]
    NotFound {
        /// Name that was looked up.
        name: String,
    },

    /// The service could not extract its typed configuration.
    #[error("service {name:?}: {reason}")]
    Config {
        /// Service name.
        name: String,
        /// What was missing or malformed.
        reason: String,
    },

    /// Variant-specific initialization failure.
    #[error("service {name:?} init failed: {error}")]
    Init {
        /// Service name.
        name: String,
        /// The underlying error message.
        error: String,
    },

    /// One unit of work failed.
    #[error("service {name:?} run failed: {error}")]
    Run {
        /// Service name.
        name: String,
        /// The underlying error message.
        error: String,
    },

    /// Shutdown of the service failed.
    #[error("service {name:?} stop failed: {error}")]
    Stop {
        /// Service name.
        name: String,
        /// The underlying error message.
        error: String,
    },
}

impl ServiceError {
    /// Shorthand for [`ServiceError::NotFound`].
    pub fn not_found(name: impl Into<String>) -> Self {
        ServiceError::NotFound { name: name.into() }
    }

    /// Shorthand for [`ServiceError::Config`].
    pub fn config(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ServiceError::Config {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`ServiceError::Init`].
    pub fn init(name: impl Into<String>, error: impl ToString) -> Self {
        ServiceError::Init {
            name: name.into(),
            error: error.to_string(),
        }
    }

    /// Shorthand for [`ServiceError::Run`].
    pub fn run(name: impl Into<String>, error: impl ToString) -> Self {
        ServiceError::Run {
            name: name.into(),
            error: error.to_string(),
        }
    }

    /// Shorthand for [`ServiceError::Stop`].
    pub fn stop(name: impl Into<String>, error: impl ToString) -> Self {
        ServiceError::Stop {
            name: name.into(),
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use svcvisor::ServiceError;
    ///
    /// let err = ServiceError::not_found("ghost");
    /// assert_eq!(err.as_label(), "service_not_found");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ServiceError::NotFound { .. } => "service_not_found",
            ServiceError::Config { .. } => "service_config",
            ServiceError::Init { .. } => "service_init_failed",
            ServiceError::Run { .. } => "service_run_failed",
            ServiceError::Stop { .. } => "service_stop_failed",
        }
    }

    /// Returns a human-readable message without the service name prefix.
    pub fn as_message(&self) -> String {
        match self {
            ServiceError::NotFound { .. } => "does not exist".to_string(),
            ServiceError::Config { reason, .. } => format!("config: {reason}"),
            ServiceError::Init { error, .. } => format!("init: {error}"),
            ServiceError::Run { error, .. } => format!("run: {error}"),
            ServiceError::Stop { error, .. } => format!("stop: {error}"),
        }
    }

    /// Returns the name of the service the error refers to.
    pub fn service(&self) -> &str {
        match self {
            ServiceError::NotFound { name }
            | ServiceError::Config { name, .. }
            | ServiceError::Init { name, .. }
            | ServiceError::Run { name, .. }
            | ServiceError::Stop { name, .. } => name,
        }
    }
}

/// # Errors produced by the scheduling loop.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// [`ServiceController::run`](crate::ServiceController::run) was entered
    /// while another invocation was still driving the same controller.
    #[error("controller run loop is already active")]
    AlreadyRunning,
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::AlreadyRunning => "runtime_already_running",
        }
    }
}
