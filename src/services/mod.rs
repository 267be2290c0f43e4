//! # Service abstractions and built-in variants.
//!
//! - [`Service`] - lifecycle contract driven by the controller
//! - [`ServiceRef`] - shared handle (`Arc<dyn Service>`)
//! - [`ServiceCore`] - state, binding and timestamps embedded by variants
//! - [`ServiceState`] - `Undefined` / `Ready` / `Busy` / `Failed`
//! - [`ServiceConfig`] - named key/value bag passed to `init`
//! - [`DefaultService`] - no-op variant, also the manager's seed service
//! - [`ScheduledService`] + [`ScheduleConfig`] - interval-gated callback

mod base;
mod config;
mod default;
mod scheduled;
mod service;
mod state;

pub use base::ServiceCore;
pub use config::ServiceConfig;
pub use default::DefaultService;
pub use scheduled::{
    BoxServiceFuture, SCHEDULE_KEY, ScheduleConfig, ScheduleHandler, ScheduledService,
};
pub use service::{Service, ServiceRef};
pub use state::ServiceState;
