//! Runtime core: registry, scheduler and manager.
//!
//! - [`registry`]: concurrent name → service store;
//! - [`controller`]: registration/teardown and the tick-driven dispatch loop;
//! - [`manager`]: lazily built, seeded controller handle.

mod controller;
mod manager;
mod registry;

pub use controller::ServiceController;
pub use manager::{DEFAULT_SERVICE, ServiceManager};
pub use registry::Registry;
