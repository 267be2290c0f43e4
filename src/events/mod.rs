//! Lifecycle events: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `ServiceController` (registration, kill) and its
//!   dispatched run/restart units.
//! - **Consumers**: anything holding a receiver from
//!   [`ServiceController::subscribe`](crate::ServiceController::subscribe).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
