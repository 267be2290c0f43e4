//! # svcvisor
//!
//! **svcvisor** is a small tick-driven service supervisor for tokio.
//!
//! It hosts a set of named services, advances each one on a fixed tick,
//! tracks per-service health as an explicit state, and restarts services
//! that fail, at most once per cooldown window.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  ServiceManager ──controller()──► ServiceController
//!                                    │
//!        new_service(config, svc) ───┤──► Registry (name → Arc<dyn Service>)
//!        restart_service(name)   ────┤
//!        kill_service(name)      ────┤
//!                                    │
//!        run(token) ─────────────────┘
//!          every tick:
//!            ┌──────────┐  ┌──────────┐  ┌──────────┐
//!            │ svc "a"  │  │ svc "b"  │  │ svc "c"  │
//!            │  Ready   │  │  Failed  │  │  Busy    │
//!            └────┬─────┘  └────┬─────┘  └──────────┘
//!                 ▼             ▼             (skip)
//!            spawn run()   cooldown over?
//!                          spawn restart_service()
//!
//!  Lifecycle events ──► Bus (broadcast) ──► controller.subscribe()
//!  Log lines        ──► tracing (scope = "svcManager.<service>")
//! ```
//!
//! ### Service state machine
//! ```text
//! Undefined ─► Ready ─► Busy ─► Ready
//!                │        │
//!                └────────┴──► Failed ─(restart after cooldown)─► Ready
//! ```
//!
//! ## Features
//! | Area              | Description                                                 | Key types                                   |
//! |-------------------|-------------------------------------------------------------|---------------------------------------------|
//! | **Services**      | Lifecycle contract and built-in variants                    | [`Service`], [`DefaultService`], [`ScheduledService`] |
//! | **Configuration** | Per-service key/value bag, controller tuning                | [`ServiceConfig`], [`ControllerConfig`]     |
//! | **Supervision**   | Registration, restart, kill, tick-driven dispatch           | [`ServiceController`], [`ServiceManager`]   |
//! | **Events**        | Broadcast lifecycle events                                  | [`Event`], [`EventKind`]                    |
//! | **Errors**        | Typed errors for service operations and the run loop        | [`ServiceError`], [`RuntimeError`]          |
//! | **Logging**       | Name-scoped `tracing` handle injected into every service    | [`LogSink`]                                 |
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use svcvisor::{LogSink, ScheduleConfig, ScheduledService, ServiceError, ServiceManager};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = ServiceManager::new(LogSink::new("example"));
//!     let controller = manager.controller().await;
//!
//!     let config = ScheduleConfig::new("hello", Duration::from_secs(10), |log: LogSink| async move {
//!         log.info("hello from a scheduled service");
//!         Ok::<_, ServiceError>(())
//!     })
//!     .into_config();
//!     controller.new_service(config, ScheduledService::arc()).await?;
//!
//!     let token = CancellationToken::new();
//!     let stopper = token.clone();
//!     tokio::spawn(async move {
//!         tokio::time::sleep(Duration::from_millis(100)).await;
//!         stopper.cancel();
//!     });
//!
//!     controller.run(token).await?;
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod log;
mod services;

// ---- Public re-exports ----

#[doc(hidden)]
pub use tracing as __tracing;

pub use config::ControllerConfig;
pub use crate::core::{DEFAULT_SERVICE, Registry, ServiceController, ServiceManager};
pub use error::{RuntimeError, ServiceError};
pub use events::{Bus, Event, EventKind};
pub use log::LogSink;
pub use services::{
    BoxServiceFuture, DefaultService, SCHEDULE_KEY, ScheduleConfig, ScheduleHandler,
    ScheduledService, Service, ServiceConfig, ServiceCore, ServiceRef, ServiceState,
};
