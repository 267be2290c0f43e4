//! # Example: basic
//!
//! Wires a manager, one scheduled service and one default service, then runs
//! the controller until the process receives a termination signal.
//!
//! Demonstrates how to:
//! - Install a `tracing` subscriber and hand a [`LogSink`] to the manager.
//! - Register a [`ScheduledService`] with run and stop callbacks.
//! - Drive [`ServiceController::run`](svcvisor::ServiceController::run) with a
//!   [`CancellationToken`] cancelled from OS signal handling.
//!
//! ## Flow
//! ```text
//! ServiceManager::new(log)
//!     ├─► controller()             (seeds "default")
//!     ├─► new_service("test", ScheduledService)
//!     ├─► new_service("test2", DefaultService)
//!     ├─► spawn controller.run(token)
//!     └─► wait_for_shutdown_signal() ─► token.cancel() ─► join
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example basic
//! ```

use std::time::Duration;

use svcvisor::{
    DefaultService, LogSink, ScheduleConfig, ScheduledService, ServiceConfig, ServiceError,
    ServiceManager,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Waits for SIGINT / SIGTERM / SIGQUIT (Ctrl-C elsewhere).
#[cfg(unix)]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {},
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let manager = ServiceManager::new(LogSink::new("example"));
    let controller = manager.controller().await;

    let token = CancellationToken::new();
    let runner = tokio::spawn(controller.clone().run(token.clone()));

    let ticker = ScheduleConfig::new("test", Duration::from_secs(10), |log: LogSink| async move {
        log.info("tick");
        Ok::<_, ServiceError>(())
    })
    .with_stop(|log: LogSink| async move {
        log.info("stop");
        Ok::<_, ServiceError>(())
    });
    controller
        .new_service(ticker.into_config(), ScheduledService::arc())
        .await?;
    controller
        .new_service(ServiceConfig::new("test2"), DefaultService::arc())
        .await?;

    wait_for_shutdown_signal().await?;

    token.cancel();
    runner.await??;
    Ok(())
}
