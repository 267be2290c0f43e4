//! # Interval-gated callback service.
//!
//! [`ScheduledService`] wraps a user callback and calls it from `run` only
//! when it has never fired, or when more than the configured interval passed
//! since the previous firing. The controller still calls `run` every tick;
//! the gate lives here.
//!
//! Its typed [`ScheduleConfig`] travels through the generic
//! [`ServiceConfig`] bag under [`SCHEDULE_KEY`].
//!
//! ## Firing rules
//! - `last_run == None` → fire
//! - `now - last_run > interval` → fire
//! - otherwise → `Ok(())` without calling the callback
//! - on firing, `last_run` is set to the instant the callback *started*,
//!   whether it succeeded, failed or panicked
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use svcvisor::{LogSink, ScheduleConfig, ServiceError};
//!
//! let cfg = ScheduleConfig::new("poller", Duration::from_secs(10), |log: LogSink| async move {
//!     log.info("tick");
//!     Ok::<_, ServiceError>(())
//! })
//! .with_stop(|log: LogSink| async move {
//!     log.info("stop");
//!     Ok::<_, ServiceError>(())
//! })
//! .into_config();
//!
//! assert_eq!(cfg.name(), "poller");
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::error::ServiceError;
use crate::log::LogSink;
use crate::services::base::ServiceCore;
use crate::services::config::ServiceConfig;
use crate::services::default::DefaultService;
use crate::services::service::{Service, ServiceRef};
use crate::services::state::ServiceState;

/// Key under which [`ScheduleConfig`] is stored in the config bag.
pub const SCHEDULE_KEY: &str = "schedule";

/// Boxed future returned by schedule callbacks.
pub type BoxServiceFuture = Pin<Box<dyn Future<Output = Result<(), ServiceError>> + Send + 'static>>;

/// Shared schedule callback; receives the service's scoped log sink.
pub type ScheduleHandler = Arc<dyn Fn(LogSink) -> BoxServiceFuture + Send + Sync>;

/// Typed configuration of a [`ScheduledService`].
#[derive(Clone)]
pub struct ScheduleConfig {
    name: String,
    interval: Duration,
    on_run: ScheduleHandler,
    on_stop: Option<ScheduleHandler>,
}

impl ScheduleConfig {
    /// Creates a schedule that calls `on_run` at most once per `interval`.
    ///
    /// State shared between calls should be captured by the closure (`Arc<...>`).
    pub fn new<F, Fut>(name: impl Into<String>, interval: Duration, on_run: F) -> Self
    where
        F: Fn(LogSink) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ServiceError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            interval,
            on_run: boxed(on_run),
            on_stop: None,
        }
    }

    /// Sets the callback invoked by `stop`.
    pub fn with_stop<F, Fut>(mut self, on_stop: F) -> Self
    where
        F: Fn(LogSink) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ServiceError>> + Send + 'static,
    {
        self.on_stop = Some(boxed(on_stop));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wraps the schedule into a [`ServiceConfig`] named after it.
    pub fn into_config(self) -> ServiceConfig {
        ServiceConfig::new(self.name.clone()).set(SCHEDULE_KEY, self)
    }
}

impl fmt::Debug for ScheduleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduleConfig")
            .field("name", &self.name)
            .field("interval", &self.interval)
            .field("on_stop", &self.on_stop.is_some())
            .finish()
    }
}

fn boxed<F, Fut>(f: F) -> ScheduleHandler
where
    F: Fn(LogSink) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ServiceError>> + Send + 'static,
{
    Arc::new(move |log: LogSink| -> BoxServiceFuture { Box::pin(f(log)) })
}

/// Service that fires a callback on an interval.
#[derive(Debug, Default)]
pub struct ScheduledService {
    base: DefaultService,
    schedule: RwLock<Option<ScheduleConfig>>,
}

impl ScheduledService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the service and returns it as a shared handle.
    pub fn arc() -> ServiceRef {
        Arc::new(Self::new())
    }

    /// Re-runs `init` with the currently bound sink and config.
    pub async fn restore(&self) -> Result<(), ServiceError> {
        let config = self
            .config()
            .ok_or_else(|| ServiceError::config(self.name(), "not initialized"))?;
        self.init(self.log(), config).await
    }

    fn schedule(&self) -> Result<ScheduleConfig, ServiceError> {
        self.schedule
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| ServiceError::config(self.name(), "not initialized"))
    }

    fn is_due(&self, interval: Duration) -> bool {
        match self.last_run() {
            None => true,
            Some(at) => at.elapsed() > interval,
        }
    }
}

/// Writes `last_run` when dropped, so the stamp lands even if the callback panics.
struct StampLastRun<'a> {
    core: &'a ServiceCore,
    at: Instant,
}

impl Drop for StampLastRun<'_> {
    fn drop(&mut self) {
        self.core.set_last_run(self.at);
    }
}

#[async_trait]
impl Service for ScheduledService {
    fn core(&self) -> &ServiceCore {
        self.base.core()
    }

    fn kind(&self) -> &'static str {
        "ScheduledService"
    }

    async fn init(&self, log: LogSink, config: Arc<ServiceConfig>) -> Result<(), ServiceError> {
        self.base.init(log.clone(), Arc::clone(&config)).await?;
        log.info("init");

        let Some(schedule) = config.get_as::<ScheduleConfig>(SCHEDULE_KEY) else {
            return Err(ServiceError::config(
                config.name(),
                "missing or invalid schedule config",
            ));
        };
        *self.schedule.write().unwrap_or_else(PoisonError::into_inner) = Some(schedule.clone());

        self.set_state(ServiceState::Ready);
        Ok(())
    }

    fn new_instance(&self) -> ServiceRef {
        ScheduledService::arc()
    }

    async fn run(&self) -> Result<(), ServiceError> {
        let schedule = self.schedule()?;
        if !self.is_due(schedule.interval) {
            self.log().trace("not due");
            return Ok(());
        }

        let _stamp = StampLastRun {
            core: self.core(),
            at: Instant::now(),
        };
        (schedule.on_run)(self.log()).await
    }

    async fn stop(&self) -> Result<(), ServiceError> {
        // A failed init leaves nothing bound; there is nothing to tear down.
        let on_stop = self
            .schedule
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(|s| s.on_stop.clone());
        match on_stop {
            Some(on_stop) => on_stop(self.log()).await,
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(interval: Duration, counter: Arc<AtomicUsize>) -> Arc<ServiceConfig> {
        Arc::new(
            ScheduleConfig::new("counter", interval, move |_log| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok::<(), ServiceError>(())
                }
            })
            .into_config(),
        )
    }

    #[tokio::test]
    async fn test_init_without_schedule_is_config_error() {
        let svc = ScheduledService::new();
        let err = svc
            .init(LogSink::default(), Arc::new(ServiceConfig::new("bare")))
            .await
            .expect_err("must fail");
        assert_eq!(err.as_label(), "service_config");
        assert_eq!(err.service(), "bare");
    }

    #[tokio::test]
    async fn test_init_with_wrong_type_is_config_error() {
        let svc = ScheduledService::new();
        let cfg = ServiceConfig::new("bad").set(SCHEDULE_KEY, 42u32);
        let err = svc
            .init(LogSink::default(), Arc::new(cfg))
            .await
            .expect_err("must fail");
        assert!(matches!(err, ServiceError::Config { .. }));
    }

    #[tokio::test]
    async fn test_run_before_init_fails() {
        let svc = ScheduledService::new();
        assert!(svc.run().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_first_then_waits_for_interval() {
        let counter = Arc::new(AtomicUsize::new(0));
        let svc = ScheduledService::new();
        svc.init(LogSink::default(), counting(Duration::from_secs(10), counter.clone()))
            .await
            .expect("init");
        assert_eq!(svc.state(), ServiceState::Ready);

        svc.run().await.expect("run");
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        let first = svc.last_run().expect("stamped");

        for _ in 0..3 {
            tokio::time::advance(Duration::from_secs(1)).await;
            svc.run().await.expect("run");
        }
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(8)).await;
        svc.run().await.expect("run");
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert!(svc.last_run().expect("stamped") > first);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_callback_still_stamps() {
        let svc = ScheduledService::new();
        let cfg = ScheduleConfig::new("flaky", Duration::from_secs(1), |_log| async {
            Err::<(), _>(ServiceError::run("flaky", "boom"))
        })
        .into_config();
        svc.init(LogSink::default(), Arc::new(cfg)).await.expect("init");

        assert!(svc.run().await.is_err());
        assert!(svc.last_run().is_some());
        // Not due yet: the gate returns Ok without calling back.
        assert!(svc.run().await.is_ok());
    }

    #[tokio::test]
    async fn test_stop_invokes_optional_callback() {
        let stopped = Arc::new(AtomicUsize::new(0));
        let hits = stopped.clone();
        let cfg = ScheduleConfig::new("s", Duration::from_secs(1), |_log| async { Ok::<(), ServiceError>(()) })
            .with_stop(move |_log| {
                let hits = hits.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    Ok::<(), ServiceError>(())
                }
            })
            .into_config();

        let svc = ScheduledService::new();
        svc.init(LogSink::default(), Arc::new(cfg)).await.expect("init");
        svc.stop().await.expect("stop");
        assert_eq!(stopped.load(Ordering::SeqCst), 1);

        let plain = ScheduledService::new();
        plain
            .init(LogSink::default(), counting(Duration::from_secs(1), Arc::default()))
            .await
            .expect("init");
        assert!(plain.stop().await.is_ok());
    }

    #[tokio::test]
    async fn test_stop_after_failed_init_succeeds() {
        let svc = ScheduledService::new();
        svc.init(LogSink::default(), Arc::new(ServiceConfig::new("bare")))
            .await
            .expect_err("no schedule");
        assert!(svc.stop().await.is_ok());
        assert!(ScheduledService::new().stop().await.is_ok());
    }

    #[tokio::test]
    async fn test_restore_rebinds_same_config() {
        let svc = ScheduledService::new();
        svc.init(LogSink::default(), counting(Duration::from_secs(1), Arc::default()))
            .await
            .expect("init");
        svc.set_state(ServiceState::Failed);

        svc.restore().await.expect("restore");
        assert_eq!(svc.state(), ServiceState::Ready);
        assert_eq!(svc.name(), "counter");
    }
}
