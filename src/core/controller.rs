//! # ServiceController: registration, teardown and the tick-driven scheduler.
//!
//! The [`ServiceController`] owns the [`Registry`], a lifecycle event [`Bus`]
//! and the [`ControllerConfig`]. Callers register services with
//! [`new_service`](ServiceController::new_service); the loop started by
//! [`run`](ServiceController::run) then drives them.
//!
//! ## Tick dispatch
//! ```text
//! every cfg.tick:
//!   reap finished units
//!   for name in registry.list():
//!     match svc.state():
//!       Failed    ─► claim_restart(cooldown)? ─► spawn restart_service(name)
//!       Ready     ─► CAS Ready→Busy?          ─► spawn run():
//!                                                  Ok  ─► Ready
//!                                                  Err ─► Failed (+ RunFailed)
//!       Busy      ─► skip (previous run still in flight)
//!       Undefined ─► skip (not initialized)
//! ```
//!
//! ## Shutdown path
//! ```text
//! token.cancelled()
//!   └─► publish ShutdownRequested
//!   └─► join every in-flight unit (never interrupts run/stop)
//!   └─► kill_service(name) for all names, concurrently; join
//!   └─► publish AllStopped ─► Ok(())
//! ```
//!
//! ## Rules
//! - Per-service failures are logged and published, never returned from `run`.
//! - A failed service is restarted at most once per cooldown window.
//! - Restart discards the instance (`new_instance`) but keeps its config.
//! - `init`, `run` and `stop` each run on their own task; a panic becomes the
//!   matching [`ServiceError`] and never leaves a service `Undefined`.

use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{OwnedSemaphorePermit, Semaphore, broadcast};
use tokio::task::{JoinError, JoinSet};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::ControllerConfig;
use crate::core::registry::Registry;
use crate::error::{RuntimeError, ServiceError};
use crate::events::{Bus, Event, EventKind};
use crate::log::LogSink;
use crate::log_event;
use crate::services::{ServiceConfig, ServiceRef, ServiceState};

/// Scheduler and lifecycle owner of a set of named services.
pub struct ServiceController {
    cfg: ControllerConfig,
    registry: Registry,
    bus: Bus,
    log: LogSink,
    semaphore: Option<Arc<Semaphore>>,
    running: AtomicBool,
}

impl ServiceController {
    /// Creates a controller; call [`run`](Self::run) to start scheduling.
    pub fn new(cfg: ControllerConfig, log: LogSink) -> Arc<Self> {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let semaphore = cfg.concurrency_limit().map(Semaphore::new).map(Arc::new);

        Arc::new(Self {
            cfg,
            registry: Registry::new(),
            bus,
            log,
            semaphore,
            running: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.cfg
    }

    pub fn log(&self) -> &LogSink {
        &self.log
    }

    /// Returns a receiver of lifecycle events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Returns the service registered under `name`.
    pub async fn get_service(&self, name: &str) -> Option<ServiceRef> {
        self.registry.get(name).await
    }

    /// Returns sorted names of all registered services.
    pub async fn list_services(&self) -> Vec<String> {
        self.registry.list().await
    }

    /// Registers and initializes `svc` under `config.name()`.
    ///
    /// An existing service with the same name is killed first; if its `stop`
    /// fails, that error is returned and nothing is registered. If `init`
    /// fails or panics the new instance stays registered in `Failed` state, so
    /// the run loop retries it after the cooldown.
    pub async fn new_service(
        &self,
        config: impl Into<Arc<ServiceConfig>>,
        svc: ServiceRef,
    ) -> Result<(), ServiceError> {
        let config = config.into();
        let name = config.name().to_string();

        if self.registry.get(&name).await.is_some() {
            self.kill_service(&name).await?;
        }

        log_event!(
            self.log,
            INFO,
            service = %name,
            kind = svc.kind(),
            "creating service"
        );
        svc.set_last_restart(Instant::now());

        if let Some(replaced) = self.registry.add(name.clone(), Arc::clone(&svc)).await {
            // Lost a race with a concurrent registration of the same name.
            self.discard(&name, replaced).await;
        }

        if let Err(e) = init_isolated(&name, &svc, self.log.named(&name), config).await {
            svc.set_state(ServiceState::Failed);
            log_event!(
                self.log,
                ERROR,
                service = %name,
                kind = svc.kind(),
                error = %e,
                "service init failed"
            );
            self.bus.publish(
                event(EventKind::ServiceFailed, &name, &svc).with_reason(e.to_string()),
            );
            return Err(e);
        }

        svc.set_state(ServiceState::Ready);
        self.bus.publish(event(EventKind::ServiceCreated, &name, &svc));
        Ok(())
    }

    /// Replaces the service under `name` with a fresh instance of the same
    /// variant, initialized with the original config.
    pub async fn restart_service(&self, name: &str) -> Result<(), ServiceError> {
        let svc = self
            .registry
            .get(name)
            .await
            .ok_or_else(|| ServiceError::not_found(name))?;
        let config = svc
            .config()
            .ok_or_else(|| ServiceError::config(name, "service was never initialized"))?;

        log_event!(
            self.log,
            INFO,
            service = %name,
            kind = svc.kind(),
            "restarting service"
        );
        let fresh = svc.new_instance();
        self.new_service(config, fresh).await
    }

    /// Stops the service under `name` and removes it from the registry.
    ///
    /// If `stop` fails or panics the error is returned and the entry stays
    /// registered.
    pub async fn kill_service(&self, name: &str) -> Result<(), ServiceError> {
        let svc = self
            .registry
            .get(name)
            .await
            .ok_or_else(|| ServiceError::not_found(name))?;

        log_event!(
            self.log,
            INFO,
            service = %name,
            kind = svc.kind(),
            "stopping service"
        );
        if let Err(e) = stop_isolated(name, &svc).await {
            log_event!(
                self.log,
                ERROR,
                service = %name,
                kind = svc.kind(),
                error = %e,
                "service stop failed"
            );
            self.bus
                .publish(event(EventKind::StopFailed, name, &svc).with_reason(e.to_string()));
            return Err(e);
        }

        self.registry.remove_instance(name, &svc).await;
        self.bus.publish(event(EventKind::ServiceStopped, name, &svc));
        Ok(())
    }

    /// Drives all registered services until `token` is cancelled.
    ///
    /// Returns `Ok(())` after every in-flight unit finished and every
    /// registered service was killed. Per-service errors never surface here.
    pub async fn run(self: Arc<Self>, token: CancellationToken) -> Result<(), RuntimeError> {
        if self.running.swap(true, Ordering::AcqRel) {
            return Err(RuntimeError::AlreadyRunning);
        }
        let _running = RunningGuard(&self.running);

        let mut ticker = time::interval(self.cfg.tick_clamped());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut inflight: JoinSet<()> = JoinSet::new();

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    while let Some(res) = inflight.try_join_next() {
                        self.report_join(res);
                    }
                    self.dispatch_tick(&mut inflight).await;
                }
            }
        }

        self.shutdown(inflight).await;
        Ok(())
    }

    /// Spawns one unit per eligible service.
    async fn dispatch_tick(self: &Arc<Self>, inflight: &mut JoinSet<()>) {
        for name in self.registry.list().await {
            let Some(svc) = self.registry.get(&name).await else {
                continue;
            };

            match svc.state() {
                ServiceState::Failed => {
                    if !svc
                        .core()
                        .claim_restart(self.cfg.restart_cooldown, Instant::now())
                    {
                        continue;
                    }
                    let me = Arc::clone(self);
                    inflight.spawn(async move { me.restart_failed(name, svc).await });
                }
                ServiceState::Ready => {
                    if !svc.core().begin_run() {
                        continue;
                    }
                    let me = Arc::clone(self);
                    inflight.spawn(async move { me.run_once(name, svc).await });
                }
                ServiceState::Busy | ServiceState::Undefined => {}
            }
        }
    }

    /// Runs one `run()` of a service already moved to `Busy`.
    async fn run_once(&self, name: String, svc: ServiceRef) {
        let _permit = self.acquire().await;

        let task = Arc::clone(&svc);
        let res = match tokio::spawn(async move { task.run().await }).await {
            Ok(res) => res,
            Err(je) => Err(ServiceError::run(&name, describe_join_error(je))),
        };

        match res {
            Ok(()) => svc.set_state(ServiceState::Ready),
            Err(e) => {
                log_event!(
                    self.log,
                    ERROR,
                    service = %name,
                    kind = svc.kind(),
                    error = %e,
                    "run failed"
                );
                self.bus
                    .publish(event(EventKind::RunFailed, &name, &svc).with_reason(e.to_string()));
                svc.set_state(ServiceState::Failed);
            }
        }
    }

    /// Restarts a failed service whose cooldown was already claimed.
    async fn restart_failed(&self, name: String, svc: ServiceRef) {
        let _permit = self.acquire().await;

        self.bus
            .publish(event(EventKind::RestartRequested, &name, &svc));
        if let Err(e) = self.restart_service(&name).await {
            log_event!(
                self.log,
                ERROR,
                service = %name,
                kind = svc.kind(),
                error = %e,
                "restart service failed"
            );
            self.bus.publish(
                event(EventKind::RestartFailed, &name, &svc).with_reason(e.to_string()),
            );
        }
    }

    /// Drains in-flight units, then kills every registered service.
    async fn shutdown(self: &Arc<Self>, mut inflight: JoinSet<()>) {
        log_event!(
            self.log,
            WARN,
            inflight = inflight.len(),
            "interrupt received, waiting for all units to finish"
        );
        self.bus.publish(Event::new(EventKind::ShutdownRequested));
        while let Some(res) = inflight.join_next().await {
            self.report_join(res);
        }

        log_event!(self.log, WARN, "stopping all services");
        let mut stops: JoinSet<()> = JoinSet::new();
        for name in self.registry.list().await {
            let me = Arc::clone(self);
            // kill_service logs and publishes its own failures.
            stops.spawn(async move {
                let _ = me.kill_service(&name).await;
            });
        }
        while let Some(res) = stops.join_next().await {
            self.report_join(res);
        }

        self.bus.publish(Event::new(EventKind::AllStopped));
    }

    /// Stops an instance that was displaced from the registry without a kill.
    async fn discard(&self, name: &str, svc: ServiceRef) {
        log_event!(
            self.log,
            WARN,
            service = %name,
            kind = svc.kind(),
            "replacing concurrently registered instance"
        );
        match stop_isolated(name, &svc).await {
            Ok(()) => self.bus.publish(event(EventKind::ServiceStopped, name, &svc)),
            Err(e) => self
                .bus
                .publish(event(EventKind::StopFailed, name, &svc).with_reason(e.to_string())),
        }
    }

    async fn acquire(&self) -> Option<OwnedSemaphorePermit> {
        match &self.semaphore {
            Some(sem) => Arc::clone(sem).acquire_owned().await.ok(),
            None => None,
        }
    }

    fn report_join(&self, res: Result<(), JoinError>) {
        if let Err(je) = res {
            log_event!(
                self.log,
                ERROR,
                error = %describe_join_error(je),
                "dispatched unit aborted"
            );
        }
    }
}

/// Clears the `running` flag when the run loop exits.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn event(kind: EventKind, name: &str, svc: &ServiceRef) -> Event {
    Event::new(kind)
        .with_service(name)
        .with_kind_label(svc.kind())
}

/// Runs `init` on its own task so a panic surfaces as [`ServiceError::Init`].
async fn init_isolated(
    name: &str,
    svc: &ServiceRef,
    log: LogSink,
    config: Arc<ServiceConfig>,
) -> Result<(), ServiceError> {
    let task = Arc::clone(svc);
    match tokio::spawn(async move { task.init(log, config).await }).await {
        Ok(res) => res,
        Err(je) => Err(ServiceError::init(name, describe_join_error(je))),
    }
}

/// Runs `stop` on its own task so a panic surfaces as [`ServiceError::Stop`].
async fn stop_isolated(name: &str, svc: &ServiceRef) -> Result<(), ServiceError> {
    let task = Arc::clone(svc);
    match tokio::spawn(async move { task.stop().await }).await {
        Ok(res) => res,
        Err(je) => Err(ServiceError::stop(name, describe_join_error(je))),
    }
}

fn describe_join_error(je: JoinError) -> String {
    if !je.is_panic() {
        return "cancelled".to_string();
    }
    let payload: Box<dyn Any + Send> = je.into_panic();
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}
