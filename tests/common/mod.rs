#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;

use svcvisor::{
    ControllerConfig, Event, EventKind, LogSink, Service, ServiceConfig, ServiceCore,
    ServiceError, ServiceRef,
};

/// Counters and switches shared by every instance of one [`Scripted`] lineage.
#[derive(Default)]
pub struct Stats {
    pub instances: AtomicUsize,
    pub inits: AtomicUsize,
    pub runs: AtomicUsize,
    pub runs_finished: AtomicUsize,
    pub stops: AtomicUsize,
    pub running: AtomicUsize,
    pub max_running: AtomicUsize,
    pub fail_init: AtomicBool,
    pub panic_init: AtomicBool,
    pub fail_run: AtomicBool,
    pub panic_run: AtomicBool,
    pub fail_stop: AtomicBool,
    pub panic_stop: AtomicBool,
    pub run_delay_ms: AtomicU64,
    journal: Mutex<Vec<String>>,
}

impl Stats {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn journal(&self) -> Vec<String> {
        self.journal.lock().expect("journal").clone()
    }

    fn record(&self, entry: String) {
        self.journal.lock().expect("journal").push(entry);
    }

    pub fn set(&self, flag: &AtomicBool, value: bool) {
        flag.store(value, Ordering::SeqCst);
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

/// Scriptable service; `new_instance` keeps the same [`Stats`].
pub struct Scripted {
    core: ServiceCore,
    id: usize,
    stats: Arc<Stats>,
}

impl Scripted {
    pub fn arc(stats: &Arc<Stats>) -> ServiceRef {
        let id = stats.instances.fetch_add(1, Ordering::SeqCst) + 1;
        Arc::new(Self {
            core: ServiceCore::new(),
            id,
            stats: Arc::clone(stats),
        })
    }
}

#[async_trait]
impl Service for Scripted {
    fn core(&self) -> &ServiceCore {
        &self.core
    }

    async fn init(&self, log: LogSink, config: Arc<ServiceConfig>) -> Result<(), ServiceError> {
        let name = config.name().to_string();
        self.core.bind(log, config);
        self.stats.inits.fetch_add(1, Ordering::SeqCst);
        self.stats.record(format!("init:{}", self.id));
        if self.stats.panic_init.load(Ordering::SeqCst) {
            panic!("scripted init panic");
        }
        if self.stats.fail_init.load(Ordering::SeqCst) {
            return Err(ServiceError::init(name, "scripted init failure"));
        }
        Ok(())
    }

    fn new_instance(&self) -> ServiceRef {
        Scripted::arc(&self.stats)
    }

    async fn run(&self) -> Result<(), ServiceError> {
        let stats = &self.stats;
        stats.runs.fetch_add(1, Ordering::SeqCst);
        let now = stats.running.fetch_add(1, Ordering::SeqCst) + 1;
        stats.max_running.fetch_max(now, Ordering::SeqCst);

        let delay = stats.run_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        stats.running.fetch_sub(1, Ordering::SeqCst);
        stats.runs_finished.fetch_add(1, Ordering::SeqCst);
        stats.record(format!("run-end:{}", self.id));

        if stats.panic_run.load(Ordering::SeqCst) {
            panic!("scripted panic");
        }
        if stats.fail_run.load(Ordering::SeqCst) {
            return Err(ServiceError::run(self.name(), "scripted run failure"));
        }
        Ok(())
    }

    async fn stop(&self) -> Result<(), ServiceError> {
        self.stats.stops.fetch_add(1, Ordering::SeqCst);
        self.stats.record(format!("stop:{}", self.id));
        if self.stats.panic_stop.load(Ordering::SeqCst) {
            panic!("scripted stop panic");
        }
        if self.stats.fail_stop.load(Ordering::SeqCst) {
            return Err(ServiceError::stop(self.name(), "scripted stop failure"));
        }
        Ok(())
    }
}

pub fn config_with_tick(tick: Duration) -> ControllerConfig {
    ControllerConfig {
        tick,
        ..ControllerConfig::default()
    }
}

/// Receives until an event of `kind` for `service` arrives.
pub async fn wait_for(rx: &mut broadcast::Receiver<Event>, kind: EventKind, service: &str) -> Event {
    loop {
        let ev = rx.recv().await.expect("event bus closed");
        if ev.kind == kind && ev.service.as_deref() == Some(service) {
            return ev;
        }
    }
}

/// Receives every event up to and including the first of `kind`.
pub async fn collect_until(rx: &mut broadcast::Receiver<Event>, kind: EventKind) -> Vec<Event> {
    let mut seen = Vec::new();
    loop {
        let ev = rx.recv().await.expect("event bus closed");
        let done = ev.kind == kind;
        seen.push(ev);
        if done {
            return seen;
        }
    }
}

/// Receives until an event of `kind` arrives.
pub async fn wait_for_kind(rx: &mut broadcast::Receiver<Event>, kind: EventKind) -> Event {
    loop {
        let ev = rx.recv().await.expect("event bus closed");
        if ev.kind == kind {
            return ev;
        }
    }
}
