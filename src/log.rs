//! # Scoped log handle.
//!
//! [`LogSink`] is the telemetry handle the manager injects into the controller
//! and the controller hands to every service. It carries a dotted scope
//! (`svcManager.poller`) and emits leveled [`tracing`] events tagged with it.
//!
//! The crate never installs a subscriber; the embedding application decides
//! where events go (`tracing-subscriber` fmt layer, JSON, OTLP, ...).
//!
//! ## Example
//! ```rust
//! use svcvisor::LogSink;
//!
//! let root = LogSink::new("svcManager");
//! let svc = root.named("poller");
//! assert_eq!(svc.scope(), "svcManager.poller");
//! svc.info("tick");
//! ```
//!
//! Structured fields go through [`log_event!`](crate::log_event), which stamps
//! the sink's scope on an ordinary `tracing` event:
//!
//! ```rust
//! use svcvisor::{LogSink, log_event};
//!
//! let log = LogSink::new("svcManager").named("poller");
//! log_event!(log, INFO, fetched = 12, source = %"queue", "batch done");
//! ```

use std::fmt;
use std::sync::Arc;

/// Cheaply cloneable, name-scoped log handle.
#[derive(Clone, Debug)]
pub struct LogSink {
    scope: Arc<str>,
}

impl LogSink {
    /// Creates a root sink with the given scope.
    pub fn new(scope: impl AsRef<str>) -> Self {
        Self {
            scope: Arc::from(scope.as_ref()),
        }
    }

    /// Returns a child sink whose scope is `<self>.<name>`.
    pub fn named(&self, name: impl AsRef<str>) -> Self {
        let name = name.as_ref();
        if self.scope.is_empty() {
            return Self::new(name);
        }
        Self::new(format!("{}.{name}", self.scope))
    }

    /// Returns the dotted scope.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn trace(&self, msg: impl fmt::Display) {
        crate::log_event!(self, TRACE, "{msg}");
    }

    pub fn debug(&self, msg: impl fmt::Display) {
        crate::log_event!(self, DEBUG, "{msg}");
    }

    pub fn info(&self, msg: impl fmt::Display) {
        crate::log_event!(self, INFO, "{msg}");
    }

    pub fn warn(&self, msg: impl fmt::Display) {
        crate::log_event!(self, WARN, "{msg}");
    }

    pub fn error(&self, msg: impl fmt::Display) {
        crate::log_event!(self, ERROR, "{msg}");
    }
}

/// Emits a `tracing` event at `$level` tagged with the sink's `scope`.
///
/// Accepts the usual `tracing` field syntax after the level:
/// `log_event!(sink, WARN, service = %name, error = %e, "stop failed")`.
#[macro_export]
macro_rules! log_event {
    ($sink:expr, $level:ident, $($arg:tt)+) => {{
        let __sink: &$crate::LogSink = &$sink;
        $crate::__tracing::event!(
            $crate::__tracing::Level::$level,
            scope = %__sink.scope(),
            $($arg)+
        )
    }};
}

impl Default for LogSink {
    /// Root sink with an empty scope; the first `named` call sets it.
    fn default() -> Self {
        Self::new("")
    }
}
