//! # Named key/value configuration bag.
//!
//! [`ServiceConfig`] is what the controller passes to [`Service::init`](crate::Service::init).
//! Each variant stores its own strongly-typed configuration under a key and
//! reads it back with [`ServiceConfig::get_as`].
//!
//! ## Rules
//! - Keys are unique; `set` on an existing key replaces the value.
//! - `get` on a missing key yields `None`, never an error. Treating a missing
//!   or mistyped value as a configuration error is the caller's decision.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use svcvisor::ServiceConfig;
//!
//! let cfg = ServiceConfig::new("poller")
//!     .set("interval", Duration::from_secs(10))
//!     .set("endpoint", String::from("http://localhost"));
//!
//! assert_eq!(cfg.name(), "poller");
//! assert_eq!(cfg.get_as::<Duration>("interval"), Some(&Duration::from_secs(10)));
//! assert!(cfg.get_as::<u64>("interval").is_none());
//! assert!(cfg.get("missing").is_none());
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Opaque configuration value.
type ConfigValue = Arc<dyn Any + Send + Sync>;

/// Named, opaque key/value bag handed to a service at initialization.
#[derive(Clone)]
pub struct ServiceConfig {
    name: String,
    kv: HashMap<String, ConfigValue>,
}

impl ServiceConfig {
    /// Creates an empty bag for the service `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kv: HashMap::new(),
        }
    }

    /// Service name; also the registry key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stores `value` under `key` and returns the bag for chaining.
    pub fn set<T>(mut self, key: impl Into<String>, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        self.kv.insert(key.into(), Arc::new(value));
        self
    }

    /// Returns the raw value under `key`, or `None` if absent.
    pub fn get(&self, key: &str) -> Option<&(dyn Any + Send + Sync)> {
        self.kv.get(key).map(|v| v.as_ref())
    }

    /// Returns the value under `key` if it exists and has type `T`.
    pub fn get_as<T: Any>(&self, key: &str) -> Option<&T> {
        self.get(key)?.downcast_ref::<T>()
    }

    /// Returns true if `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.kv.contains_key(key)
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.kv.len()
    }

    /// Returns true if no keys are stored.
    pub fn is_empty(&self) -> bool {
        self.kv.is_empty()
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.kv.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("ServiceConfig")
            .field("name", &self.name)
            .field("keys", &keys)
            .finish()
    }
}
