//! # Service registry.
//!
//! Concurrent `name → ServiceRef` store owned by the controller.
//!
//! ## Rules
//! - At most one entry per name; `add` overwrites silently. The controller
//!   kills an existing entry before adding its replacement.
//! - `list` is a snapshot: it never observes a half-applied mutation, but may
//!   be stale by the time the caller acts on it. The run loop re-lists every
//!   tick, so staleness heals on its own.
//! - The lock is never held across a call into a service.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::services::ServiceRef;

/// Concurrent registry of services by name.
#[derive(Default)]
pub struct Registry {
    services: RwLock<HashMap<String, ServiceRef>>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the service registered under `name`.
    pub async fn get(&self, name: &str) -> Option<ServiceRef> {
        self.services.read().await.get(name).cloned()
    }

    /// Registers `svc` under `name`, returning the entry it replaced.
    pub async fn add(&self, name: impl Into<String>, svc: ServiceRef) -> Option<ServiceRef> {
        self.services.write().await.insert(name.into(), svc)
    }

    /// Removes and returns the entry under `name`.
    pub async fn remove(&self, name: &str) -> Option<ServiceRef> {
        self.services.write().await.remove(name)
    }

    /// Removes the entry under `name` only if it is still `svc`.
    ///
    /// Returns false if the name is absent or now maps to another instance.
    pub async fn remove_instance(&self, name: &str, svc: &ServiceRef) -> bool {
        let mut services = self.services.write().await;
        match services.get(name) {
            Some(current) if same_instance(current, svc) => {
                services.remove(name);
                true
            }
            _ => false,
        }
    }

    /// Returns sorted snapshot of registered names.
    pub async fn list(&self) -> Vec<String> {
        let services = self.services.read().await;
        let mut names: Vec<String> = services.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    pub async fn len(&self) -> usize {
        self.services.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.services.read().await.is_empty()
    }
}

fn same_instance(a: &ServiceRef, b: &ServiceRef) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}
