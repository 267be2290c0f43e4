//! # Lifecycle event fan-out.
//!
//! The controller owns one [`Bus`]; registration, kill, run and restart paths
//! publish into it and any number of observers read from
//! [`ServiceController::subscribe`](crate::ServiceController::subscribe).
//!
//! Publishing never waits. The ring buffer is shared by all receivers, so a
//! receiver that falls behind sees `RecvError::Lagged(n)` and resumes after
//! the `n` dropped events. Events sent while nobody listens are gone.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast sender of [`Event`]s, cloneable across units.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Sends `ev` to current receivers.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Opens a receiver positioned after the latest event.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
