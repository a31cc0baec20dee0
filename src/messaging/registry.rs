use super::{ClientEvent, EventKind};
use crate::infrastructure::sync::{read, write};
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;

/// Callback registered for an event
pub type Listener = Arc<dyn Fn(&ClientEvent) + Send + Sync + 'static>;

/// Named-event pub/sub store.
///
/// Callbacks for one event run in registration order. Registrations are not
/// deduplicated: the same `Listener` registered twice is invoked twice per emit.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: RwLock<HashMap<EventKind, Vec<Listener>>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `listener` to the list for `kind`.
    pub fn on(&self, kind: EventKind, listener: Listener) {
        let mut listeners = write(&self.listeners);
        listeners.entry(kind).or_default().push(listener);
    }

    /// Convenience wrapper around [`on`](Self::on) that returns the stored handle for a later
    /// [`off`](Self::off).
    pub fn on_fn<F>(&self, kind: EventKind, f: F) -> Listener
    where
        F: Fn(&ClientEvent) + Send + Sync + 'static,
    {
        let listener: Listener = Arc::new(f);
        self.on(kind, Arc::clone(&listener));
        listener
    }

    /// Removes every registration of `listener` (by pointer identity) for `kind`.
    pub fn off(&self, kind: EventKind, listener: &Listener) {
        let mut listeners = write(&self.listeners);
        if let Some(list) = listeners.get_mut(&kind) {
            list.retain(|registered| !Arc::ptr_eq(registered, listener));
        }
    }

    /// Returns a receiver fed with every event of `kind` emitted from now on.
    ///
    /// The forwarding listener stays registered; once the receiver is dropped it
    /// silently discards events.
    pub fn receiver(&self, kind: EventKind) -> mpsc::UnboundedReceiver<ClientEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.on_fn(kind, move |event| {
            if tx.send(event.clone()).is_err() {
                tracing::trace!("Receiver for '{}' dropped", event.kind());
            }
        });
        rx
    }

    /// Invokes every listener registered for the event's kind.
    ///
    /// A panicking listener is logged and skipped; the rest still run.
    pub fn emit(&self, event: &ClientEvent) {
        let kind = event.kind();
        // Snapshot so listeners may call on/off without deadlocking
        let snapshot: Vec<Listener> = {
            let listeners = read(&self.listeners);
            match listeners.get(&kind) {
                Some(list) => list.clone(),
                None => return,
            }
        };

        for listener in snapshot {
            if catch_unwind(AssertUnwindSafe(|| listener(event))).is_err() {
                tracing::error!("Listener for event '{}' panicked", kind);
            }
        }
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        let listeners = read(&self.listeners);
        listeners.get(&kind).map_or(0, Vec::len)
    }
}
