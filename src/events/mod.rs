//! Event registration facade.
//!
//! Listeners subscribe to the host's publish/subscribe mechanism through
//! the [`EventBus`] trait; the registry remembers what it subscribed so it
//! can tear everything down at shutdown.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::warn;

/// An event delivered by the host.
///
/// The payload is an opaque document; listeners pick out what they need.
#[derive(Debug, Clone)]
pub struct HostEvent {
    pub name: String,
    pub payload: serde_json::Value,
}

impl HostEvent {
    pub fn new(name: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }
}

/// Receives host events.
pub trait Listener: Send + Sync {
    fn on_event(&self, event: &HostEvent);
}

/// The host's publish/subscribe mechanism, consumed by the facade.
pub trait EventBus: Send + Sync {
    fn subscribe(&self, listener: Arc<dyn Listener>);
    fn unsubscribe(&self, listener: &Arc<dyn Listener>);
}

/// Tracks subscribed listeners and forwards to the host bus.
///
/// Listener identity is by allocation (`Arc::ptr_eq`): registering the
/// same `Arc` twice is rejected, two separate instances of one type are
/// distinct listeners.
#[derive(Clone)]
pub struct EventRegistry {
    bus: Arc<dyn EventBus>,
    listeners: Arc<RwLock<Vec<Arc<dyn Listener>>>>,
}

impl EventRegistry {
    pub fn new(bus: Arc<dyn EventBus>) -> Self {
        Self {
            bus,
            listeners: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Subscribe a listener with the host.
    ///
    /// Returns `false` (with a warning) if this exact listener is already
    /// registered.
    pub fn register(&self, listener: Arc<dyn Listener>) -> bool {
        {
            let listeners = self.listeners.read();
            if listeners.iter().any(|l| Arc::ptr_eq(l, &listener)) {
                warn!("Listener already registered");
                return false;
            }
        }

        self.bus.subscribe(Arc::clone(&listener));
        self.listeners.write().push(listener);
        true
    }

    /// Unsubscribe a single listener.
    ///
    /// Returns `false` if it was never registered here.
    pub fn unregister(&self, listener: &Arc<dyn Listener>) -> bool {
        let mut listeners = self.listeners.write();
        let Some(index) = listeners.iter().position(|l| Arc::ptr_eq(l, listener)) else {
            return false;
        };

        let removed = listeners.remove(index);
        self.bus.unsubscribe(&removed);
        true
    }

    /// Unsubscribe everything this registry registered.
    pub fn unregister_all(&self) {
        let drained: Vec<Arc<dyn Listener>> = {
            let mut listeners = self.listeners.write();
            listeners.drain(..).collect()
        };

        for listener in &drained {
            self.bus.unsubscribe(listener);
        }
    }

    pub fn is_registered(&self, listener: &Arc<dyn Listener>) -> bool {
        self.listeners
            .read()
            .iter()
            .any(|l| Arc::ptr_eq(l, listener))
    }

    pub fn count(&self) -> usize {
        self.listeners.read().len()
    }
}

impl std::fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRegistry")
            .field("count", &self.count())
            .finish()
    }
}
