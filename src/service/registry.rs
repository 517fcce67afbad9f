//! Service registry - ordered lifecycle management for framework services.

use std::any::{Any, TypeId};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{error, info, warn};

use super::Service;
use crate::error::Error;

/// Insertion-ordered registry of running services, one per concrete type.
///
/// Registration starts the service; a service whose `start` fails is never
/// added, so the registry only ever holds running services. Shutdown is
/// best-effort: a failing `stop` is logged and the entry removed so one
/// faulty service cannot block teardown of the rest.
///
/// Registration is serialized internally, so two racing `register` calls
/// for the same kind cannot both succeed.
#[derive(Clone, Default)]
pub struct ServiceRegistry {
    services: Arc<Mutex<Vec<RegisteredService>>>,
}

/// Internal entry keeping both vtable views of one service instance.
struct RegisteredService {
    type_id: TypeId,
    type_name: &'static str,
    service: Arc<dyn Service>,
    any: Arc<dyn Any + Send + Sync>,
}

impl ServiceRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            services: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Start and register a service.
    ///
    /// Returns `false` without starting if a service of the same concrete
    /// type is already registered. Returns `false` if `start` fails; the
    /// registry holds no reference to a service whose start failed, so
    /// cleanup of its indeterminate state is the caller's responsibility.
    pub fn register<T>(&self, service: Arc<T>) -> bool
    where
        T: Service,
    {
        match self.try_register(service) {
            Ok(()) => true,
            Err(e @ Error::AlreadyRegistered(_)) => {
                warn!("{}", e);
                false
            }
            Err(e) => {
                error!("{}", e);
                false
            }
        }
    }

    /// [`register`](Self::register) for callers that need the failure
    /// reason as a value instead of a logged boolean.
    pub fn try_register<T>(&self, service: Arc<T>) -> Result<(), Error>
    where
        T: Service,
    {
        let type_id = TypeId::of::<T>();
        let type_name = std::any::type_name::<T>();

        // Lock held across start(): check-and-insert must be atomic so two
        // same-kind registrations cannot both succeed.
        let mut services = self.services.lock();

        if services.iter().any(|s| s.type_id == type_id) {
            return Err(Error::AlreadyRegistered(type_name));
        }

        if let Err(e) = service.start() {
            return Err(Error::Lifecycle {
                service: service.name().to_string(),
                reason: format!("{:#}", e),
            });
        }

        info!("Service registered: {}", service.name());
        services.push(RegisteredService {
            type_id,
            type_name,
            service: service.clone(),
            any: service,
        });
        Ok(())
    }

    /// Get a registered service by its concrete type.
    pub fn get<T>(&self) -> Option<Arc<T>>
    where
        T: Service,
    {
        let type_id = TypeId::of::<T>();
        let services = self.services.lock();
        services
            .iter()
            .find(|s| s.type_id == type_id)
            .and_then(|s| Arc::clone(&s.any).downcast::<T>().ok())
    }

    /// Stop and remove a service by its concrete type.
    ///
    /// Returns `false` only when no service of that kind is registered. A
    /// `stop` error is logged and the entry is removed regardless, so a
    /// faulty stop cannot leave a zombie registration behind.
    pub fn stop<T>(&self) -> bool
    where
        T: Service,
    {
        let type_id = TypeId::of::<T>();

        let removed = {
            let mut services = self.services.lock();
            match services.iter().position(|s| s.type_id == type_id) {
                Some(index) => services.remove(index),
                None => return false,
            }
        };

        stop_entry(&removed);
        true
    }

    /// Stop every registered service in registration order, then clear the
    /// registry.
    ///
    /// A failure stopping one service never prevents stopping the others,
    /// and never propagates to the caller.
    pub fn stop_all(&self) {
        let drained: Vec<RegisteredService> = {
            let mut services = self.services.lock();
            services.drain(..).collect()
        };

        for entry in &drained {
            stop_entry(entry);
        }
    }

    /// Whether a service of the given concrete type is registered.
    pub fn is_registered<T>(&self) -> bool
    where
        T: Service,
    {
        let type_id = TypeId::of::<T>();
        self.services.lock().iter().any(|s| s.type_id == type_id)
    }

    /// Number of registered services.
    pub fn count(&self) -> usize {
        self.services.lock().len()
    }

    /// Names of all registered services, in registration order.
    pub fn service_names(&self) -> Vec<String> {
        self.services
            .lock()
            .iter()
            .map(|s| s.service.name().to_string())
            .collect()
    }
}

fn stop_entry(entry: &RegisteredService) {
    match entry.service.stop() {
        Ok(()) => info!("Service stopped: {}", entry.service.name()),
        Err(e) => error!(
            "Error stopping service {} ({}): {:#}",
            entry.service.name(),
            entry.type_name,
            e
        ),
    }
}

impl std::fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let services = self.services.lock();
        f.debug_struct("ServiceRegistry")
            .field("count", &services.len())
            .field(
                "services",
                &services.iter().map(|s| s.type_name).collect::<Vec<_>>(),
            )
            .finish()
    }
}
