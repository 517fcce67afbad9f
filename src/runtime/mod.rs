//! Framework runtime.
//!
//! ## Architecture
//!
//! - `HostContext` - everything the framework needs from the host, passed
//!   in explicitly at construction
//! - `Framework` - owns the registries and drives the start/stop sequence
//!   around an [`Extension`]
//!
//! The host calls [`Framework::on_start`] once during its own startup and
//! [`Framework::on_stop`] during teardown. Registries exist before any
//! extension code runs, and services are torn down before `on_stop`
//! returns.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

use crate::commands::{CommandRegistry, CommandTable};
use crate::config::{ConfigManager, Settings};
use crate::events::{EventBus, EventRegistry};
use crate::service::ServiceRegistry;

/// Host collaborators handed to the framework at construction.
pub struct HostContext {
    pub settings: Settings,
    pub commands: Arc<dyn CommandTable>,
    pub events: Arc<dyn EventBus>,
}

/// Application-specific setup, implemented by the embedding extension.
///
/// `initialize` runs before any registration hook; a returned error aborts
/// startup. The `register_*` hooks default to empty so extensions only
/// implement what they use.
pub trait Extension: Send + Sync {
    fn initialize(&self, framework: &Framework) -> anyhow::Result<()>;

    fn register_commands(&self, _commands: &CommandRegistry) {}

    fn register_events(&self, _events: &EventRegistry) {}

    fn register_services(&self, _services: &ServiceRegistry) {}

    /// Runs after all registration hooks succeed.
    fn post_initialize(&self, _framework: &Framework) -> anyhow::Result<()> {
        Ok(())
    }

    /// Runs before services are stopped.
    fn pre_shutdown(&self, _framework: &Framework) {}

    /// Runs after the framework has torn down services and listeners.
    fn shutdown(&self, _framework: &Framework) {}
}

/// The framework core: registries plus lifecycle orchestration.
pub struct Framework {
    settings: Settings,
    config: ConfigManager,
    commands: CommandRegistry,
    events: EventRegistry,
    services: ServiceRegistry,
    initialized: AtomicBool,
}

impl Framework {
    /// Build the framework and its registries from host collaborators.
    pub fn new(host: HostContext) -> Self {
        let config = ConfigManager::new(host.settings.data_dir.clone());
        Self {
            settings: host.settings,
            config,
            commands: CommandRegistry::new(host.commands),
            events: EventRegistry::new(host.events),
            services: ServiceRegistry::new(),
            initialized: AtomicBool::new(false),
        }
    }

    /// Run the extension's startup sequence.
    ///
    /// Order: `initialize`, command/event/service registration,
    /// `post_initialize`. An error from `initialize` or `post_initialize`
    /// aborts startup and is returned to the host; registries may then be
    /// partially populated, and the host should follow up with
    /// [`on_stop`](Self::on_stop) if it registered anything.
    pub fn on_start(&self, extension: &dyn Extension) -> anyhow::Result<()> {
        if self.initialized.load(Ordering::Acquire) {
            warn!("on_start called while already initialized");
            return Ok(());
        }

        extension.initialize(self)?;
        extension.register_commands(&self.commands);
        extension.register_events(&self.events);
        extension.register_services(&self.services);
        extension.post_initialize(self)?;

        self.initialized.store(true, Ordering::Release);
        info!(
            "Framework initialized ({} services, {} commands, {} listeners)",
            self.services.count(),
            self.commands.count(),
            self.events.count()
        );
        Ok(())
    }

    /// Run the extension's shutdown sequence.
    ///
    /// No-op unless a prior [`on_start`](Self::on_start) completed. Always
    /// finishes: service stop failures are logged inside the registry and
    /// never propagate.
    pub fn on_stop(&self, extension: &dyn Extension) {
        if !self.initialized.swap(false, Ordering::AcqRel) {
            return;
        }

        extension.pre_shutdown(self);
        self.services.stop_all();
        self.events.unregister_all();
        extension.shutdown(self);

        info!("Framework shutdown completed");
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn config(&self) -> &ConfigManager {
        &self.config
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    pub fn events(&self) -> &EventRegistry {
        &self.events
    }

    pub fn services(&self) -> &ServiceRegistry {
        &self.services
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for Framework {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Framework")
            .field("initialized", &self.is_initialized())
            .field("services", &self.services.count())
            .field("commands", &self.commands.count())
            .field("listeners", &self.events.count())
            .finish()
    }
}
