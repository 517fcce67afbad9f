//! Command registration facade.
//!
//! The framework does not own a command table; the host does. This module
//! tracks what the extension has registered and forwards the actual
//! binding to the host through the [`CommandTable`] trait, so the core
//! stays testable without a running host.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::warn;

/// A single command invocation as delivered by the host.
#[derive(Debug, Clone)]
pub struct CommandInvocation {
    /// Identity of whoever issued the command.
    pub sender: String,
    /// Arguments following the command name.
    pub args: Vec<String>,
}

/// Handles one named command.
pub trait CommandHandler: Send + Sync {
    /// Execute the command. Returns `false` to signal a usage error back
    /// to the host.
    fn execute(&self, invocation: &CommandInvocation) -> bool;

    /// Permission node required to run the command, if any.
    fn permission(&self) -> Option<&str> {
        None
    }

    /// Usage string shown on a `false` return from `execute`.
    fn usage(&self) -> &str {
        ""
    }
}

/// The host's command table, consumed by the facade.
///
/// `bind` fails when the host has no declaration for the named command
/// (e.g. it is missing from the host's manifest).
pub trait CommandTable: Send + Sync {
    fn bind(&self, name: &str, handler: Arc<dyn CommandHandler>) -> bool;
    fn unbind(&self, name: &str) -> bool;
    /// Aliases the host declares for a command.
    fn aliases(&self, name: &str) -> Vec<String>;
}

/// Tracks registered commands and forwards binding to the host.
#[derive(Clone)]
pub struct CommandRegistry {
    table: Arc<dyn CommandTable>,
    registered: Arc<RwLock<HashSet<String>>>,
    aliases: Arc<RwLock<HashMap<String, Vec<String>>>>,
}

impl CommandRegistry {
    pub fn new(table: Arc<dyn CommandTable>) -> Self {
        Self {
            table,
            registered: Arc::new(RwLock::new(HashSet::new())),
            aliases: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a handler for a host-declared command.
    ///
    /// Returns `false` (with a warning) for an empty name or when the host
    /// rejects the binding.
    pub fn register(&self, name: &str, handler: Arc<dyn CommandHandler>) -> bool {
        let name = name.trim();
        if name.is_empty() {
            warn!("Cannot register command with empty name");
            return false;
        }

        if !self.table.bind(name, handler) {
            warn!("Command not declared by host: {}", name);
            return false;
        }

        self.registered.write().insert(name.to_string());

        let aliases = self.table.aliases(name);
        if !aliases.is_empty() {
            self.aliases.write().insert(name.to_string(), aliases);
        }

        true
    }

    /// Unbind a previously registered command.
    ///
    /// Returns `false` for a name this registry never registered.
    pub fn unregister(&self, name: &str) -> bool {
        if !self.registered.read().contains(name) {
            return false;
        }

        self.table.unbind(name);
        self.registered.write().remove(name);
        self.aliases.write().remove(name);
        true
    }

    /// Unbind everything this registry registered.
    pub fn unregister_all(&self) {
        let names: Vec<String> = self.registered.read().iter().cloned().collect();
        for name in names {
            self.unregister(&name);
        }
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.registered.read().contains(name)
    }

    /// Host-declared aliases recorded at registration time.
    pub fn aliases(&self, name: &str) -> Vec<String> {
        self.aliases.read().get(name).cloned().unwrap_or_default()
    }

    pub fn registered_commands(&self) -> Vec<String> {
        self.registered.read().iter().cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.registered.read().len()
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("count", &self.count())
            .finish()
    }
}
