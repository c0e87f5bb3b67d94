//! Process-wide shell context.
//!
//! The context owns everything the shell needs for one process lifetime:
//! configuration, the observer bus, and the populated module registry. It is
//! built once in `main` and passed by reference from there on.

use crate::bus::{AuditLog, ObserverBus};
use crate::config::Config;
use crate::dispatch;
use crate::module::{Discovery, ModuleRegistry};
use crate::modules::register_builtins;

/// Everything the shell carries through one invocation.
pub struct ShellContext {
    /// Loaded configuration.
    pub config: Config,
    /// The lifecycle and audit event bus.
    pub bus: ObserverBus,
    /// All discovered modules.
    pub registry: ModuleRegistry,
    audit: AuditLog,
}

impl std::fmt::Debug for ShellContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShellContext")
            .field("modules", &self.registry.len())
            .field("observers", &self.bus.observer_count())
            .finish()
    }
}

impl ShellContext {
    /// Build the context: subscribe the audit log, run discovery, and
    /// populate the registry.
    pub fn bootstrap(config: Config) -> Self {
        let mut bus = ObserverBus::new();
        let audit = AuditLog::new();
        bus.subscribe(Box::new(audit.clone()));

        let discovery = register_builtins(Discovery::from_config(&config));
        let mut registry = ModuleRegistry::new();
        registry.populate(discovery.discover(&config), &mut bus);

        tracing::debug!(modules = registry.len(), "Shell context ready");
        Self { config, bus, registry, audit }
    }

    /// Dispatch one invocation. Returns the process exit code.
    pub fn run(&mut self, args: &[String]) -> anyhow::Result<i32> {
        dispatch::run(
            args,
            &mut self.registry,
            &mut self.bus,
            self.config.modules.namespace_mounted,
        )
    }

    /// Every event delivered to the audit log so far.
    pub fn audit_entries(&self) -> Vec<String> {
        self.audit.entries()
    }
}
