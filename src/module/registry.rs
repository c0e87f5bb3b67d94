//! Ordered registry of discovered modules.
//!
//! Registration order is preserved, keys are the lower-cased module names
//! and are unique: registering a name twice replaces the earlier entry in
//! place and publishes a warning on the bus.

use super::{CommandTable, ModuleDescriptor, ModuleOrigin, ShellModule};
use crate::bus::ObserverBus;

/// A module plus its registration bookkeeping.
pub struct RegisteredModule {
    /// Lower-cased registry key.
    pub name: String,
    /// Where the module came from.
    pub origin: ModuleOrigin,
    /// The module itself.
    pub module: Box<dyn ShellModule>,
}

impl std::fmt::Debug for RegisteredModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredModule")
            .field("name", &self.name)
            .field("origin", &self.origin)
            .finish()
    }
}

/// Registry of all modules known to the shell.
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    modules: Vec<RegisteredModule>,
}

impl ModuleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module under the lower-cased form of its name.
    ///
    /// A repeated name replaces the earlier entry in place, keeping its
    /// position, and the replacement is announced on the bus.
    pub fn register(
        &mut self,
        module: Box<dyn ShellModule>,
        origin: ModuleOrigin,
        bus: &mut ObserverBus,
    ) {
        let name = module.name().to_lowercase();

        if let Some(existing) = self.modules.iter_mut().find(|m| m.name == name) {
            let message = format!(
                "Module '{}' redefined: {} definition replaces {}",
                name,
                origin.as_str(),
                existing.origin.as_str()
            );
            tracing::warn!(module = %name, "{message}");
            bus.publish(&message);

            existing.origin = origin;
            existing.module = module;
            return;
        }

        tracing::debug!(module = %name, origin = origin.as_str(), "Module registered");
        self.modules.push(RegisteredModule { name, origin, module });
    }

    /// Register every discovered module in order.
    pub fn populate(
        &mut self,
        discovered: Vec<(Box<dyn ShellModule>, ModuleOrigin)>,
        bus: &mut ObserverBus,
    ) {
        for (module, origin) in discovered {
            self.register(module, origin, bus);
        }
    }

    /// Look up a module by name, case-insensitively.
    pub fn get(&self, name: &str) -> Option<&RegisteredModule> {
        let name = name.to_lowercase();
        self.modules.iter().find(|m| m.name == name)
    }

    /// Mutable lookup, case-insensitive.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut RegisteredModule> {
        let name = name.to_lowercase();
        self.modules.iter_mut().find(|m| m.name == name)
    }

    /// Whether a module is registered under this name.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Registry keys in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.name.as_str()).collect()
    }

    /// All entries in registration order.
    pub fn all(&self) -> &[RegisteredModule] {
        &self.modules
    }

    /// Descriptors for every registered module, in registration order.
    pub fn descriptors(&self) -> Vec<ModuleDescriptor> {
        self.modules.iter().map(|m| ModuleDescriptor::from_module(m.module.as_ref())).collect()
    }

    /// The ordered command table: for every module, its command names with
    /// their subcommand names.
    pub fn command_table(&self) -> CommandTable {
        self.descriptors()
            .into_iter()
            .map(|descriptor| {
                let commands = descriptor
                    .commands
                    .iter()
                    .map(|command| {
                        let subcommands = descriptor
                            .subcommands
                            .iter()
                            .find(|(name, _)| name == command)
                            .map(|(_, subs)| subs.clone())
                            .unwrap_or_default();
                        (command.clone(), subcommands)
                    })
                    .collect();
                (descriptor.name, commands)
            })
            .collect()
    }

    /// Number of registered modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
