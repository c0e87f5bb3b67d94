//! Introspection report over the module registry.
//!
//! The report is the machine-readable view of everything the shell knows:
//! per-module metadata, documentation, and the declared command shape.
//! Keys are sorted so the same registry always serializes to the same
//! bytes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::module::{ModuleOrigin, ModuleRegistry};

/// Full introspection report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Reporting shell version.
    pub version: String,
    /// Module name to module report.
    pub modules: BTreeMap<String, ModuleReport>,
}

/// Report entry for one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleReport {
    /// One-line description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Module version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Module author.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Module license.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    /// Module help text.
    pub doc: String,
    /// Where the module was discovered.
    pub origin: ModuleOrigin,
    /// Command names in declaration order.
    pub commands: Vec<String>,
    /// Command name to subcommand names, sorted by command name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub subcommands: BTreeMap<String, Vec<String>>,
}

impl Report {
    /// Derive the report from the registry.
    pub fn from_registry(registry: &ModuleRegistry) -> Self {
        let mut modules = BTreeMap::new();

        for entry in registry.all() {
            let descriptor = crate::module::ModuleDescriptor::from_module(entry.module.as_ref());
            let metadata = descriptor.metadata;

            modules.insert(
                descriptor.name,
                ModuleReport {
                    description: metadata.description,
                    version: metadata.version,
                    author: metadata.author,
                    license: metadata.license,
                    doc: descriptor.doc,
                    origin: entry.origin,
                    commands: descriptor.commands,
                    subcommands: descriptor.subcommands.into_iter().collect(),
                },
            );
        }

        Self { version: crate::tree::version_string(), modules }
    }

    /// Render as pretty-printed JSON.
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
