//! The module system: capability contract, discovery, and registry.
//!
//! A module is a self-contained unit exposing a set of CLI commands. Modules
//! come from two places: a builtin registration table compiled into the
//! binary, and an optional mounted directory of TOML manifests added at
//! runtime. Both are validated against the same capability contract and end
//! up in the [`ModuleRegistry`](registry::ModuleRegistry).

mod discovery;
mod error;
mod manifest;
mod registry;

pub use discovery::{Discovery, ModuleConstructor};
pub use error::{ModuleError, ModuleResult};
pub use manifest::{
    ManifestCommand, ManifestInfo, ManifestModule, ManifestSubcommand, ModuleManifest,
};
pub use registry::{ModuleRegistry, RegisteredModule};

use clap::Command;
use serde::{Deserialize, Serialize};

use crate::bus::ObserverBus;

/// Where a module was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleOrigin {
    /// Registered in the compiled-in builtin table.
    Builtin,
    /// Loaded from the externally-mounted module directory.
    Mounted,
}

impl ModuleOrigin {
    /// Short label used in lifecycle events and namespacing.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Builtin => "builtin",
            Self::Mounted => "mounted",
        }
    }
}

/// Optional module metadata surfaced in the introspection report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleMetadata {
    /// One-line module description.
    #[serde(default)]
    pub description: Option<String>,
    /// Module version.
    #[serde(default)]
    pub version: Option<String>,
    /// Module author.
    #[serde(default)]
    pub author: Option<String>,
    /// Module license.
    #[serde(default)]
    pub license: Option<String>,
}

/// Documentation for one command and its subcommands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDoc {
    /// Command name.
    pub command: String,
    /// Command description.
    pub description: String,
    /// Ordered subcommand name/description pairs.
    #[serde(default)]
    pub subcommands: Vec<(String, String)>,
}

/// Ordered command table: every module's name with its command names and
/// their subcommand names. The render context for shell wrappers.
pub type CommandTable = Vec<(String, Vec<(String, Vec<String>)>)>;

/// A parsed invocation handed to exactly one module.
#[derive(Debug)]
pub struct ExecRequest<'a> {
    /// The resolved command name under the module's node.
    pub command: &'a str,
    /// Parsed matches for that command, including any deeper subcommand.
    pub matches: &'a clap::ArgMatches,
    /// Command table snapshot of the whole registry at dispatch time.
    pub table: &'a CommandTable,
}

/// Outcome of a module execution entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecStatus {
    /// The module handled the invocation.
    Done,
    /// The module declares commands for documentation only and cannot
    /// execute them. Observable but non-fatal.
    NotDispatchable,
}

/// Capability contract every module must satisfy.
///
/// The required methods supply the command and subcommand documentation the
/// engine composes into the CLI and the introspection report. The provided
/// methods are optional in the contract sense: the defaults make a module
/// documentable but not dispatchable, and give it a command tree derived
/// from its own declared documentation.
pub trait ShellModule {
    /// Module name; the registry key is its lower-cased form.
    fn name(&self) -> &str;

    /// Free-text documentation used as CLI help.
    fn doc(&self) -> &str;

    /// Ordered command name/description pairs.
    fn command_docs(&self) -> Vec<(String, String)>;

    /// Per-command subcommand documentation.
    fn subcommand_docs(&self) -> Vec<CommandDoc>;

    /// Version/author/license metadata for reporting.
    fn metadata(&self) -> ModuleMetadata {
        ModuleMetadata::default()
    }

    /// Attach this module's command nodes to its top-level node.
    ///
    /// The default derives the nodes from [`command_docs`](Self::command_docs)
    /// and [`subcommand_docs`](Self::subcommand_docs), which keeps the parser
    /// tree structurally consistent with the declared documentation. An error
    /// is caught by the tree builder: the module keeps its bare node and
    /// stays registered.
    fn augment_command(&self, cmd: Command) -> anyhow::Result<Command> {
        Ok(cmd.subcommands(docs_to_subcommands(&self.command_docs(), &self.subcommand_docs())))
    }

    /// Execute a parsed invocation.
    ///
    /// The default marks the module as documentable-only. Implementations
    /// publish lifecycle events through `bus` and keep their own ordered
    /// copy, retrievable via [`logs`](Self::logs).
    fn execute(&mut self, request: &ExecRequest<'_>, bus: &mut ObserverBus) -> anyhow::Result<ExecStatus> {
        let _ = (request, bus);
        Ok(ExecStatus::NotDispatchable)
    }

    /// The module's private ordered log of everything it published.
    fn logs(&self) -> &[String] {
        &[]
    }
}

/// Snapshot of a module's shape, derived from a live instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    /// Lower-cased module name.
    pub name: String,
    /// Module help text.
    pub doc: String,
    /// Ordered command names.
    pub commands: Vec<String>,
    /// Command name to ordered subcommand names.
    pub subcommands: Vec<(String, Vec<String>)>,
    /// Optional metadata.
    pub metadata: ModuleMetadata,
}

impl ModuleDescriptor {
    /// Derive a descriptor from a live module.
    pub fn from_module(module: &dyn ShellModule) -> Self {
        let commands = module.command_docs().into_iter().map(|(name, _)| name).collect();
        let subcommands = module
            .subcommand_docs()
            .into_iter()
            .map(|doc| (doc.command, doc.subcommands.into_iter().map(|(name, _)| name).collect()))
            .collect();

        Self {
            name: module.name().to_lowercase(),
            doc: module.doc().to_string(),
            commands,
            subcommands,
            metadata: module.metadata(),
        }
    }
}

/// Build clap subcommand nodes from declared documentation.
///
/// Commands listed in `command_docs` become leaf nodes unless
/// `subcommand_docs` declares children for them; commands that appear only
/// in `subcommand_docs` are appended after the documented ones.
pub(crate) fn docs_to_subcommands(
    command_docs: &[(String, String)],
    subcommand_docs: &[CommandDoc],
) -> Vec<Command> {
    let mut nodes = Vec::new();

    for (name, about) in command_docs {
        let mut node = Command::new(name.clone()).about(about.clone());
        if let Some(doc) = subcommand_docs.iter().find(|d| &d.command == name) {
            for (sub, sub_about) in &doc.subcommands {
                node = node.subcommand(Command::new(sub.clone()).about(sub_about.clone()));
            }
        }
        nodes.push(node);
    }

    for doc in subcommand_docs {
        if command_docs.iter().any(|(name, _)| name == &doc.command) {
            continue;
        }
        let mut node = Command::new(doc.command.clone()).about(doc.description.clone());
        for (sub, sub_about) in &doc.subcommands {
            node = node.subcommand(Command::new(sub.clone()).about(sub_about.clone()));
        }
        nodes.push(node);
    }

    nodes
}
