//! # ghostshell
//!
//! Self-extensible module shell - discover plug-in modules and compose them
//! into one CLI.
//!
//! ghostshell does not know its own command surface at compile time. Builtin
//! modules register themselves in a constructor table, mounted modules are
//! TOML manifests picked up from a configured directory, and both satisfy
//! the same capability contract. The engine composes every declared command
//! into one hierarchical parser and routes each invocation to exactly one
//! module, while an observer bus carries the lifecycle events.
//!
//! ## Quick Start
//!
//! ```bash
//! # Install
//! cargo install ghostshell
//!
//! # See what is available
//! gsh
//!
//! # Inspect the whole module surface
//! gsh --report
//! ```

pub mod bus;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod module;
pub mod modules;
pub mod report;
pub mod scaffold;
pub mod tree;

// Re-export commonly used types
pub use bus::{AuditLog, Observer, ObserverBus};
pub use config::Config;
pub use context::ShellContext;
pub use module::{
    CommandDoc, CommandTable, Discovery, ExecRequest, ExecStatus, ManifestModule,
    ModuleDescriptor, ModuleError, ModuleManifest, ModuleMetadata, ModuleOrigin, ModuleRegistry,
    ModuleResult, ShellModule,
};
pub use report::Report;
pub use scaffold::ScaffoldGenerator;
pub use tree::{CommandNode, CommandTreeBuilder};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "ghostshell";

/// Short alias
pub const APP_ALIAS: &str = "gsh";
