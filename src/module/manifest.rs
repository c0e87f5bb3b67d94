//! Mounted module manifests.
//!
//! A mounted module is a TOML file dropped into the mounted module
//! directory. The manifest declares the module's metadata and its command
//! tree; commands may carry a shell line that makes them dispatchable.

use std::path::Path;
use std::process::{Command as ProcessCommand, Stdio};

use serde::{Deserialize, Serialize};

use super::{
    CommandDoc, ExecRequest, ExecStatus, ModuleError, ModuleMetadata, ModuleResult, ShellModule,
};
use crate::bus::ObserverBus;

/// Parsed module manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleManifest {
    /// Module identity and metadata.
    pub module: ManifestInfo,
    /// Commands the module contributes.
    #[serde(default, rename = "command")]
    pub commands: Vec<ManifestCommand>,
}

/// `[module]` section of a manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestInfo {
    /// Module name (unique identifier).
    pub name: String,
    /// One-line description.
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
    /// Help text for the module node. Falls back to the description.
    #[serde(default)]
    pub doc: Option<String>,
}

/// One `[[command]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestCommand {
    /// Command name.
    pub name: String,
    /// Command description, used as CLI help.
    pub description: String,
    /// Shell line executed when this command is dispatched. Absent means
    /// the command is documentation-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<String>,
    /// Nested subcommands.
    #[serde(default, rename = "subcommand", skip_serializing_if = "Vec::is_empty")]
    pub subcommands: Vec<ManifestSubcommand>,
}

/// One `[[command.subcommand]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestSubcommand {
    /// Subcommand name.
    pub name: String,
    /// Subcommand description.
    pub description: String,
    /// Shell line executed when this subcommand is dispatched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<String>,
}

impl ModuleManifest {
    /// Parse a manifest from a TOML string.
    pub fn from_toml(content: &str) -> ModuleResult<Self> {
        toml::from_str(content).map_err(|e| ModuleError::InvalidManifest(e.to_string()))
    }

    /// Parse a manifest from a file.
    pub fn from_file(path: &Path) -> ModuleResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> ModuleResult<String> {
        toml::to_string_pretty(self).map_err(|e| ModuleError::InvalidManifest(e.to_string()))
    }

    /// Validate the manifest.
    pub fn validate(&self) -> ModuleResult<()> {
        if self.module.name.is_empty() {
            return Err(ModuleError::InvalidManifest("module name is required".to_string()));
        }

        if !self.module.name.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_') {
            return Err(ModuleError::InvalidManifest(
                "module name must contain only alphanumeric characters, hyphens, and underscores"
                    .to_string(),
            ));
        }

        let mut seen = Vec::new();
        for command in &self.commands {
            if command.name.is_empty() {
                return Err(ModuleError::InvalidManifest(format!(
                    "module '{}' declares a command with an empty name",
                    self.module.name
                )));
            }
            if seen.contains(&command.name.as_str()) {
                return Err(ModuleError::InvalidManifest(format!(
                    "module '{}' declares command '{}' more than once",
                    self.module.name, command.name
                )));
            }
            seen.push(command.name.as_str());
        }

        Ok(())
    }

    /// Whether any command or subcommand carries a shell line.
    pub fn is_dispatchable(&self) -> bool {
        self.commands
            .iter()
            .any(|c| c.run.is_some() || c.subcommands.iter().any(|s| s.run.is_some()))
    }
}

/// A mounted module backed by its manifest.
///
/// The manifest supplies the documentation; commands with a `run` line are
/// executed through the platform shell. Without any `run` line the module
/// is documentable-only and `execute` reports
/// [`ExecStatus::NotDispatchable`].
pub struct ManifestModule {
    manifest: ModuleManifest,
    logs: Vec<String>,
}

impl std::fmt::Debug for ManifestModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManifestModule")
            .field("name", &self.manifest.module.name)
            .field("commands", &self.manifest.commands.len())
            .finish()
    }
}

impl ManifestModule {
    /// Wrap a validated manifest.
    pub fn new(manifest: ModuleManifest) -> ModuleResult<Self> {
        manifest.validate()?;
        Ok(Self { manifest, logs: Vec::new() })
    }

    /// Load and validate a manifest file.
    pub fn from_file(path: &Path) -> ModuleResult<Self> {
        Self::new(ModuleManifest::from_file(path)?)
    }

    /// The underlying manifest.
    pub fn manifest(&self) -> &ModuleManifest {
        &self.manifest
    }

    /// Resolve the shell line for a command, preferring a matched
    /// subcommand's own line over the command's.
    fn run_line(&self, command: &str, subcommand: Option<&str>) -> Option<&str> {
        let entry = self.manifest.commands.iter().find(|c| c.name == command)?;
        if let Some(sub) = subcommand {
            if let Some(line) =
                entry.subcommands.iter().find(|s| s.name == sub).and_then(|s| s.run.as_deref())
            {
                return Some(line);
            }
        }
        entry.run.as_deref()
    }
}

impl ShellModule for ManifestModule {
    fn name(&self) -> &str {
        &self.manifest.module.name
    }

    fn doc(&self) -> &str {
        self.manifest
            .module
            .doc
            .as_deref()
            .or(self.manifest.module.description.as_deref())
            .unwrap_or("Mounted module.")
    }

    fn command_docs(&self) -> Vec<(String, String)> {
        self.manifest.commands.iter().map(|c| (c.name.clone(), c.description.clone())).collect()
    }

    fn subcommand_docs(&self) -> Vec<CommandDoc> {
        self.manifest
            .commands
            .iter()
            .filter(|c| !c.subcommands.is_empty())
            .map(|c| CommandDoc {
                command: c.name.clone(),
                description: c.description.clone(),
                subcommands: c
                    .subcommands
                    .iter()
                    .map(|s| (s.name.clone(), s.description.clone()))
                    .collect(),
            })
            .collect()
    }

    fn metadata(&self) -> ModuleMetadata {
        ModuleMetadata {
            description: self.manifest.module.description.clone(),
            version: self.manifest.module.version.clone(),
            author: self.manifest.module.author.clone(),
            license: self.manifest.module.license.clone(),
        }
    }

    fn execute(
        &mut self,
        request: &ExecRequest<'_>,
        bus: &mut ObserverBus,
    ) -> anyhow::Result<ExecStatus> {
        let subcommand = request.matches.subcommand_name();
        let Some(line) = self.run_line(request.command, subcommand) else {
            return Ok(ExecStatus::NotDispatchable);
        };
        let line = line.to_string();

        let event = format!(
            "Executing command '{}' in module '{}'",
            request.command,
            self.manifest.module.name.to_lowercase()
        );
        bus.publish(&event);
        self.logs.push(event);

        let (shell, shell_arg) = get_shell();
        let status = ProcessCommand::new(shell)
            .arg(shell_arg)
            .arg(&line)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()?;

        if !status.success() {
            anyhow::bail!(
                "command '{}' in module '{}' exited with {}",
                request.command,
                self.manifest.module.name.to_lowercase(),
                status
            );
        }

        Ok(ExecStatus::Done)
    }

    fn logs(&self) -> &[String] {
        &self.logs
    }
}

/// Get the shell and argument for the current platform.
fn get_shell() -> (&'static str, &'static str) {
    if cfg!(target_os = "windows") {
        ("cmd", "/C")
    } else {
        ("sh", "-c")
    }
}
