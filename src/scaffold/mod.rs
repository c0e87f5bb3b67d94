//! Scaffold generation for new modules and shell wrappers.
//!
//! Scaffolding writes files a user then edits: a module manifest that the
//! next discovery pass picks up, or a pair of shell wrappers around a
//! container image. Existing targets are never overwritten.

mod templates;

pub use templates::render;

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::module::{CommandTable, ModuleError, ModuleManifest, ModuleResult};

/// Template file names looked up in the override directory.
const MODULE_TEMPLATE: &str = "module.toml";
const WRAPPER_POSIX_TEMPLATE: &str = "wrapper.sh";
const WRAPPER_POWERSHELL_TEMPLATE: &str = "wrapper.ps1";

/// Generates module manifests and shell wrappers.
#[derive(Debug, Clone)]
pub struct ScaffoldGenerator {
    modules_dir: PathBuf,
    wrapper_dir: PathBuf,
    templates_dir: Option<PathBuf>,
}

impl ScaffoldGenerator {
    /// Create a generator writing into explicit directories.
    pub fn new(modules_dir: impl Into<PathBuf>, wrapper_dir: impl Into<PathBuf>) -> Self {
        Self { modules_dir: modules_dir.into(), wrapper_dir: wrapper_dir.into(), templates_dir: None }
    }

    /// Create a generator from configuration. Without a mounted directory
    /// new manifests land in `./modules`.
    pub fn from_config(config: &Config) -> Self {
        Self {
            modules_dir: config.mounted_dir().unwrap_or_else(|| PathBuf::from("./modules")),
            wrapper_dir: config.wrapper_dir(),
            templates_dir: config.templates_dir(),
        }
    }

    /// Use `dir` as the template override directory.
    #[must_use]
    pub fn with_templates_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.templates_dir = Some(dir.into());
        self
    }

    /// Scaffold a new module manifest.
    ///
    /// The manifest is rendered, validated, and written atomically as
    /// `<name>.toml` in the module directory. An existing manifest is an
    /// error and stays untouched. `template` selects a named override
    /// template; the default is the builtin manifest template.
    pub fn new_module(&self, name: &str, template: Option<&str>) -> ModuleResult<PathBuf> {
        let name = validated_name(name)?;
        let target = self.modules_dir.join(format!("{name}.toml"));
        if target.exists() {
            return Err(ModuleError::AlreadyExists(name));
        }

        let source = match template {
            Some(file_name) => self.override_template(file_name)?,
            None => self.template(MODULE_TEMPLATE, templates::MODULE_MANIFEST)?,
        };
        let content = render(&source, &[("name", &name)]);

        // A broken override template surfaces here, before anything is
        // written.
        ModuleManifest::from_toml(&content)?.validate()?;

        fs::create_dir_all(&self.modules_dir)?;
        write_file_atomic(&target, &content)?;
        tracing::info!(module = %name, path = %target.display(), "Module scaffolded");

        Ok(target)
    }

    /// Scaffold shell wrappers around a container image.
    ///
    /// Writes a POSIX sh wrapper named `<name>` and a PowerShell wrapper
    /// named `<name>.ps1` into the wrapper directory, embedding the command
    /// table known at generation time. On Unix the sh wrapper is made
    /// executable.
    pub fn new_shell_wrapper(
        &self,
        name: &str,
        image: &str,
        table: &CommandTable,
    ) -> ModuleResult<Vec<PathBuf>> {
        let name = validated_name(name)?;
        let sh_target = self.wrapper_dir.join(&name);
        let ps_target = self.wrapper_dir.join(format!("{name}.ps1"));
        if sh_target.exists() || ps_target.exists() {
            return Err(ModuleError::AlreadyExists(name));
        }

        let commands = format_command_table(table);
        let substitutions =
            [("name", name.as_str()), ("image", image), ("command_table", commands.as_str())];
        let sh_content =
            render(&self.template(WRAPPER_POSIX_TEMPLATE, templates::WRAPPER_POSIX)?, &substitutions);
        let ps_content = render(
            &self.template(WRAPPER_POWERSHELL_TEMPLATE, templates::WRAPPER_POWERSHELL)?,
            &substitutions,
        );

        fs::create_dir_all(&self.wrapper_dir)?;
        write_file_atomic(&sh_target, &sh_content)?;
        write_file_atomic(&ps_target, &ps_content)?;
        make_executable(&sh_target)?;
        tracing::info!(wrapper = %name, dir = %self.wrapper_dir.display(), "Wrappers scaffolded");

        Ok(vec![sh_target, ps_target])
    }

    /// Load a template by file name, preferring the override directory.
    fn template(&self, file_name: &str, builtin: &'static str) -> ModuleResult<String> {
        if let Some(ref dir) = self.templates_dir {
            let path = dir.join(file_name);
            if path.exists() {
                return Ok(fs::read_to_string(&path)?);
            }
        }
        Ok(builtin.to_string())
    }

    /// Load a named override template; unlike [`template`](Self::template)
    /// there is no builtin to fall back to.
    fn override_template(&self, file_name: &str) -> ModuleResult<String> {
        let Some(ref dir) = self.templates_dir else {
            return Err(ModuleError::TemplateMissing(file_name.to_string()));
        };
        let path = dir.join(file_name);
        if !path.exists() {
            return Err(ModuleError::TemplateMissing(file_name.to_string()));
        }
        Ok(fs::read_to_string(&path)?)
    }
}

/// Render the command table as comment lines for the wrapper scripts.
fn format_command_table(table: &CommandTable) -> String {
    if table.is_empty() {
        return "#   (no modules discovered)".to_string();
    }

    let mut lines = Vec::new();
    for (module, commands) in table {
        for (command, subcommands) in commands {
            if subcommands.is_empty() {
                lines.push(format!("#   {module} {command}"));
            } else {
                lines.push(format!("#   {module} {command} <{}>", subcommands.join("|")));
            }
        }
    }
    lines.join("\n")
}

/// Lower-case and validate a scaffold target name.
fn validated_name(name: &str) -> ModuleResult<String> {
    if name.is_empty() {
        return Err(ModuleError::InvalidManifest("scaffold name is required".to_string()));
    }
    if !name.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_') {
        return Err(ModuleError::InvalidManifest(format!(
            "scaffold name '{name}' must contain only alphanumeric characters, hyphens, and underscores"
        )));
    }
    Ok(name.to_lowercase())
}

/// Write a file atomically (write to temp, then rename).
fn write_file_atomic(path: &Path, content: &str) -> ModuleResult<()> {
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content)?;
    fs::rename(&temp_path, path)?;
    Ok(())
}

#[cfg(unix)]
fn make_executable(path: &Path) -> ModuleResult<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_mode(0o755);
    fs::set_permissions(path, permissions)?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> ModuleResult<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(tmp: &Path) -> ScaffoldGenerator {
        ScaffoldGenerator::new(tmp.join("modules"), tmp.join("bin"))
    }

    #[test]
    fn test_new_module_writes_discoverable_manifest() {
        let tmp = tempfile::tempdir().unwrap();
        let path = generator(tmp.path()).new_module("Watchdog", None).unwrap();

        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("watchdog.toml"));
        let manifest = ModuleManifest::from_file(&path).unwrap();
        assert_eq!(manifest.module.name, "watchdog");
        assert!(manifest.validate().is_ok());
    }

    #[test]
    fn test_existing_module_is_never_overwritten() {
        let tmp = tempfile::tempdir().unwrap();
        let generator = generator(tmp.path());

        let path = generator.new_module("watchdog", None).unwrap();
        let original = fs::read_to_string(&path).unwrap();

        let err = generator.new_module("watchdog", None).unwrap_err();
        assert!(matches!(err, ModuleError::AlreadyExists(_)));
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn test_invalid_name_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let err = generator(tmp.path()).new_module("bad name", None).unwrap_err();
        assert!(matches!(err, ModuleError::InvalidManifest(_)));
    }

    #[test]
    fn test_wrapper_pair_is_written() {
        let tmp = tempfile::tempdir().unwrap();
        let written =
            generator(tmp.path()).new_shell_wrapper("helper", "alpine:3", &Vec::new()).unwrap();

        assert_eq!(written.len(), 2);
        let sh = fs::read_to_string(&written[0]).unwrap();
        assert!(sh.starts_with("#!/bin/sh"));
        assert!(sh.contains("alpine:3"));
        let ps = fs::read_to_string(&written[1]).unwrap();
        assert!(ps.contains("alpine:3"));
    }

    #[test]
    fn test_wrapper_embeds_command_table() {
        let tmp = tempfile::tempdir().unwrap();
        let table = vec![(
            "banner".to_string(),
            vec![("info".to_string(), Vec::new()), ("logs".to_string(), Vec::new())],
        )];

        let written =
            generator(tmp.path()).new_shell_wrapper("helper", "alpine:3", &table).unwrap();

        for path in &written {
            let content = fs::read_to_string(path).unwrap();
            assert!(content.contains("#   banner info"));
            assert!(content.contains("#   banner logs"));
            assert!(!content.contains("{{command_table}}"));
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_posix_wrapper_is_executable() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let written =
            generator(tmp.path()).new_shell_wrapper("helper", "alpine:3", &Vec::new()).unwrap();

        let mode = fs::metadata(&written[0]).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
    }

    #[test]
    fn test_existing_wrapper_is_never_overwritten() {
        let tmp = tempfile::tempdir().unwrap();
        let generator = generator(tmp.path());

        generator.new_shell_wrapper("helper", "alpine:3", &Vec::new()).unwrap();
        let err = generator.new_shell_wrapper("helper", "debian:12", &Vec::new()).unwrap_err();
        assert!(matches!(err, ModuleError::AlreadyExists(_)));
    }

    #[test]
    fn test_template_override_directory_wins() {
        let tmp = tempfile::tempdir().unwrap();
        let overrides = tmp.path().join("templates");
        fs::create_dir_all(&overrides).unwrap();
        fs::write(
            overrides.join(MODULE_TEMPLATE),
            "[module]\nname = \"{{name}}\"\ndescription = \"custom\"\n",
        )
        .unwrap();

        let generator = generator(tmp.path()).with_templates_dir(&overrides);
        let path = generator.new_module("custom", None).unwrap();

        let content = fs::read_to_string(path).unwrap();
        assert!(content.contains("description = \"custom\""));
    }

    #[test]
    fn test_named_template_must_exist() {
        let tmp = tempfile::tempdir().unwrap();
        let overrides = tmp.path().join("templates");
        fs::create_dir_all(&overrides).unwrap();

        let generator = generator(tmp.path()).with_templates_dir(&overrides);
        let err = generator.new_module("custom", Some("missing.toml")).unwrap_err();
        assert!(matches!(err, ModuleError::TemplateMissing(_)));
    }

    #[test]
    fn test_broken_override_template_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let overrides = tmp.path().join("templates");
        fs::create_dir_all(&overrides).unwrap();
        fs::write(overrides.join(MODULE_TEMPLATE), "not a manifest at all").unwrap();

        let generator = generator(tmp.path()).with_templates_dir(&overrides);
        let err = generator.new_module("custom", None).unwrap_err();
        assert!(matches!(err, ModuleError::InvalidManifest(_)));
        assert!(!tmp.path().join("modules").join("custom.toml").exists());
    }
}
