//! Module discovery: the builtin registration table and the mounted scan.
//!
//! Builtin modules are registered explicitly in a constructor table; mounted
//! modules are TOML manifests found in the configured directory. A unit that
//! fails to load is logged and skipped, it never aborts discovery.

use std::path::{Path, PathBuf};

use super::{ManifestModule, ModuleOrigin, ShellModule};
use crate::config::Config;

/// Constructor for a builtin module.
///
/// Builtins are constructed from configuration so modules that touch the
/// filesystem know their configured paths without reaching for globals.
pub type ModuleConstructor = fn(&Config) -> Box<dyn ShellModule>;

/// Discovers modules from the builtin table and the mounted directory.
pub struct Discovery {
    builtins: Vec<(&'static str, ModuleConstructor)>,
    mounted_dir: Option<PathBuf>,
    exclude: Vec<String>,
}

impl std::fmt::Debug for Discovery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Discovery")
            .field("builtins", &self.builtins.iter().map(|(name, _)| name).collect::<Vec<_>>())
            .field("mounted_dir", &self.mounted_dir)
            .field("exclude", &self.exclude)
            .finish()
    }
}

impl Discovery {
    /// Create a discovery with an empty builtin table and no mounted
    /// directory.
    pub fn new() -> Self {
        Self { builtins: Vec::new(), mounted_dir: None, exclude: Vec::new() }
    }

    /// Create a discovery configured from `config`: mounted directory and
    /// exclusion list come from the `[modules]` section.
    pub fn from_config(config: &Config) -> Self {
        Self {
            builtins: Vec::new(),
            mounted_dir: config.mounted_dir(),
            exclude: config.modules.exclude.clone(),
        }
    }

    /// Append a builtin constructor. Table order is preserved in the
    /// discovery result.
    #[must_use]
    pub fn with_builtin(mut self, name: &'static str, constructor: ModuleConstructor) -> Self {
        self.builtins.push((name, constructor));
        self
    }

    /// Override the mounted module directory.
    #[must_use]
    pub fn with_mounted_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.mounted_dir = Some(dir.into());
        self
    }

    /// Names in the builtin table, in registration order.
    pub fn builtin_names(&self) -> Vec<&'static str> {
        self.builtins.iter().map(|(name, _)| *name).collect()
    }

    /// Discover all modules.
    ///
    /// Builtins come first in table order, then mounted manifests sorted by
    /// file name. Excluded stems are skipped silently; a manifest that fails
    /// to parse or validate is logged and skipped.
    pub fn discover(&self, config: &Config) -> Vec<(Box<dyn ShellModule>, ModuleOrigin)> {
        let mut modules: Vec<(Box<dyn ShellModule>, ModuleOrigin)> = Vec::new();

        for (name, constructor) in &self.builtins {
            tracing::debug!(module = name, "Registering builtin module");
            modules.push((constructor(config), ModuleOrigin::Builtin));
        }

        if let Some(ref dir) = self.mounted_dir {
            for (module, origin) in self.scan_mounted(dir) {
                modules.push((module, origin));
            }
        }

        modules
    }

    /// Scan the mounted directory for `*.toml` manifests.
    fn scan_mounted(&self, dir: &Path) -> Vec<(Box<dyn ShellModule>, ModuleOrigin)> {
        let mut modules: Vec<(Box<dyn ShellModule>, ModuleOrigin)> = Vec::new();

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "Mounted directory unreadable");
                return modules;
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("toml"))
            .collect();
        paths.sort();

        for path in paths {
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
            if self.exclude.iter().any(|excluded| excluded.eq_ignore_ascii_case(stem)) {
                tracing::debug!(unit = %path.display(), "Skipping excluded module unit");
                continue;
            }

            match ManifestModule::from_file(&path) {
                Ok(module) => {
                    tracing::debug!(
                        unit = %path.display(),
                        module = module.name(),
                        "Mounted module loaded"
                    );
                    modules.push((Box::new(module), ModuleOrigin::Mounted));
                }
                Err(e) => {
                    tracing::warn!(unit = %path.display(), error = %e, "Module unit failed to load");
                }
            }
        }

        modules
    }
}

impl Default for Discovery {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD_MANIFEST: &str = r#"
[module]
name = "alpha"
description = "First mounted module."

[[command]]
name = "status"
description = "Show status."
"#;

    const OTHER_MANIFEST: &str = r#"
[module]
name = "zulu"
description = "Second mounted module."

[[command]]
name = "ping"
description = "Ping."
"#;

    fn write_manifest(dir: &Path, file: &str, content: &str) {
        std::fs::write(dir.join(file), content).unwrap();
    }

    #[test]
    fn test_builtins_precede_mounted() {
        let tmp = tempfile::tempdir().unwrap();
        write_manifest(tmp.path(), "alpha.toml", GOOD_MANIFEST);

        let discovery = Discovery::new()
            .with_builtin("banner", |_| Box::new(crate::module::tests::DocsOnly))
            .with_mounted_dir(tmp.path());

        let modules = discovery.discover(&Config::default());
        assert_eq!(modules.len(), 2);
        assert_eq!(modules[0].1, ModuleOrigin::Builtin);
        assert_eq!(modules[1].1, ModuleOrigin::Mounted);
        assert_eq!(modules[1].0.name(), "alpha");
    }

    #[test]
    fn test_mounted_sorted_by_file_name() {
        let tmp = tempfile::tempdir().unwrap();
        write_manifest(tmp.path(), "zz.toml", OTHER_MANIFEST);
        write_manifest(tmp.path(), "aa.toml", GOOD_MANIFEST);

        let discovery = Discovery::new().with_mounted_dir(tmp.path());
        let modules = discovery.discover(&Config::default());

        let names: Vec<_> = modules.iter().map(|(module, _)| module.name().to_string()).collect();
        assert_eq!(names, vec!["alpha", "zulu"]);
    }

    #[test]
    fn test_excluded_stems_are_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        write_manifest(tmp.path(), "common.toml", GOOD_MANIFEST);
        write_manifest(tmp.path(), "zulu.toml", OTHER_MANIFEST);

        let config = Config::default();
        let discovery = Discovery::from_config(&config).with_mounted_dir(tmp.path());

        let modules = discovery.discover(&config);
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].0.name(), "zulu");
    }

    #[test]
    fn test_broken_unit_does_not_abort_discovery() {
        let tmp = tempfile::tempdir().unwrap();
        write_manifest(tmp.path(), "broken.toml", "this is not a manifest");
        write_manifest(tmp.path(), "zulu.toml", OTHER_MANIFEST);

        let discovery = Discovery::new().with_mounted_dir(tmp.path());
        let modules = discovery.discover(&Config::default());

        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].0.name(), "zulu");
    }

    #[test]
    fn test_missing_mounted_dir_yields_builtins_only() {
        let discovery = Discovery::new()
            .with_builtin("banner", |_| Box::new(crate::module::tests::DocsOnly))
            .with_mounted_dir("/nonexistent/ghostshell-modules");

        let modules = discovery.discover(&Config::default());
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].1, ModuleOrigin::Builtin);
    }

    #[test]
    fn test_non_toml_files_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        write_manifest(tmp.path(), "notes.txt", "not a module");
        write_manifest(tmp.path(), "alpha.toml", GOOD_MANIFEST);

        let discovery = Discovery::new().with_mounted_dir(tmp.path());
        let modules = discovery.discover(&Config::default());
        assert_eq!(modules.len(), 1);
    }
}
