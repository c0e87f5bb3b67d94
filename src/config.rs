//! Configuration management for ghostshell.
//!
//! Handles loading configuration from a `.ghostshell.toml` file in the
//! working directory. Every section and field has a default, so a missing
//! or partial file always yields a usable configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Module discovery settings
    pub modules: ModulesConfig,

    /// Scaffold generator settings
    pub scaffold: ScaffoldConfig,
}

/// Module discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModulesConfig {
    /// Directory of mounted module manifests. None disables mounting.
    pub mounted_dir: Option<String>,

    /// File stems skipped during the mounted directory scan
    pub exclude: Vec<String>,

    /// Whether mounted module nodes are namespaced as `ext.<name>`
    pub namespace_mounted: bool,
}

/// Scaffold generator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaffoldConfig {
    /// Directory of template overrides. None means builtin templates only.
    pub templates_dir: Option<String>,

    /// Directory where shell wrappers are written
    pub wrapper_dir: String,
}

impl Default for ModulesConfig {
    fn default() -> Self {
        Self {
            mounted_dir: None,
            exclude: vec!["common".to_string(), "template".to_string()],
            namespace_mounted: false,
        }
    }
}

impl Default for ScaffoldConfig {
    fn default() -> Self {
        Self { templates_dir: None, wrapper_dir: "./bin".to_string() }
    }
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Looks for `.ghostshell.toml` in the current directory and falls back
    /// to defaults when it does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let local_config = PathBuf::from(".ghostshell.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// The mounted module directory with `~` and env vars expanded.
    pub fn mounted_dir(&self) -> Option<PathBuf> {
        self.modules.mounted_dir.as_deref().map(|dir| expand(dir))
    }

    /// The template override directory with `~` and env vars expanded.
    pub fn templates_dir(&self) -> Option<PathBuf> {
        self.scaffold.templates_dir.as_deref().map(|dir| expand(dir))
    }

    /// The wrapper output directory with `~` and env vars expanded.
    pub fn wrapper_dir(&self) -> PathBuf {
        expand(&self.scaffold.wrapper_dir)
    }
}

/// Expand `~` and `$VAR` in a configured path, falling back to the literal
/// text when a variable is unset.
fn expand(path: &str) -> PathBuf {
    match shellexpand::full(path) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.modules.mounted_dir.is_none());
        assert_eq!(config.modules.exclude, vec!["common", "template"]);
        assert!(!config.modules.namespace_mounted);
        assert_eq!(config.scaffold.wrapper_dir, "./bin");
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [modules]
            mounted_dir = "./modules"
            exclude = ["common"]

            [scaffold]
            wrapper_dir = "./wrappers"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.modules.mounted_dir.as_deref(), Some("./modules"));
        assert_eq!(config.modules.exclude, vec!["common"]);
        assert_eq!(config.scaffold.wrapper_dir, "./wrappers");
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let toml_str = r#"
            [modules]
            mounted_dir = "./modules"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.modules.exclude, vec!["common", "template"]);
        assert_eq!(config.scaffold.wrapper_dir, "./bin");
    }

    #[test]
    fn test_tilde_expansion() {
        let config = Config {
            modules: ModulesConfig {
                mounted_dir: Some("~/ghost-modules".to_string()),
                ..ModulesConfig::default()
            },
            scaffold: ScaffoldConfig::default(),
        };

        let dir = config.mounted_dir().unwrap();
        assert!(!dir.to_string_lossy().starts_with('~'));
    }
}
