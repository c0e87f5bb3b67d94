//! The boilerplate module: scaffolding entry points.

use clap::{Arg, Command};

use crate::bus::ObserverBus;
use crate::config::Config;
use crate::module::{CommandDoc, ExecRequest, ExecStatus, ModuleMetadata, ShellModule};
use crate::scaffold::ScaffoldGenerator;

/// Builtin module exposing the scaffold generator on the command line.
pub struct BoilerplateModule {
    generator: ScaffoldGenerator,
    logs: Vec<String>,
}

impl std::fmt::Debug for BoilerplateModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoilerplateModule").field("logs", &self.logs.len()).finish()
    }
}

impl BoilerplateModule {
    /// Create the module with scaffold paths taken from configuration.
    pub fn new(config: &Config) -> Self {
        Self::with_generator(ScaffoldGenerator::from_config(config))
    }

    /// Create the module around an explicit generator.
    pub fn with_generator(generator: ScaffoldGenerator) -> Self {
        Self { generator, logs: Vec::new() }
    }

    fn record(&mut self, command: &str, bus: &mut ObserverBus) {
        let event = format!("Executing command '{command}' in module 'boilerplate'");
        bus.publish(&event);
        self.logs.push(event);
    }
}

impl ShellModule for BoilerplateModule {
    fn name(&self) -> &str {
        "Boilerplate"
    }

    fn doc(&self) -> &str {
        "Scaffold new modules and shell wrappers."
    }

    fn command_docs(&self) -> Vec<(String, String)> {
        vec![("init".to_string(), "Scaffold a new module or shell wrapper.".to_string())]
    }

    fn subcommand_docs(&self) -> Vec<CommandDoc> {
        vec![CommandDoc {
            command: "init".to_string(),
            description: "Scaffold a new module or shell wrapper.".to_string(),
            subcommands: vec![
                ("module".to_string(), "Write a new module manifest.".to_string()),
                (
                    "wrapper".to_string(),
                    "Write shell wrappers around a container image.".to_string(),
                ),
            ],
        }]
    }

    fn metadata(&self) -> ModuleMetadata {
        ModuleMetadata {
            description: Some("Scaffolding for modules and wrappers".to_string()),
            version: Some(crate::tree::version_string()),
            author: Some("ghostshell".to_string()),
            license: Some("MIT".to_string()),
        }
    }

    // The derived tree would give bare subcommand nodes; the scaffold
    // commands need arguments, so the nodes are built by hand. Names stay
    // aligned with the declared documentation.
    fn augment_command(&self, cmd: Command) -> anyhow::Result<Command> {
        Ok(cmd.subcommand(
            Command::new("init")
                .about("Scaffold a new module or shell wrapper.")
                .subcommand(
                    Command::new("module").about("Write a new module manifest.").arg(
                        Arg::new("name")
                            .long("name")
                            .required(true)
                            .help("Name of the new module"),
                    )
                    .arg(
                        Arg::new("template")
                            .long("template")
                            .help("Named template from the override directory"),
                    ),
                )
                .subcommand(
                    Command::new("wrapper")
                        .about("Write shell wrappers around a container image.")
                        .arg(
                            Arg::new("name")
                                .long("name")
                                .required(true)
                                .help("Name of the wrapper script"),
                        )
                        .arg(
                            Arg::new("image")
                                .long("image")
                                .required(true)
                                .help("Container image the wrapper runs"),
                        ),
                ),
        ))
    }

    fn execute(
        &mut self,
        request: &ExecRequest<'_>,
        bus: &mut ObserverBus,
    ) -> anyhow::Result<ExecStatus> {
        if request.command != "init" {
            anyhow::bail!("boilerplate has no command '{}'", request.command);
        }
        self.record(request.command, bus);

        match request.matches.subcommand() {
            Some(("module", matches)) => {
                let name = required_arg(matches, "name")?;
                let template = matches.get_one::<String>("template").map(String::as_str);
                let path = self.generator.new_module(name, template)?;
                let event = format!("Scaffolded module '{}'", name.to_lowercase());
                bus.publish(&event);
                self.logs.push(event);
                println!("Created module manifest {}", path.display());
            }
            Some(("wrapper", matches)) => {
                let name = required_arg(matches, "name")?;
                let image = required_arg(matches, "image")?;
                let written = self.generator.new_shell_wrapper(name, image, request.table)?;
                let event = format!("Scaffolded wrapper '{}'", name.to_lowercase());
                bus.publish(&event);
                self.logs.push(event);
                for path in written {
                    println!("Created wrapper {}", path.display());
                }
            }
            _ => anyhow::bail!("'init' requires a subcommand: module or wrapper"),
        }

        Ok(ExecStatus::Done)
    }

    fn logs(&self) -> &[String] {
        &self.logs
    }
}

fn required_arg<'a>(matches: &'a clap::ArgMatches, name: &str) -> anyhow::Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow::anyhow!("missing required argument '--{name}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::AuditLog;
    use crate::module::ModuleManifest;

    fn module_for(tmp: &std::path::Path) -> BoilerplateModule {
        BoilerplateModule::with_generator(ScaffoldGenerator::new(
            tmp.join("modules"),
            tmp.join("bin"),
        ))
    }

    fn parse(module: &BoilerplateModule, args: &[&str]) -> clap::ArgMatches {
        let cmd = module.augment_command(Command::new("boilerplate")).unwrap();
        let matches = cmd.get_matches_from(std::iter::once("boilerplate").chain(args.iter().copied()));
        let (_, init_matches) = matches.subcommand().unwrap();
        init_matches.clone()
    }

    #[test]
    fn test_init_module_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let mut module = module_for(tmp.path());
        let mut bus = ObserverBus::new();
        let audit = AuditLog::new();
        bus.subscribe(Box::new(audit.clone()));

        let matches = parse(&module, &["init", "module", "--name", "watchdog"]);
        let table = Vec::new();
        let request = ExecRequest { command: "init", matches: &matches, table: &table };
        let status = module.execute(&request, &mut bus).unwrap();

        assert_eq!(status, ExecStatus::Done);
        let manifest =
            ModuleManifest::from_file(&tmp.path().join("modules").join("watchdog.toml")).unwrap();
        assert_eq!(manifest.module.name, "watchdog");
        assert!(audit.entries().contains(&"Scaffolded module 'watchdog'".to_string()));
    }

    #[test]
    fn test_init_wrapper_writes_pair() {
        let tmp = tempfile::tempdir().unwrap();
        let mut module = module_for(tmp.path());
        let mut bus = ObserverBus::new();

        let matches =
            parse(&module, &["init", "wrapper", "--name", "helper", "--image", "alpine:3"]);
        let table = vec![("banner".to_string(), vec![("info".to_string(), Vec::new())])];
        let request = ExecRequest { command: "init", matches: &matches, table: &table };
        module.execute(&request, &mut bus).unwrap();

        assert!(tmp.path().join("bin").join("helper").exists());
        let sh = std::fs::read_to_string(tmp.path().join("bin").join("helper")).unwrap();
        assert!(sh.contains("#   banner info"));
        assert!(tmp.path().join("bin").join("helper.ps1").exists());
    }

    #[test]
    fn test_existing_module_surfaces_error() {
        let tmp = tempfile::tempdir().unwrap();
        let mut module = module_for(tmp.path());
        let mut bus = ObserverBus::new();

        let matches = parse(&module, &["init", "module", "--name", "watchdog"]);
        let table = Vec::new();
        let request = ExecRequest { command: "init", matches: &matches, table: &table };
        module.execute(&request, &mut bus).unwrap();

        let err = module.execute(&request, &mut bus).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_init_without_subcommand_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let mut module = module_for(tmp.path());
        let mut bus = ObserverBus::new();

        let matches = parse(&module, &["init"]);
        let table = Vec::new();
        let request = ExecRequest { command: "init", matches: &matches, table: &table };
        assert!(module.execute(&request, &mut bus).is_err());
    }

    #[test]
    fn test_tree_matches_declared_docs() {
        let tmp = tempfile::tempdir().unwrap();
        let module = module_for(tmp.path());

        let declared: Vec<_> =
            module.subcommand_docs()[0].subcommands.iter().map(|(name, _)| name.clone()).collect();
        let cmd = module.augment_command(Command::new("boilerplate")).unwrap();
        let init = cmd.find_subcommand("init").unwrap();
        let built: Vec<_> = init.get_subcommands().map(|c| c.get_name().to_string()).collect();

        assert_eq!(declared, built);
    }
}
