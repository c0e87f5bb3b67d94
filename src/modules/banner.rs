//! The banner module: shell identity and host information.

use crate::bus::ObserverBus;
use crate::module::{CommandDoc, ExecRequest, ExecStatus, ModuleMetadata, ShellModule};
use crate::tree::version_string;

/// Builtin module showing what the shell is and where it runs.
#[derive(Debug, Default)]
pub struct BannerModule {
    logs: Vec<String>,
}

impl BannerModule {
    /// Create the module with an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, command: &str, bus: &mut ObserverBus) {
        let event = format!("Executing command '{command}' in module 'banner'");
        bus.publish(&event);
        self.logs.push(event);
    }

    fn print_info(&self) {
        println!("ghostshell {}", version_string());
        println!("Self-extensible module shell");
        println!();
        println!("Host:");
        println!("  os:    {}", std::env::consts::OS);
        println!("  arch:  {}", std::env::consts::ARCH);
        println!("  cpus:  {}", num_cpus::get());
        if let Ok(dir) = std::env::current_dir() {
            println!("  cwd:   {}", dir.display());
        }
    }
}

impl ShellModule for BannerModule {
    fn name(&self) -> &str {
        "Banner"
    }

    fn doc(&self) -> &str {
        "Show the shell banner, version, and host information."
    }

    fn command_docs(&self) -> Vec<(String, String)> {
        vec![
            ("info".to_string(), "Print the banner and host information.".to_string()),
            ("logs".to_string(), "Print every event this module published.".to_string()),
        ]
    }

    fn subcommand_docs(&self) -> Vec<CommandDoc> {
        Vec::new()
    }

    fn metadata(&self) -> ModuleMetadata {
        ModuleMetadata {
            description: Some("Shell banner and host information".to_string()),
            version: Some(version_string()),
            author: Some("ghostshell".to_string()),
            license: Some("MIT".to_string()),
        }
    }

    fn execute(
        &mut self,
        request: &ExecRequest<'_>,
        bus: &mut ObserverBus,
    ) -> anyhow::Result<ExecStatus> {
        self.record(request.command, bus);

        match request.command {
            "info" => self.print_info(),
            "logs" => {
                for entry in &self.logs {
                    println!("{entry}");
                }
            }
            other => anyhow::bail!("banner has no command '{other}'"),
        }

        Ok(ExecStatus::Done)
    }

    fn logs(&self) -> &[String] {
        &self.logs
    }
}
