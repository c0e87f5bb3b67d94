//! Argument parsing and routing.
//!
//! Exactly one module receives any invocation. The exit contract:
//!
//! * no arguments: top-level help, exit 0
//! * `--report`: introspection JSON on stdout, exit 0
//! * unknown module: message plus top-level help, exit 2, nothing executes
//! * module without a resolvable command: message plus module help, exit 2
//! * otherwise a single synchronous `execute`; its error propagates to the
//!   caller and becomes a non-zero exit

use clap::error::ErrorKind;
use clap::Command;

use crate::bus::ObserverBus;
use crate::module::{ExecRequest, ExecStatus, ModuleError, ModuleRegistry};
use crate::report::Report;
use crate::tree::CommandTreeBuilder;

/// Parse `args` and route to the owning module. Returns the process exit
/// code.
pub fn run(
    args: &[String],
    registry: &mut ModuleRegistry,
    bus: &mut ObserverBus,
    namespace_mounted: bool,
) -> anyhow::Result<i32> {
    let (mut root, node_keys) = {
        let builder = CommandTreeBuilder::new(registry).namespace_mounted(namespace_mounted);
        let node_keys: Vec<(String, String)> = registry
            .all()
            .iter()
            .map(|entry| (builder.node_name(entry), entry.name.clone()))
            .collect();
        (builder.build(), node_keys)
    };

    if args.len() <= 1 {
        root.print_help()?;
        return Ok(0);
    }

    // Routing happens on the first positional token so an unknown module is
    // rejected before anything executes.
    if let Some(token) = args.iter().skip(1).find(|a| !a.starts_with('-')) {
        if !node_keys.iter().any(|(node, _)| node == token) {
            eprintln!("Unknown module: {token}");
            root.print_help()?;
            return Ok(2);
        }
    }

    let matches = match root.clone().try_get_matches_from(args) {
        Ok(matches) => matches,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 2,
            };
            e.print()?;
            return Ok(code);
        }
    };

    if matches.get_flag("report") {
        println!("{}", Report::from_registry(registry).to_json()?);
        return Ok(0);
    }

    let Some((node, node_matches)) = matches.subcommand() else {
        root.print_help()?;
        return Ok(0);
    };

    let key = node_keys
        .iter()
        .find(|(name, _)| name == node)
        .map(|(_, key)| key.clone())
        .ok_or_else(|| ModuleError::UnknownModule(node.to_string()))?;

    let Some((command, command_matches)) = node_matches.subcommand() else {
        eprintln!("Module '{key}' requires a command");
        print_node_help(&mut root, node)?;
        return Ok(2);
    };

    let table = registry.command_table();
    let entry = registry.get_mut(&key).ok_or_else(|| ModuleError::UnknownModule(key.clone()))?;
    let request = ExecRequest { command, matches: command_matches, table: &table };

    match entry.module.execute(&request, bus)? {
        ExecStatus::Done => Ok(0),
        ExecStatus::NotDispatchable => {
            let message = format!("Module '{key}' declares '{command}' for documentation only");
            tracing::debug!(module = %key, command, "Module is not dispatchable");
            bus.publish(&message);
            eprintln!("{message}");
            Ok(0)
        }
    }
}

fn print_node_help(root: &mut Command, node: &str) -> anyhow::Result<()> {
    if let Some(sub) = root.find_subcommand_mut(node) {
        sub.print_help()?;
    }
    Ok(())
}
