//! ghostshell - self-extensible module shell.
//!
//! The entry point stays thin: set up logging, load configuration, build
//! the shell context, and hand the raw arguments to the dispatcher.

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ghostshell::{Config, ShellContext};

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    // Logging must be live before discovery runs, so the flag is read off
    // the raw arguments rather than the parsed matches.
    let debug = args.iter().any(|arg| arg == "--debug");
    let filter = if debug { EnvFilter::new("debug") } else { EnvFilter::new("warn") };

    tracing_subscriber::registry().with(fmt::layer().with_target(false)).with(filter).init();

    let config = Config::load()?;
    let mut context = ShellContext::bootstrap(config);

    let code = context.run(&args)?;
    std::process::exit(code);
}
