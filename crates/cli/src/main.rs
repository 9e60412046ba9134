//! The `indivo` command line tool.

use std::io::{self, Write};

use clap::Parser;
use indivo_cli::{CliConfig, commands, init_logging};
use tracing::debug;

fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(2);
    }

    debug!(command = ?config.command, strict = config.strict, "starting");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let succeeded = commands::run(&config, &mut out)?;
    out.flush()?;

    if !succeeded {
        std::process::exit(1);
    }
    Ok(())
}
