//! deskfs CLI Binary
//!
//! Command-line interface for the desktop simulator's virtual filesystem.

use anyhow::Context;
use clap::Parser;
use deskfs::logging::init_logging;
use deskfs::tooling::cli::{Cli, CliContext};
use std::process;

fn run(cli: &Cli) -> anyhow::Result<String> {
    let config = cli.resolve_config().context("loading configuration")?;
    init_logging(Some(&config.logging), Some(&config.username))
        .context("initializing logging")?;
    let context = CliContext::new(config).context("opening filesystem")?;
    Ok(context.execute(&cli.command)?)
}

fn main() {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}
