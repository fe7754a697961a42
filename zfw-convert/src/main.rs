use anyhow::Result;
use clap::Parser;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

mod cli;
mod convert;
mod inspect_cmd;
mod path_guard;
mod validate_cmd;

use cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Convert(args) => convert::run_convert(args),
        Command::Inspect(args) => inspect_cmd::run_inspect(args),
        Command::Validate(args) => validate_cmd::run_validate(args),
    }
}
