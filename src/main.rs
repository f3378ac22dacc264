use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use kairos_init::cli::{Cli, Command};
use kairos_init::commands;
use kairos_init::logging::{self, Logger};

fn main() -> Result<()> {
    let args = Cli::parse();
    logging::init_subscriber(args.global.loglevel.into())?;
    let log = Arc::new(Logger::new());

    match args.command {
        Command::Install(opts) => commands::install::run(&args.global, &opts, &log),
        Command::Remove(opts) => commands::remove::run(&args.global, &opts, &log),
        Command::Show(opts) => commands::show::run(&args.global, &opts, &log),
        Command::Validate(opts) => commands::validate::run(&args.global, &opts, &log),
        Command::Version => {
            let version = option_env!("KAIROS_INIT_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
            println!("kairos-init {version}");
            Ok(())
        }
    }
}
