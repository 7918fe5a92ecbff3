//! CLI entry point. Parses arguments, sets up logging and dispatches to
//! the subcommand implementations under `commands/`.

use clap::Parser;
use mapconv_core::error::ConvertError;

mod app;
mod commands;
mod logger;

use app::{Cli, Command};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logger::init(cli.verbose) {
        eprintln!("failed to initialize logging: {e:#}");
        std::process::exit(1);
    }

    let result = match &cli.command {
        Command::Convert(args) => commands::convert::run(args),
        Command::Export(args) => commands::export::run(args),
        Command::MultiExperience(args) => commands::multi_experience::run(args),
        Command::Validate(args) => commands::validate::run(args),
        Command::ResetSpawns(args) => commands::reset_spawns::run(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err:#}");
        let code = err.downcast_ref::<ConvertError>().map(ConvertError::exit_code).unwrap_or(1);
        std::process::exit(code);
    }
}
