mod cli;
mod commands;
mod error;
mod paths;

use std::process::ExitCode;

use clap::Parser;

use crate::cli::Cli;
use crate::cli::Command;
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    paths::init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let table = commands::load_table(&cli)?;

    if let Command::Compile = cli.command {
        commands::compile(&table);
        return Ok(());
    }

    let engine = commands::engine(&cli, table).await?;
    match &cli.command {
        Command::Compile => Ok(()),
        Command::Fetch(args) => commands::fetch(&engine, args).await,
        Command::Edit(args) => commands::edit(&engine, args).await,
        Command::Presets { action } => commands::presets(&engine, action).await,
    }
}
