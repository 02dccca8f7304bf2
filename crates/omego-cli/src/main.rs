//! omego CLI - OMERO database administration

use clap::Parser;

mod cli;
mod commands;
mod logging;

use cli::Cli;
use commands::common::ExitCode;
use commands::{db, version};

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let debug_level = std::env::var(logging::DEBUG_LEVEL_VAR).ok();
    logging::init(cli.global.verbose, cli.global.quiet, debug_level.as_deref());

    let result = match &cli.command {
        cli::Commands::Db(args) => db::execute(args, &cli.global).await,
        cli::Commands::Version => version::execute(),
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            let code = match err.downcast_ref::<ExitCode>() {
                Some(ExitCode(code)) => *code,
                None => {
                    eprintln!("Error: {:#}", err);
                    1
                }
            };
            std::process::ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}
