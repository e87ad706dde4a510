//! Fluoro CLI - batch pKa and logP prediction.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let result = match cli.command {
        Commands::Predict {
            file,
            run,
            engine,
            engine_cmd,
            engine_url,
            output,
            format,
            quiet,
        } => commands::predict::run(
            file,
            run,
            commands::predict::EngineArgs {
                choice: engine,
                command: engine_cmd,
                url: engine_url,
            },
            output,
            format,
            quiet,
            cli.verbose,
        ),

        Commands::Schema { file, run, json } => commands::schema::run(file, run, json, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
