mod agents;
mod cli;
mod config;
mod error;
mod models;
mod utils;
mod workflow;

use clap::Parser;
use cli::{Cli, Commands};
use colored::Colorize;
use std::process;

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    let result = match cli.command {
        Commands::List {
            files,
            ignore,
            json,
        } => workflow::execute_list(&cli.path, &files, &ignore, json),
        Commands::Verify { expected } => workflow::execute_verify(&cli.path, &expected),
        Commands::Update {
            ecosystem,
            restore,
            json,
            updates,
        } => workflow::execute_update(&cli.path, &ecosystem, &updates, restore, json),
        Commands::Patch { file, patch } => workflow::execute_patch(&cli.path, &file, patch),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        // 2: the package manager rejected the update set
        process::exit(if e.is_unsatisfiable() { 2 } else { 1 });
    }
}
