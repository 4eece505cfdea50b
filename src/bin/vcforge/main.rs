//! vcforge CLI - print MSVC compile and link commands for a project

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use vcforge::util::diagnostic::emit;
use vcforge::ToolchainError;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color;

    if let Err(e) = run(cli) {
        match e.downcast_ref::<ToolchainError>() {
            Some(err) => emit(&err.to_diagnostic(), color),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("vcforge=debug")
    } else {
        EnvFilter::new("vcforge=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Compile(args) => commands::compile::execute(args),
        Commands::Link(args) => commands::link::execute(args),
        Commands::Env(args) => commands::env::execute(args),
        Commands::FindLib(args) => commands::find_lib::execute(args),
        Commands::Ext(args) => commands::ext::execute(args),
    }
}
