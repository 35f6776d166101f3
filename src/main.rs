//! Monoforge CLI - Monorepo-aware build and command orchestrator
//!
//! Entry point for the monoforge command-line application.

use anyhow::Result;
use clap::Parser;

use monoforge::cli::output::{display_error, env_filter};
use monoforge::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // logs go to stderr; stdout is reserved for command output
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(cli.verbose, cli.quiet))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.run().await {
        Ok(()) => Ok(()),
        Err(e) => {
            display_error(&e);
            std::process::exit(1);
        }
    }
}
