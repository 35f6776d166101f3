//! Command-line interface module
//!
//! This module handles argument parsing and output formatting.
//! It contains no orchestration logic - that belongs in [`crate::core`].

pub mod commands;
pub mod output;

use std::time::Instant;

use anyhow::Result;
use clap::Parser;

use commands::Commands;

/// Monoforge - Monorepo-aware build and command orchestrator
///
/// Builds packages in dependency order, skips unchanged packages via
/// content hashing, and runs arbitrary commands across a workspace.
#[derive(Parser, Debug)]
#[command(name = "monoforge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Execute the CLI command
    pub async fn run(self) -> Result<()> {
        if let Some(cmd) = self.command {
            tracing::info!("Starting tasks");
            let started = Instant::now();
            let result = cmd.run().await;
            tracing::info!("Executed in {} ms", started.elapsed().as_millis());
            result
        } else {
            use clap::CommandFactory;
            let mut cmd = Self::command();
            cmd.print_help()?;
            Ok(())
        }
    }
}
