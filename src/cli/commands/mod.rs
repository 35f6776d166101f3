//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod build;
pub mod exec;
pub mod list;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::core::scheduler::ExecutionMode;

/// Orchestration target: one package closure or a whole repository
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct TargetArgs {
    /// Path to a package manifest; orchestrates its dependency closure
    #[arg(short, long, value_name = "MANIFEST")]
    pub package: Option<PathBuf>,

    /// Path to a workspace manifest; orchestrates every member package
    #[arg(short, long, value_name = "MANIFEST")]
    pub repo: Option<PathBuf>,
}

/// Resolved orchestration target
#[derive(Debug)]
pub enum Target {
    /// A single package and its dependency closure
    Package(PathBuf),
    /// A whole repository
    Repository(PathBuf),
}

impl Target {
    /// Directory holding the target manifest
    pub fn dir(&self) -> &Path {
        let path = match self {
            Self::Package(p) | Self::Repository(p) => p,
        };
        path.parent().unwrap_or_else(|| Path::new("."))
    }
}

impl TargetArgs {
    fn resolve(self) -> Target {
        // the clap group guarantees exactly one is set
        match (self.package, self.repo) {
            (Some(path), None) => Target::Package(path),
            (None, Some(path)) => Target::Repository(path),
            _ => unreachable!("clap enforces exactly one target"),
        }
    }
}

/// Execution mode selection
#[derive(Args, Debug)]
pub struct ModeArgs {
    /// Ignore dependency order and treat every package uniformly
    #[arg(long)]
    pub all: bool,

    /// Run one package at a time instead of grouping concurrent work
    #[arg(long)]
    pub sequential: bool,
}

impl ModeArgs {
    fn mode(&self) -> ExecutionMode {
        ExecutionMode::from_flags(self.all, self.sequential)
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a package or repository incrementally, dependencies first
    Build {
        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        mode: ModeArgs,

        /// Rebuild every package regardless of stored hashes
        #[arg(long, requires = "repo")]
        force_all: bool,

        /// Number of concurrent actions within a group
        #[arg(short, long)]
        jobs: Option<usize>,
    },

    /// Run a shell command in every package directory
    Exec {
        /// Command to run
        command: String,

        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        mode: ModeArgs,

        /// Number of concurrent actions within a group
        #[arg(short, long)]
        jobs: Option<usize>,
    },

    /// Enumerate packages in execution order without running anything
    List {
        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        mode: ModeArgs,
    },
}

impl Commands {
    /// Execute the selected command
    pub async fn run(self) -> Result<()> {
        match self {
            Self::Build {
                target,
                mode,
                force_all,
                jobs,
            } => {
                let execution_mode = mode.mode();
                build::execute(target.resolve(), execution_mode, jobs, force_all).await
            }
            Self::Exec {
                command,
                target,
                mode,
                jobs,
            } => {
                let execution_mode = mode.mode();
                exec::execute(&command, target.resolve(), execution_mode, jobs).await
            }
            Self::List { target, mode } => {
                let execution_mode = mode.mode();
                list::execute(target.resolve(), execution_mode)
            }
        }
    }
}
