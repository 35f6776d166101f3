//! Exec command implementation
//!
//! Implements `monoforge exec` to run an arbitrary shell command in every
//! package directory, honoring the selected execution mode.

use anyhow::{Context, Result};

use crate::cli::commands::Target;
use crate::cli::output::status;
use crate::config::OrchestratorConfig;
use crate::core::executor::{CommandAction, TreeExecutor};
use crate::core::scheduler::ExecutionMode;

/// Execute the exec command
pub async fn execute(
    command: &str,
    target: Target,
    mode: ExecutionMode,
    jobs: Option<usize>,
) -> Result<()> {
    let config = OrchestratorConfig::load_or_default(target.dir())
        .with_context(|| "Failed to load monoforge.toml")?;

    let mut executor = TreeExecutor::new(config);
    if let Some(jobs) = jobs {
        executor = executor.with_jobs(jobs);
    }

    let action = CommandAction::Command(command.to_string());
    let report = match &target {
        Target::Package(manifest) => executor
            .exec_cmd_on_package(manifest, action, mode)
            .await
            .with_context(|| format!("Command failed for package at {}", manifest.display()))?,
        Target::Repository(manifest) => executor
            .exec_cmd_on_repository(manifest, action, mode)
            .await
            .with_context(|| format!("Command failed for repository at {}", manifest.display()))?,
    };

    tracing::info!(
        "{} '{command}' ran in {} package(s)",
        status::SUCCESS,
        report.executed.len()
    );
    Ok(())
}
