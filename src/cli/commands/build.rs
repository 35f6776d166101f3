//! Build command implementation
//!
//! Implements `monoforge build` to compile packages in dependency order,
//! skipping packages whose content hash matches the stored record.

use anyhow::{Context, Result};

use crate::cli::commands::Target;
use crate::cli::output::status;
use crate::config::OrchestratorConfig;
use crate::core::builder::TreeBuilder;
use crate::core::scheduler::ExecutionMode;

/// Execute the build command
pub async fn execute(
    target: Target,
    mode: ExecutionMode,
    jobs: Option<usize>,
    force_all: bool,
) -> Result<()> {
    let config = OrchestratorConfig::load_or_default(target.dir())
        .with_context(|| "Failed to load monoforge.toml")?;

    let mut builder = TreeBuilder::new(config);
    if let Some(jobs) = jobs {
        builder = builder.with_jobs(jobs);
    }

    let report = match &target {
        Target::Package(manifest) => builder
            .build_package(manifest, mode)
            .await
            .with_context(|| format!("Build failed for package at {}", manifest.display()))?,
        Target::Repository(manifest) => builder
            .build_repository(manifest, mode, force_all)
            .await
            .with_context(|| format!("Build failed for repository at {}", manifest.display()))?,
    };

    tracing::info!(
        "{} {} package(s) processed",
        status::SUCCESS,
        report.executed.len()
    );
    Ok(())
}
