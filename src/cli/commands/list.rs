//! List command implementation
//!
//! Implements `monoforge list` to enumerate packages in execution order.
//! In tree modes, group delimiters show which packages would run
//! concurrently.

use anyhow::{Context, Result};

use crate::cli::commands::Target;
use crate::config::OrchestratorConfig;
use crate::core::executor::TreeExecutor;
use crate::core::scheduler::ExecutionMode;

/// Execute the list command
pub fn execute(target: Target, mode: ExecutionMode) -> Result<()> {
    let config = OrchestratorConfig::load_or_default(target.dir())
        .with_context(|| "Failed to load monoforge.toml")?;

    let executor = TreeExecutor::new(config);
    let (graph, plan) = match &target {
        Target::Package(manifest) => executor
            .plan_for_package(manifest, mode)
            .with_context(|| format!("Failed to plan package at {}", manifest.display()))?,
        Target::Repository(manifest) => executor
            .plan_for_repository(manifest, mode)
            .with_context(|| format!("Failed to plan repository at {}", manifest.display()))?,
    };

    let grouped = matches!(
        mode,
        ExecutionMode::TreeParallel | ExecutionMode::TreeSequential
    );
    for group in &plan {
        let names: Vec<&String> = group
            .iter()
            .filter(|name| graph.node(name).is_some_and(|node| !node.is_virtual))
            .collect();
        if names.is_empty() {
            continue;
        }
        if grouped {
            println!("** Group");
        }
        for name in names {
            println!("\t{name}");
        }
        if grouped {
            println!("** End");
        }
    }
    Ok(())
}
